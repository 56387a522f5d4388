//! Occluder and target occupancy bitmaps over a sky grid
//!
//! Occluder occupancy reuses the exclusion model with a point-sized target:
//! a grid point is occupied when it falls inside an occluder's hard disk or
//! any of its soft bands. Target occupancy is plain disk containment; the
//! soft bands play no part in it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info};
use ndarray::{Array2, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::grid::SkyGrid;
use super::separation::{SeparationKind, SeparationStrategy};
use crate::constraints::body::SkyBody;
use crate::constraints::exclusion::is_visible;
use crate::constraints::{Occluder, Target};
use crate::ephemeris::Frame;
use crate::error::{RenderError, Result, VisibilityError};
use crate::utils::config::DEFAULT_GRID_NPIX;

/// Renderer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Grid samples as (longitude, latitude)
    pub npix: (usize, usize),
    /// Separation implementation used for every grid evaluation
    pub separation: SeparationKind,
    /// Worker threads for batch rendering (None = one per core)
    pub num_workers: Option<usize>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        RendererConfig {
            npix: DEFAULT_GRID_NPIX,
            separation: SeparationKind::default(),
            num_workers: None,
        }
    }
}

impl RendererConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Shared flag used to abort a running batch
///
/// Checked before each epoch is started; epochs already in flight finish.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Occupancy bitmaps for one epoch, shaped like the renderer's grid
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapPair {
    pub epoch_index: usize,
    /// True where any occluder's hard disk or soft band covers the point
    pub occluders: Array2<bool>,
    /// True where any subtarget disk covers the point
    pub targets: Array2<bool>,
}

/// Renders sky bitmaps of occluders and targets at chosen epochs
pub struct SkyGridRenderer<'a> {
    grid: Arc<SkyGrid>,
    strategy: Box<dyn SeparationStrategy>,
    num_workers: Option<usize>,
    occluders: &'a [Occluder],
    targets: &'a [Target],
}

impl<'a> SkyGridRenderer<'a> {
    /// # Errors
    /// - `InvalidConfiguration` for a degenerate grid or bodies in different frames
    /// - `Unimplemented` if a target has a non-circular subtarget
    pub fn new(
        config: &RendererConfig,
        occluders: &'a [Occluder],
        targets: &'a [Target],
    ) -> Result<Self> {
        check_frames(occluders, targets)?;
        for target in targets {
            for subtarget in target.subtargets() {
                subtarget.require_circular()?;
            }
        }
        Ok(SkyGridRenderer {
            grid: SkyGrid::shared(config.npix)?,
            strategy: config.separation.strategy(),
            num_workers: config.num_workers,
            occluders,
            targets,
        })
    }

    pub fn grid(&self) -> &SkyGrid {
        &self.grid
    }

    /// Number of epochs covered by the first occluder or subtarget
    pub fn epoch_count(&self) -> usize {
        self.occluders
            .first()
            .map(|o| o.len())
            .or_else(|| {
                self.targets
                    .iter()
                    .flat_map(|t| t.subtargets())
                    .next()
                    .map(|s| s.len())
            })
            .unwrap_or(0)
    }

    /// Bitmaps for one epoch
    pub fn render(&self, epoch_index: usize) -> Result<BitmapPair> {
        let mut occluders = Array2::from_elem(self.grid.shape(), false);
        for occluder in self.occluders {
            self.mark_exclusion(&mut occluders, occluder, epoch_index)?;
        }

        let mut targets = Array2::from_elem(self.grid.shape(), false);
        for subtarget in self.targets.iter().flat_map(|t| t.subtargets()) {
            self.mark_disk(&mut targets, subtarget, epoch_index)?;
        }

        Ok(BitmapPair {
            epoch_index,
            occluders,
            targets,
        })
    }

    /// Bitmaps for every epoch the bodies are defined on
    pub fn render_all(&self, cancel: &CancellationToken) -> Result<Vec<BitmapPair>, RenderError> {
        let indices: Vec<usize> = (0..self.epoch_count()).collect();
        self.render_batch(&indices, cancel)
    }

    /// Bitmaps for several epochs, rendered in parallel
    ///
    /// Results come back in ascending epoch order whatever order the workers
    /// finish in.
    ///
    /// # Errors
    /// - `BatchFailed` naming every epoch that could not be rendered
    /// - `Cancelled` if `cancel` was raised before all epochs were started
    pub fn render_batch(
        &self,
        epoch_indices: &[usize],
        cancel: &CancellationToken,
    ) -> Result<Vec<BitmapPair>, RenderError> {
        let total = epoch_indices.len();
        info!(
            "rendering {total} epochs on a {:?} grid ({} separation)",
            self.grid.shape(),
            self.strategy.name()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_workers.unwrap_or(0))
            .build()?;
        let completed = AtomicUsize::new(0);

        let mut outcomes: Vec<(usize, Option<Result<BitmapPair>>)> = pool.install(|| {
            epoch_indices
                .par_iter()
                .map(|&index| {
                    if cancel.is_cancelled() {
                        return (index, None);
                    }
                    let outcome = self.render(index);
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!("rendered epoch {index} ({done}/{total})");
                    (index, Some(outcome))
                })
                .collect()
        });
        outcomes.sort_by_key(|(index, _)| *index);

        let mut pairs = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut skipped = 0;
        for (index, outcome) in outcomes {
            match outcome {
                Some(Ok(pair)) => pairs.push(pair),
                Some(Err(e)) => failures.push((index, e.to_string())),
                None => skipped += 1,
            }
        }

        if !failures.is_empty() {
            return Err(RenderError::BatchFailed { failures });
        }
        if skipped > 0 {
            return Err(RenderError::Cancelled {
                completed: total - skipped,
                total,
            });
        }

        info!("rendered {} bitmap pairs", pairs.len());
        Ok(pairs)
    }

    fn mark_exclusion<B: SkyBody>(
        &self,
        bitmap: &mut Array2<bool>,
        body: &B,
        epoch_index: usize,
    ) -> Result<()> {
        let center = body.position(epoch_index)?;
        let hard_radius = body.angular_radius(epoch_index)?;
        let bands = body.soft_bands();
        let separations = self.strategy.separations(&self.grid, center);
        Zip::from(bitmap)
            .and(&separations)
            .for_each(|occupied, &sep| {
                *occupied |= !is_visible(sep, 0.0, hard_radius, bands);
            });
        Ok(())
    }

    fn mark_disk<B: SkyBody>(
        &self,
        bitmap: &mut Array2<bool>,
        body: &B,
        epoch_index: usize,
    ) -> Result<()> {
        let center = body.position(epoch_index)?;
        let radius = body.angular_radius(epoch_index)?;
        let separations = self.strategy.separations(&self.grid, center);
        Zip::from(bitmap)
            .and(&separations)
            .for_each(|occupied, &sep| {
                *occupied |= sep <= radius;
            });
        Ok(())
    }
}

fn check_frames(occluders: &[Occluder], targets: &[Target]) -> Result<()> {
    let mut frames = occluders
        .iter()
        .map(|o| (o.name(), o.track().frame()))
        .chain(
            targets
                .iter()
                .flat_map(|t| t.subtargets())
                .map(|s| (s.name(), s.frame())),
        );
    let Some((_, reference)) = frames.next() else {
        return Ok(());
    };
    for (name, frame) in frames {
        if frame != reference {
            return Err(mismatched_frame(name, frame, reference));
        }
    }
    Ok(())
}

fn mismatched_frame(name: &str, frame: &Frame, reference: &Frame) -> VisibilityError {
    VisibilityError::InvalidConfiguration(format!(
        "'{name}' is in frame '{frame}' but the sky grid is in frame '{reference}'"
    ))
}
