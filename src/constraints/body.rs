/// Sky bodies: the capability set shared by occluders and subtargets
use std::sync::Arc;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::exclusion::SoftBand;
use crate::ephemeris::{EpochSeries, SkyPosition, SkyTrack};
use crate::error::{Result, VisibilityError};

/// Anything with a per-epoch position, a per-epoch angular radius and a set
/// of soft exclusion bands
pub trait SkyBody: Send + Sync {
    fn name(&self) -> &str;

    /// Number of epochs the body is defined for
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Angular radius in degrees at epoch `index`
    fn angular_radius(&self, index: usize) -> Result<f64>;

    /// Sky position at epoch `index`
    fn position(&self, index: usize) -> Result<SkyPosition>;

    /// Soft exclusion bands (empty for bodies that only occupy their disk)
    fn soft_bands(&self) -> &[SoftBand];

    /// Position track in the frame separations are computed in
    fn track(&self) -> &SkyTrack;
}

pub(crate) fn out_of_range(name: &str, index: usize, len: usize) -> VisibilityError {
    VisibilityError::EpochOutOfRange {
        name: name.to_string(),
        index,
        len,
    }
}

/// Configuration for an occluding body's exclusion bands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccluderConfig {
    /// Body name, e.g. "Sun", "Earth", "Moon"
    pub name: String,
    /// Soft exclusion bands as (inner, outer) radii in degrees
    #[serde(default)]
    pub soft_bands: Vec<(f64, f64)>,
}

impl OccluderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validated soft bands
    pub fn bands(&self) -> Result<Vec<SoftBand>> {
        self.soft_bands
            .iter()
            .map(|&(inner, outer)| SoftBand::new(inner, outer))
            .collect()
    }

    /// Bind this configuration to per-epoch ephemeris data
    pub fn build(&self, track: SkyTrack, angular_radius_deg: Vec<f64>) -> Result<Occluder> {
        Occluder::new(&self.name, track, angular_radius_deg, self.bands()?)
    }
}

/// A solar-system body whose disk and soft bands block visibility
#[derive(Debug, Clone)]
pub struct Occluder {
    name: String,
    track: SkyTrack,
    angular_radius_deg: Array1<f64>,
    soft_bands: Vec<SoftBand>,
}

impl Occluder {
    /// # Errors
    /// `InvalidConfiguration` if the radius series does not match the track
    /// length, a radius is negative or non-finite, or a band is malformed.
    pub fn new(
        name: impl Into<String>,
        track: SkyTrack,
        angular_radius_deg: Vec<f64>,
        soft_bands: Vec<SoftBand>,
    ) -> Result<Self> {
        let name = name.into();
        if angular_radius_deg.len() != track.len() {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "occluder '{name}' has {} radii for {} positions",
                angular_radius_deg.len(),
                track.len()
            )));
        }
        if angular_radius_deg.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "occluder '{name}' radii must be finite and non-negative"
            )));
        }
        for band in &soft_bands {
            band.validate()?;
        }
        Ok(Occluder {
            name,
            track,
            angular_radius_deg: Array1::from(angular_radius_deg),
            soft_bands,
        })
    }

    /// Occluder with the same angular radius at every epoch
    pub fn with_constant_radius(
        name: impl Into<String>,
        track: SkyTrack,
        angular_radius_deg: f64,
        soft_bands: Vec<SoftBand>,
    ) -> Result<Self> {
        let radii = vec![angular_radius_deg; track.len()];
        Self::new(name, track, radii, soft_bands)
    }

    pub fn epochs(&self) -> &Arc<EpochSeries> {
        self.track.epochs()
    }

    pub fn angular_radii(&self) -> ArrayView1<'_, f64> {
        self.angular_radius_deg.view()
    }
}

impl SkyBody for Occluder {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.track.len()
    }

    fn angular_radius(&self, index: usize) -> Result<f64> {
        self.angular_radius_deg
            .get(index)
            .copied()
            .ok_or_else(|| out_of_range(&self.name, index, self.len()))
    }

    fn position(&self, index: usize) -> Result<SkyPosition> {
        self.track
            .position(index)
            .ok_or_else(|| out_of_range(&self.name, index, self.len()))
    }

    fn soft_bands(&self) -> &[SoftBand] {
        &self.soft_bands
    }

    fn track(&self) -> &SkyTrack {
        &self.track
    }
}
