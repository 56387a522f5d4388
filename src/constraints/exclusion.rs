/// Hard-disk and soft-band exclusion model
///
/// An occluder blocks a circular target when the target disk overlaps the
/// occluder's hard disk, or when it intersects any of the occluder's soft
/// annular bands. Disks that exactly touch count as visible.
use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VisibilityError};

/// Annular exclusion band around an occluder, radii in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoftBand {
    pub inner_deg: f64,
    pub outer_deg: f64,
}

impl SoftBand {
    /// Create a band, rejecting `inner >= outer` and negative or non-finite radii
    pub fn new(inner_deg: f64, outer_deg: f64) -> Result<Self> {
        let band = SoftBand {
            inner_deg,
            outer_deg,
        };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.inner_deg.is_finite() || !self.outer_deg.is_finite() || self.inner_deg < 0.0 {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "soft band radii must be finite and non-negative, got ({}, {})",
                self.inner_deg, self.outer_deg
            )));
        }
        if self.inner_deg >= self.outer_deg {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "soft band inner radius {}° must be smaller than outer radius {}°",
                self.inner_deg, self.outer_deg
            )));
        }
        Ok(())
    }

    /// True when a target disk of `target_radius` at `separation` intersects the band
    #[inline]
    pub fn violated_by(&self, separation: f64, target_radius: f64) -> bool {
        (separation + target_radius - self.inner_deg) > 0.0
            && (separation - target_radius - self.outer_deg) < 0.0
    }
}

/// True when a target disk clears an occluder's hard disk
#[inline]
pub fn hard_visible(separation: f64, target_radius: f64, hard_radius: f64) -> bool {
    (separation - target_radius - hard_radius) >= 0.0
}

/// Visibility of one target disk with respect to one occluder
///
/// Visible only if the disk clears the hard radius and lies outside every soft band.
#[inline]
pub fn is_visible(
    separation: f64,
    target_radius: f64,
    hard_radius: f64,
    bands: &[SoftBand],
) -> bool {
    hard_visible(separation, target_radius, hard_radius)
        && bands
            .iter()
            .all(|band| !band.violated_by(separation, target_radius))
}

/// Vectorized [`is_visible`] over an epoch axis
///
/// `separations` and `hard_radii` must have the same length.
pub fn visibility_mask(
    separations: ArrayView1<f64>,
    target_radius: f64,
    hard_radii: ArrayView1<f64>,
    bands: &[SoftBand],
) -> Array1<bool> {
    let mut mask = Array1::from_elem(separations.len(), false);
    Zip::from(&mut mask)
        .and(&separations)
        .and(&hard_radii)
        .for_each(|visible, &separation, &hard_radius| {
            *visible = is_visible(separation, target_radius, hard_radius, bands);
        });
    mask
}
