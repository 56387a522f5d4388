/// Subtarget geometry and per-occluder visibility
use std::sync::Arc;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::body::{out_of_range, Occluder, SkyBody};
use super::exclusion::{visibility_mask, SoftBand};
use crate::ephemeris::{EpochSeries, Frame, SkyPosition, SkyTrack};
use crate::error::{Result, VisibilityError};

/// Footprint of a subtarget on the sky
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubtargetShape {
    /// Disk of the subtarget's angular radius
    Circle,
    /// Rectangular field; not yet supported by visibility or rendering
    Rectangle { width_deg: f64, height_deg: f64 },
}

/// Visibility of one subtarget with respect to one occluder
#[derive(Debug, Clone)]
pub struct SubtargetVisibility {
    /// True at every epoch where the subtarget clears the occluder
    pub visibility: Array1<bool>,
    /// Angular separation between subtarget and occluder (degrees)
    pub separation: Array1<f64>,
}

/// A single circular sky region belonging to a target
#[derive(Debug, Clone)]
pub struct Subtarget {
    name: String,
    shape: SubtargetShape,
    angular_radius_deg: f64,
    coordinates: SkyTrack,
    icrs_coordinates: SkyTrack,
}

impl Subtarget {
    /// Circular subtarget
    ///
    /// `coordinates` is the position in the frame visibility is evaluated in
    /// (the same frame as the occluders); `icrs_coordinates` is the same
    /// object in ICRS and feeds the target's mean position.
    pub fn new(
        name: impl Into<String>,
        angular_radius_deg: f64,
        coordinates: SkyTrack,
        icrs_coordinates: SkyTrack,
    ) -> Result<Self> {
        let name = name.into();
        if !angular_radius_deg.is_finite() || angular_radius_deg < 0.0 {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "subtarget '{name}' angular radius must be finite and non-negative, \
                 got {angular_radius_deg}"
            )));
        }
        if *icrs_coordinates.frame() != Frame::Icrs {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "subtarget '{name}' ICRS coordinates are tagged '{}'",
                icrs_coordinates.frame()
            )));
        }
        if icrs_coordinates.epochs() != coordinates.epochs() {
            return Err(VisibilityError::MismatchedTimebase {
                owner: name.clone(),
                item: "icrs coordinates".to_string(),
                expected: coordinates.len(),
                found: icrs_coordinates.len(),
            });
        }
        Ok(Subtarget {
            name,
            shape: SubtargetShape::Circle,
            angular_radius_deg,
            coordinates,
            icrs_coordinates,
        })
    }

    pub fn with_shape(mut self, shape: SubtargetShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn shape(&self) -> SubtargetShape {
        self.shape
    }

    pub fn frame(&self) -> &Frame {
        self.coordinates.frame()
    }

    pub fn radius_deg(&self) -> f64 {
        self.angular_radius_deg
    }

    pub fn epochs(&self) -> &Arc<EpochSeries> {
        self.coordinates.epochs()
    }

    pub fn icrs_coordinates(&self) -> &SkyTrack {
        &self.icrs_coordinates
    }

    /// Fails unless the subtarget is a plain disk
    pub fn require_circular(&self) -> Result<()> {
        match self.shape {
            SubtargetShape::Circle => Ok(()),
            SubtargetShape::Rectangle { .. } => Err(VisibilityError::Unimplemented(format!(
                "non-circular geometry for subtarget '{}'",
                self.name
            ))),
        }
    }

    /// Visibility of this subtarget with respect to one occluder, per epoch
    ///
    /// # Errors
    /// - `Unimplemented` for non-circular subtargets
    /// - `MismatchedTimebase` if the occluder is sampled on different epochs
    /// - `InvalidConfiguration` if the occluder is in a different frame
    pub fn calculate_visibility(&self, occluder: &Occluder) -> Result<SubtargetVisibility> {
        self.require_circular()?;
        if occluder.epochs() != self.epochs() {
            return Err(VisibilityError::MismatchedTimebase {
                owner: self.name.clone(),
                item: occluder.name().to_string(),
                expected: self.len(),
                found: occluder.len(),
            });
        }

        let separation = occluder.track().separations(&self.coordinates)?;
        let visibility = visibility_mask(
            separation.view(),
            self.angular_radius_deg,
            occluder.angular_radii(),
            occluder.soft_bands(),
        );

        Ok(SubtargetVisibility {
            visibility,
            separation,
        })
    }
}

impl SkyBody for Subtarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.coordinates.len()
    }

    fn angular_radius(&self, index: usize) -> Result<f64> {
        if index < self.len() {
            Ok(self.angular_radius_deg)
        } else {
            Err(out_of_range(&self.name, index, self.len()))
        }
    }

    fn position(&self, index: usize) -> Result<SkyPosition> {
        self.coordinates
            .position(index)
            .ok_or_else(|| out_of_range(&self.name, index, self.len()))
    }

    fn soft_bands(&self) -> &[SoftBand] {
        &[]
    }

    fn track(&self) -> &SkyTrack {
        &self.coordinates
    }
}
