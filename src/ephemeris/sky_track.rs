//! Sky positions and per-epoch position tracks

use std::fmt;
use std::sync::Arc;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::ephemeris::EpochSeries;
use crate::error::{Result, VisibilityError};
use crate::utils::vector_math::{angular_separation_deg, angular_separations_paired};

/// Reference frame tag attached to positions
///
/// Frames are only compared, never converted: conversion is done by whoever
/// produces the tracks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    Icrs,
    Gcrs,
    /// Observer-centred frame with ICRS orientation (spacecraft frame)
    Observer,
    Named(String),
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Icrs => write!(f, "icrs"),
            Frame::Gcrs => write!(f, "gcrs"),
            Frame::Observer => write!(f, "observer"),
            Frame::Named(name) => write!(f, "{name}"),
        }
    }
}

/// A spherical sky position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    /// Longitude (right ascension) in degrees
    pub lon_deg: f64,
    /// Latitude (declination) in degrees
    pub lat_deg: f64,
}

impl SkyPosition {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        SkyPosition { lon_deg, lat_deg }
    }

    /// Angular separation to another position in degrees
    pub fn separation(&self, other: &SkyPosition) -> f64 {
        angular_separation_deg(self.lon_deg, self.lat_deg, other.lon_deg, other.lat_deg)
    }

    /// Longitude wrapped into [-180, 180)
    pub fn wrapped_lon_deg(&self) -> f64 {
        wrap_at_180(self.lon_deg)
    }
}

/// Wrap an angle in degrees into [-180, 180)
pub fn wrap_at_180(angle_deg: f64) -> f64 {
    let wrapped = (angle_deg + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Positions of one object at every epoch of an [`EpochSeries`]
#[derive(Debug, Clone)]
pub struct SkyTrack {
    frame: Frame,
    epochs: Arc<EpochSeries>,
    lon_deg: Array1<f64>,
    lat_deg: Array1<f64>,
}

impl SkyTrack {
    /// Build a track from per-epoch positions
    ///
    /// # Errors
    /// `InvalidConfiguration` if the number of positions differs from the
    /// number of epochs or a coordinate is not finite.
    pub fn new(frame: Frame, epochs: Arc<EpochSeries>, positions: &[SkyPosition]) -> Result<Self> {
        if positions.len() != epochs.len() {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "track has {} positions for {} epochs",
                positions.len(),
                epochs.len()
            )));
        }
        if positions
            .iter()
            .any(|p| !p.lon_deg.is_finite() || !p.lat_deg.is_finite())
        {
            return Err(VisibilityError::InvalidConfiguration(
                "track positions must be finite".to_string(),
            ));
        }
        Ok(SkyTrack {
            frame,
            epochs,
            lon_deg: positions.iter().map(|p| p.lon_deg).collect(),
            lat_deg: positions.iter().map(|p| p.lat_deg).collect(),
        })
    }

    /// Track that sits at one position for every epoch
    pub fn fixed(frame: Frame, epochs: Arc<EpochSeries>, position: SkyPosition) -> Result<Self> {
        let positions = vec![position; epochs.len()];
        Self::new(frame, epochs, &positions)
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn epochs(&self) -> &Arc<EpochSeries> {
        &self.epochs
    }

    pub fn len(&self) -> usize {
        self.lon_deg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon_deg.is_empty()
    }

    pub fn lon_deg(&self) -> ArrayView1<'_, f64> {
        self.lon_deg.view()
    }

    pub fn lat_deg(&self) -> ArrayView1<'_, f64> {
        self.lat_deg.view()
    }

    pub fn position(&self, index: usize) -> Option<SkyPosition> {
        Some(SkyPosition::new(
            *self.lon_deg.get(index)?,
            *self.lat_deg.get(index)?,
        ))
    }

    /// Epoch-wise angular separation to another track, in degrees
    ///
    /// # Errors
    /// `InvalidConfiguration` when the frames differ or the tracks have
    /// different lengths.
    pub fn separations(&self, other: &SkyTrack) -> Result<Array1<f64>> {
        if self.frame != other.frame {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "cannot compare positions in frame '{}' with frame '{}'",
                self.frame, other.frame
            )));
        }
        if self.len() != other.len() {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "cannot compare tracks of {} and {} epochs",
                self.len(),
                other.len()
            )));
        }
        Ok(angular_separations_paired(
            self.lon_deg(),
            self.lat_deg(),
            other.lon_deg(),
            other.lat_deg(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epochs(n: usize) -> Arc<EpochSeries> {
        Arc::new(EpochSeries::from_julian_dates((0..n).map(|i| i as f64).collect()).unwrap())
    }

    #[test]
    fn test_wrap_at_180() {
        assert_eq!(wrap_at_180(180.0), -180.0);
        assert_eq!(wrap_at_180(-180.0), -180.0);
        assert_eq!(wrap_at_180(190.0), -170.0);
        assert_eq!(wrap_at_180(359.0), -1.0);
        assert_eq!(wrap_at_180(45.0), 45.0);
        let tiny = wrap_at_180(-1e-20);
        assert!((-180.0..180.0).contains(&tiny));
    }

    #[test]
    fn test_track_length_must_match_epochs() {
        let err = SkyTrack::new(Frame::Icrs, epochs(3), &[SkyPosition::new(0.0, 0.0)]);
        assert!(matches!(err, Err(VisibilityError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_separations_between_tracks() {
        let e = epochs(3);
        let a = SkyTrack::fixed(Frame::Observer, e.clone(), SkyPosition::new(0.0, 0.0)).unwrap();
        let b = SkyTrack::new(
            Frame::Observer,
            e,
            &[
                SkyPosition::new(1.0, 0.0),
                SkyPosition::new(2.0, 0.0),
                SkyPosition::new(0.0, 3.0),
            ],
        )
        .unwrap();
        let seps = a.separations(&b).unwrap();
        assert!((seps[0] - 1.0).abs() < 1e-12);
        assert!((seps[1] - 2.0).abs() < 1e-12);
        assert!((seps[2] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_separations_reject_frame_mismatch() {
        let e = epochs(1);
        let a = SkyTrack::fixed(Frame::Icrs, e.clone(), SkyPosition::new(0.0, 0.0)).unwrap();
        let b = SkyTrack::fixed(Frame::Gcrs, e, SkyPosition::new(0.0, 0.0)).unwrap();
        assert!(a.separations(&b).is_err());
    }
}
