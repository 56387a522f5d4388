/// Composite observation targets
///
/// A target is visible at an epoch only when every one of its subtargets
/// clears every occluder at that epoch.
use std::sync::Arc;

use log::debug;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use super::body::{Occluder, SkyBody};
use super::contact::{extract_contacts, BenefitMode, Contact, TimeStorage};
use super::stats::{compute_stats, StatsRow};
use super::subtarget::Subtarget;
use crate::ephemeris::{EpochSeries, SkyPosition};
use crate::error::{Result, VisibilityError};

/// Target labels as loaded from a target list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    /// Positive priority; the benefit rate of a contact is 1 / priority.
    /// Signed so that zero and negative values reach validation in
    /// [`Target::from_config`] instead of failing to parse.
    pub priority: i64,
    pub category: String,
}

impl TargetConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Visibility of a target over its epochs
#[derive(Debug, Clone)]
pub struct TargetVisibility {
    /// Conjunction over every (subtarget, occluder) pair
    pub visibility: Array1<bool>,
    /// Per-pair visibility, shape (pairs, epochs), subtarget-major
    pub pair_visibility: Array2<bool>,
    /// Per-pair angular separation in degrees, same layout as `pair_visibility`
    pub pair_separation: Array2<f64>,
    /// (subtarget, occluder) names for each pair row
    pub pairs: Vec<(String, String)>,
}

/// A composite observation objective made of one or more subtargets
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    priority: u32,
    category: String,
    subtargets: Vec<Subtarget>,
}

impl Target {
    /// # Errors
    /// `InvalidConfiguration` if `priority` is zero.
    pub fn new(
        name: impl Into<String>,
        priority: u32,
        category: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if priority == 0 {
            return Err(VisibilityError::InvalidConfiguration(format!(
                "target '{name}' priority must be positive"
            )));
        }
        Ok(Target {
            name,
            priority,
            category: category.into(),
            subtargets: Vec::new(),
        })
    }

    /// # Errors
    /// `InvalidConfiguration` if the priority is not a positive `u32`.
    pub fn from_config(config: &TargetConfig) -> Result<Self> {
        let priority = u32::try_from(config.priority).map_err(|_| {
            VisibilityError::InvalidConfiguration(format!(
                "target '{}' priority must be a positive integer, got {}",
                config.name, config.priority
            ))
        })?;
        Self::new(&config.name, priority, &config.category)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Benefit per day of contact
    pub fn benefit_rate(&self) -> f64 {
        1.0 / self.priority as f64
    }

    pub fn subtargets(&self) -> &[Subtarget] {
        &self.subtargets
    }

    /// Add a subtarget
    ///
    /// # Errors
    /// `MismatchedTimebase` if its epochs differ from those of the subtargets
    /// already held.
    pub fn add_subtarget(&mut self, subtarget: Subtarget) -> Result<()> {
        if let Some(first) = self.subtargets.first() {
            if first.epochs() != subtarget.epochs() {
                return Err(VisibilityError::MismatchedTimebase {
                    owner: self.name.clone(),
                    item: subtarget.name().to_string(),
                    expected: first.len(),
                    found: subtarget.len(),
                });
            }
        }
        self.subtargets.push(subtarget);
        Ok(())
    }

    /// Remove the subtarget called `name`, returning it if present
    pub fn remove_subtarget(&mut self, name: &str) -> Option<Subtarget> {
        let index = self.subtargets.iter().position(|s| s.name() == name)?;
        Some(self.subtargets.remove(index))
    }

    /// Epochs shared by all subtargets
    ///
    /// # Errors
    /// `InvalidTargetState` if the target has no subtargets.
    pub fn epochs(&self) -> Result<&Arc<EpochSeries>> {
        self.subtargets
            .first()
            .map(Subtarget::epochs)
            .ok_or_else(|| self.empty_error())
    }

    /// Approximate mean ICRS position of the subtargets
    pub fn mean_position(&self) -> Result<SkyPosition> {
        if self.subtargets.is_empty() {
            return Err(self.empty_error());
        }
        mean_sky_position(&self.subtargets)
    }

    /// Visibility with respect to a set of occluders
    ///
    /// # Errors
    /// - `InvalidTargetState` if the target has no subtargets
    /// - `MismatchedTimebase` if subtargets or occluders disagree on epochs
    /// - `Unimplemented` for non-circular subtargets
    pub fn calculate_visibility(&self, occluders: &[Occluder]) -> Result<TargetVisibility> {
        let epochs = self.epochs()?;
        self.check_timebase(epochs, occluders)?;

        let n_epochs = epochs.len();
        let n_pairs = self.subtargets.len() * occluders.len();
        let mut pair_visibility = Array2::from_elem((n_pairs, n_epochs), true);
        let mut pair_separation = Array2::from_elem((n_pairs, n_epochs), f64::NAN);
        let mut pairs = Vec::with_capacity(n_pairs);

        let mut row = 0;
        for subtarget in &self.subtargets {
            for occluder in occluders {
                let result = subtarget.calculate_visibility(occluder)?;
                pair_visibility.row_mut(row).assign(&result.visibility);
                pair_separation.row_mut(row).assign(&result.separation);
                pairs.push((subtarget.name().to_string(), occluder.name().to_string()));
                row += 1;
            }
        }

        let visibility = pair_visibility.map_axis(Axis(0), |epoch| epoch.iter().all(|&v| v));
        debug!(
            "target '{}': {} of {} epochs visible over {} pairs",
            self.name,
            visibility.iter().filter(|&&v| v).count(),
            n_epochs,
            n_pairs
        );

        Ok(TargetVisibility {
            visibility,
            pair_visibility,
            pair_separation,
            pairs,
        })
    }

    /// Contacts from a visibility series, with benefit `duration / priority`
    pub fn calculate_contacts(&self, visibility: &Array1<bool>) -> Result<Vec<Contact>> {
        extract_contacts(
            &self.name,
            visibility.view(),
            self.epochs()?,
            BenefitMode::Differential {
                rate: self.benefit_rate(),
            },
            TimeStorage::DayCount,
        )
    }

    /// Statistics row over a set of contacts
    pub fn calculate_stats(&self, contacts: &[Contact]) -> Result<StatsRow> {
        Ok(compute_stats(
            &self.name,
            &self.category,
            self.mean_position()?,
            contacts,
            self.epochs()?,
        ))
    }

    fn check_timebase(&self, epochs: &Arc<EpochSeries>, occluders: &[Occluder]) -> Result<()> {
        let mismatch = |item: &str, found: usize| VisibilityError::MismatchedTimebase {
            owner: self.name.clone(),
            item: item.to_string(),
            expected: epochs.len(),
            found,
        };
        for subtarget in &self.subtargets {
            if subtarget.epochs() != epochs {
                return Err(mismatch(subtarget.name(), subtarget.len()));
            }
        }
        for occluder in occluders {
            if occluder.epochs() != epochs {
                return Err(mismatch(occluder.name(), occluder.len()));
            }
        }
        Ok(())
    }

    fn empty_error(&self) -> VisibilityError {
        VisibilityError::InvalidTargetState {
            target: self.name.clone(),
            reason: "target has no subtargets".to_string(),
        }
    }
}

/// Mean ICRS position over all subtargets and epochs
///
/// Latitude and longitude are averaged independently as
/// `atan2(mean(sin x), mean(cos x))`. This is not a true spherical mean and
/// drifts for groups that straddle a pole.
///
/// # Errors
/// `InvalidTargetState` if there are no positions to average.
pub fn mean_sky_position(subtargets: &[Subtarget]) -> Result<SkyPosition> {
    let mut sum_sin_lat = 0.0;
    let mut sum_cos_lat = 0.0;
    let mut sum_sin_lon = 0.0;
    let mut sum_cos_lon = 0.0;
    let mut count = 0usize;

    for subtarget in subtargets {
        let icrs = subtarget.icrs_coordinates();
        for (&lon, &lat) in icrs.lon_deg().iter().zip(icrs.lat_deg().iter()) {
            let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
            let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
            sum_sin_lat += sin_lat;
            sum_cos_lat += cos_lat;
            sum_sin_lon += sin_lon;
            sum_cos_lon += cos_lon;
            count += 1;
        }
    }

    if count == 0 {
        return Err(VisibilityError::InvalidTargetState {
            target: subtargets
                .first()
                .map(|s| s.name().to_string())
                .unwrap_or_default(),
            reason: "no ICRS positions to average".to_string(),
        });
    }

    let n = count as f64;
    let lat = (sum_sin_lat / n).atan2(sum_cos_lat / n);
    let lon = (sum_sin_lon / n).atan2(sum_cos_lon / n);
    Ok(SkyPosition::new(lon.to_degrees(), lat.to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{Frame, SkyTrack};

    fn epochs(n: usize) -> Arc<EpochSeries> {
        Arc::new(EpochSeries::from_julian_dates((0..n).map(|i| i as f64).collect()).unwrap())
    }

    fn subtarget(name: &str, epochs: &Arc<EpochSeries>, lon: f64, lat: f64) -> Subtarget {
        let position = SkyPosition::new(lon, lat);
        Subtarget::new(
            name,
            1.0,
            SkyTrack::fixed(Frame::Observer, epochs.clone(), position).unwrap(),
            SkyTrack::fixed(Frame::Icrs, epochs.clone(), position).unwrap(),
        )
        .unwrap()
    }

    fn occluder(name: &str, epochs: &Arc<EpochSeries>, lons: &[f64]) -> Occluder {
        let positions: Vec<SkyPosition> = lons.iter().map(|&l| SkyPosition::new(l, 0.0)).collect();
        let track = SkyTrack::new(Frame::Observer, epochs.clone(), &positions).unwrap();
        Occluder::with_constant_radius(name, track, 2.0, vec![]).unwrap()
    }

    #[test]
    fn test_zero_priority_rejected() {
        assert!(matches!(
            Target::new("t", 0, "c"),
            Err(VisibilityError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_config_priority_must_be_positive() {
        for priority in ["0", "-1", "-40", "5000000000"] {
            let json = format!(r#"{{"name": "t", "priority": {priority}, "category": "c"}}"#);
            let config = TargetConfig::from_json(&json).unwrap();
            assert!(matches!(
                Target::from_config(&config),
                Err(VisibilityError::InvalidConfiguration(_))
            ));
        }

        let config =
            TargetConfig::from_json(r#"{"name": "t", "priority": 4, "category": "c"}"#).unwrap();
        let target = Target::from_config(&config).unwrap();
        assert_eq!(target.priority(), 4);
        assert_eq!(target.benefit_rate(), 0.25);
    }

    #[test]
    fn test_empty_target_fails_explicitly() {
        let target = Target::new("t", 1, "c").unwrap();
        assert!(matches!(
            target.calculate_visibility(&[]),
            Err(VisibilityError::InvalidTargetState { .. })
        ));
        assert!(matches!(
            target.mean_position(),
            Err(VisibilityError::InvalidTargetState { .. })
        ));
    }

    #[test]
    fn test_single_blocked_pair_blocks_target() {
        let e = epochs(4);
        let mut target = Target::new("pair", 2, "binary").unwrap();
        target.add_subtarget(subtarget("a", &e, 0.0, 0.0)).unwrap();
        target.add_subtarget(subtarget("b", &e, 20.0, 0.0)).unwrap();

        // Sun sweeps across "a" at epoch 1, Moon across "b" at epoch 2
        let sun = occluder("Sun", &e, &[90.0, 1.0, 90.0, 90.0]);
        let moon = occluder("Moon", &e, &[-90.0, -90.0, 21.0, -90.0]);

        let result = target.calculate_visibility(&[sun, moon]).unwrap();
        assert_eq!(result.visibility.to_vec(), vec![true, false, false, true]);
        assert_eq!(result.pair_visibility.nrows(), 4);
        assert_eq!(result.pairs[1], ("a".to_string(), "Moon".to_string()));

        // conjunction law over the stored pairs
        for (t, &visible) in result.visibility.iter().enumerate() {
            let all = result.pair_visibility.column(t).iter().all(|&v| v);
            assert_eq!(visible, all);
        }
    }

    #[test]
    fn test_no_occluders_means_always_visible() {
        let e = epochs(3);
        let mut target = Target::new("t", 1, "c").unwrap();
        target.add_subtarget(subtarget("a", &e, 0.0, 0.0)).unwrap();
        let result = target.calculate_visibility(&[]).unwrap();
        assert!(result.visibility.iter().all(|&v| v));
    }

    #[test]
    fn test_mismatched_subtarget_epochs_rejected() {
        let mut target = Target::new("t", 1, "c").unwrap();
        target.add_subtarget(subtarget("a", &epochs(3), 0.0, 0.0)).unwrap();
        let other = Arc::new(EpochSeries::from_julian_dates(vec![0.0, 1.0, 2.5]).unwrap());
        assert!(matches!(
            target.add_subtarget(subtarget("b", &other, 0.0, 0.0)),
            Err(VisibilityError::MismatchedTimebase { .. })
        ));
    }

    #[test]
    fn test_mismatched_occluder_epochs_rejected() {
        let e = epochs(3);
        let mut target = Target::new("t", 1, "c").unwrap();
        target.add_subtarget(subtarget("a", &e, 0.0, 0.0)).unwrap();
        let sun = occluder("Sun", &epochs(2), &[90.0, 90.0]);
        assert!(matches!(
            target.calculate_visibility(&[sun]),
            Err(VisibilityError::MismatchedTimebase { expected: 3, found: 2, .. })
        ));
    }

    #[test]
    fn test_mean_position_recomputed_after_removal() {
        let e = epochs(1);
        let mut target = Target::new("t", 1, "c").unwrap();
        target.add_subtarget(subtarget("a", &e, 10.0, 10.0)).unwrap();
        target.add_subtarget(subtarget("b", &e, 30.0, 20.0)).unwrap();
        let mean = target.mean_position().unwrap();
        assert!((mean.lon_deg - 20.0).abs() < 1e-9);
        assert!((mean.lat_deg - 15.0).abs() < 1e-9);

        assert!(target.remove_subtarget("b").is_some());
        assert!(target.remove_subtarget("b").is_none());
        let mean = target.mean_position().unwrap();
        assert!((mean.lon_deg - 10.0).abs() < 1e-9);
        assert!((mean.lat_deg - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_longitude_across_wrap() {
        let e = epochs(1);
        let subtargets = [subtarget("a", &e, 170.0, 0.0), subtarget("b", &e, -170.0, 0.0)];
        let mean = mean_sky_position(&subtargets).unwrap();
        assert!((mean.wrapped_lon_deg() + 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_contacts_use_priority_rate() {
        let e = epochs(5);
        let mut target = Target::new("t", 4, "c").unwrap();
        target.add_subtarget(subtarget("a", &e, 0.0, 0.0)).unwrap();
        let vis = Array1::from(vec![true, true, false, true, true]);
        let contacts = target.calculate_contacts(&vis).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].benefit, 0.5);
        assert_eq!(contacts[1].benefit, 0.25);
    }
}
