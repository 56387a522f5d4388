use chrono::{DateTime, Utc};
use ndarray::Array1;

use crate::error::{Result, VisibilityError};
use crate::utils::time_utils::{datetime_to_jd, generate_timestamps};

/// Ordered epochs shared by every series of one analysis
///
/// Epochs are kept both as UTC timestamps (when known) and as Julian dates.
/// Contacts and statistics only ever look at the Julian dates, so a series
/// built directly from day counts behaves identically.
#[derive(Debug, Clone)]
pub struct EpochSeries {
    times: Option<Vec<DateTime<Utc>>>,
    julian_dates: Array1<f64>,
}

impl EpochSeries {
    /// Build a series from UTC timestamps
    ///
    /// # Errors
    /// `InvalidConfiguration` if the timestamps are not strictly increasing.
    pub fn from_datetimes(times: Vec<DateTime<Utc>>) -> Result<Self> {
        let julian_dates: Array1<f64> = times.iter().map(datetime_to_jd).collect();
        check_increasing(&julian_dates)?;
        Ok(EpochSeries {
            times: Some(times),
            julian_dates,
        })
    }

    /// Build a series from raw day counts (Julian dates or any other day scale)
    pub fn from_julian_dates(julian_dates: Vec<f64>) -> Result<Self> {
        let julian_dates = Array1::from(julian_dates);
        if julian_dates.iter().any(|jd| !jd.is_finite()) {
            return Err(VisibilityError::InvalidConfiguration(
                "epoch day counts must be finite".to_string(),
            ));
        }
        check_increasing(&julian_dates)?;
        Ok(EpochSeries {
            times: None,
            julian_dates,
        })
    }

    /// Regularly spaced series from begin to end (inclusive), step in seconds
    pub fn from_range(begin: DateTime<Utc>, end: DateTime<Utc>, step_size: i64) -> Result<Self> {
        Self::from_datetimes(generate_timestamps(begin, end, step_size)?)
    }

    pub fn len(&self) -> usize {
        self.julian_dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.julian_dates.is_empty()
    }

    /// UTC timestamps, if the series was built from them
    pub fn times(&self) -> Option<&[DateTime<Utc>]> {
        self.times.as_deref()
    }

    pub fn julian_dates(&self) -> &Array1<f64> {
        &self.julian_dates
    }

    /// Day count of epoch `index`
    pub fn day_count(&self, index: usize) -> Result<f64> {
        self.julian_dates
            .get(index)
            .copied()
            .ok_or_else(|| VisibilityError::EpochOutOfRange {
                name: "epoch series".to_string(),
                index,
                len: self.len(),
            })
    }

    /// Days between the first and last epoch (0 for fewer than two epochs)
    pub fn span_days(&self) -> f64 {
        let n = self.len();
        if n < 2 {
            return 0.0;
        }
        self.julian_dates[n - 1] - self.julian_dates[0]
    }
}

/// Two series describe the same timebase when their day counts agree exactly
impl PartialEq for EpochSeries {
    fn eq(&self, other: &Self) -> bool {
        self.julian_dates == other.julian_dates
    }
}

fn check_increasing(julian_dates: &Array1<f64>) -> Result<()> {
    let ordered = julian_dates
        .windows(2)
        .into_iter()
        .all(|pair| pair[1] > pair[0]);
    if ordered {
        Ok(())
    } else {
        Err(VisibilityError::InvalidConfiguration(
            "epochs must be strictly increasing".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_datetimes_converts_to_julian_dates() {
        let t0 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap();
        let epochs = EpochSeries::from_datetimes(vec![t0, t1]).unwrap();
        assert_eq!(epochs.len(), 2);
        assert!((epochs.day_count(0).unwrap() - 2_451_545.0).abs() < 1e-6);
        assert!((epochs.span_days() - 0.5).abs() < 1e-9);
        assert_eq!(epochs.times().unwrap()[1], t1);
    }

    #[test]
    fn test_rejects_non_increasing_epochs() {
        assert!(matches!(
            EpochSeries::from_julian_dates(vec![0.0, 1.0, 1.0]),
            Err(VisibilityError::InvalidConfiguration(_))
        ));
        assert!(EpochSeries::from_julian_dates(vec![0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_empty_and_single_epoch_span() {
        let empty = EpochSeries::from_julian_dates(vec![]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.span_days(), 0.0);
        let single = EpochSeries::from_julian_dates(vec![5.0]).unwrap();
        assert_eq!(single.span_days(), 0.0);
    }

    #[test]
    fn test_day_count_out_of_range() {
        let epochs = EpochSeries::from_julian_dates(vec![0.0, 1.0]).unwrap();
        assert!(matches!(
            epochs.day_count(2),
            Err(VisibilityError::EpochOutOfRange { index: 2, len: 2, .. })
        ));
    }
}
