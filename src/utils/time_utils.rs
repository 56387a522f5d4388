//! Time utilities for epoch series

use chrono::{DateTime, Duration, Utc};
use hifitime::Epoch;

use crate::error::{Result, VisibilityError};
use crate::utils::config::{MAX_TIMESTAMPS, MJD_TO_JD};

/// Convert chrono `DateTime<Utc>` to hifitime `Epoch`
#[inline]
pub fn chrono_to_epoch(dt: &DateTime<Utc>) -> Epoch {
    let nanos = (dt.timestamp() as i128) * 1_000_000_000 + (dt.timestamp_subsec_nanos() as i128);
    Epoch::from_unix_duration(hifitime::Duration::from_total_nanoseconds(nanos))
}

/// Convert DateTime to MJD (UTC)
#[inline]
pub fn datetime_to_mjd(dt: &DateTime<Utc>) -> f64 {
    chrono_to_epoch(dt).to_mjd_utc_days()
}

/// Convert DateTime to Julian Date (UTC)
#[inline]
pub fn datetime_to_jd(dt: &DateTime<Utc>) -> f64 {
    datetime_to_mjd(dt) + MJD_TO_JD
}

/// Generate a vector of timestamps from begin to end (inclusive) with step_size in seconds
///
/// # Errors
/// Returns `InvalidConfiguration` if:
/// - begin > end
/// - step_size <= 0
/// - Expected timestamp count exceeds MAX_TIMESTAMPS
pub fn generate_timestamps(
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
    step_size: i64,
) -> Result<Vec<DateTime<Utc>>> {
    if begin > end {
        return Err(VisibilityError::InvalidConfiguration(
            "begin must be before or equal to end".to_string(),
        ));
    }
    if step_size <= 0 {
        return Err(VisibilityError::InvalidConfiguration(
            "step_size must be positive".to_string(),
        ));
    }

    let time_range_secs = (end - begin).num_seconds();
    let expected_count = time_range_secs / step_size + 1;
    if expected_count > MAX_TIMESTAMPS {
        return Err(VisibilityError::InvalidConfiguration(format!(
            "Time range would generate approximately {expected_count} timestamps \
             (max: {MAX_TIMESTAMPS}). Use a larger step_size."
        )));
    }

    let mut times = Vec::with_capacity(expected_count as usize);
    let mut current = begin;
    let step_duration = Duration::seconds(step_size);

    while current <= end {
        times.push(current);
        current += step_duration;
    }

    Ok(times)
}
