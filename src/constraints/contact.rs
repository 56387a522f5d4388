//! Contact windows extracted from boolean visibility series
//!
//! A visibility series is run-length encoded and every visible run becomes a
//! [`Contact`]. Two edge rules apply:
//!
//! - a run's end index is clamped to the last valid epoch, so a run that
//!   reaches the end of the series closes at the final epoch rather than one
//!   past it;
//! - a run that starts at the very last epoch is always discarded, whatever
//!   its value, because it has no epoch to end on.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::ephemeris::EpochSeries;
use crate::error::{Result, VisibilityError};

/// Run-length encoding of an ordered sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLengths<T> {
    pub lengths: Vec<usize>,
    pub starts: Vec<usize>,
    pub values: Vec<T>,
}

impl<T> RunLengths<T> {
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

/// Run-length encode a sequence into (lengths, start indices, values)
///
/// An empty input yields empty runs.
pub fn run_length_encode<T, I>(values: I) -> RunLengths<T>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut runs = RunLengths {
        lengths: Vec::new(),
        starts: Vec::new(),
        values: Vec::new(),
    };

    for (i, value) in values.into_iter().enumerate() {
        match (runs.values.last(), runs.lengths.last_mut()) {
            (Some(current), Some(length)) if *current == value => *length += 1,
            _ => {
                runs.lengths.push(1);
                runs.starts.push(i);
                runs.values.push(value);
            }
        }
    }

    runs
}

/// How a contact's benefit is derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitMode {
    /// Benefit is `rate × duration`
    Differential { rate: f64 },
    /// Every contact carries the same benefit regardless of duration
    Fixed(f64),
}

impl BenefitMode {
    pub fn benefit(&self, duration: f64) -> f64 {
        match *self {
            BenefitMode::Differential { rate } => rate * duration,
            BenefitMode::Fixed(value) => value,
        }
    }
}

/// How contact start/end epochs are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStorage {
    /// Scalar day counts
    #[default]
    DayCount,
    /// Full epoch objects; not supported
    Verbose,
}

/// A maximal interval during which a target is visible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Name of the owning target
    pub target: String,
    /// Start epoch (days)
    pub start: f64,
    /// End epoch (days)
    pub end: f64,
    /// `end - start` in days
    pub duration: f64,
    pub benefit: f64,
    /// Index of the first visible epoch
    pub start_index: usize,
    /// Index of the closing epoch (clamped to the last epoch)
    pub end_index: usize,
}

impl Contact {
    fn new(
        target: &str,
        (start_index, end_index): (usize, usize),
        epochs: &EpochSeries,
        benefit: BenefitMode,
    ) -> Result<Self> {
        let start = epochs.day_count(start_index)?;
        let end = epochs.day_count(end_index)?;
        let duration = end - start;
        Ok(Contact {
            target: target.to_string(),
            start,
            end,
            duration,
            benefit: benefit.benefit(duration),
            start_index,
            end_index,
        })
    }
}

/// Convert a boolean visibility series into contact windows
///
/// # Arguments
/// * `target` - Name of the owning target, stored on every contact
/// * `visibility` - Visibility per epoch
/// * `epochs` - Epochs the series is sampled on
/// * `benefit` - Benefit accounting for the contacts
/// * `storage` - Epoch storage; only [`TimeStorage::DayCount`] is supported
///
/// # Errors
/// - `MismatchedTimebase` if the series and epochs differ in length
/// - `Unimplemented` for [`TimeStorage::Verbose`]
pub fn extract_contacts(
    target: &str,
    visibility: ArrayView1<bool>,
    epochs: &EpochSeries,
    benefit: BenefitMode,
    storage: TimeStorage,
) -> Result<Vec<Contact>> {
    if storage == TimeStorage::Verbose {
        return Err(VisibilityError::Unimplemented(
            "verbose time storage for contacts".to_string(),
        ));
    }
    if visibility.len() != epochs.len() {
        return Err(VisibilityError::MismatchedTimebase {
            owner: target.to_string(),
            item: "visibility".to_string(),
            expected: epochs.len(),
            found: visibility.len(),
        });
    }

    let n = visibility.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let last = n - 1;

    let runs = run_length_encode(visibility.iter().copied());
    let mut contacts = Vec::new();
    for i in 0..runs.len() {
        let start = runs.starts[i];
        if !runs.values[i] || start == last {
            continue;
        }
        let end = (start + runs.lengths[i]).min(last);
        contacts.push(Contact::new(target, (start, end), epochs, benefit)?);
    }

    Ok(contacts)
}
