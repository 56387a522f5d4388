/// Per-target contact statistics
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use super::contact::Contact;
use crate::ephemeris::{EpochSeries, SkyPosition};
use crate::error::Result;

/// Column order used by CSV export
pub const STATS_COLUMNS: [&str; 11] = [
    "name",
    "category",
    "mean_ra",
    "mean_dec",
    "n_contacts",
    "total_duration",
    "percentage_duration",
    "mean_duration",
    "stddev_duration",
    "min_duration",
    "max_duration",
];

/// Summary of one target's contacts
///
/// Durations are in days. With no contacts, the mean, standard deviation,
/// minimum and maximum are NaN rather than zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsRow {
    pub name: String,
    pub category: String,
    /// Mean right ascension in degrees, wrapped to [-180, 180)
    pub mean_ra: f64,
    /// Mean declination in degrees
    pub mean_dec: f64,
    pub n_contacts: usize,
    pub total_duration: f64,
    /// Share of the epoch span covered by contacts, in percent
    pub percentage_duration: f64,
    #[serde(deserialize_with = "nan_from_null")]
    pub mean_duration: f64,
    /// Population standard deviation
    #[serde(deserialize_with = "nan_from_null")]
    pub stddev_duration: f64,
    #[serde(deserialize_with = "nan_from_null")]
    pub min_duration: f64,
    #[serde(deserialize_with = "nan_from_null")]
    pub max_duration: f64,
}

/// serde_json writes NaN as `null`; read it back as NaN
fn nan_from_null<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Reduce a target's contacts into a statistics row
///
/// # Arguments
/// * `name`, `category` - Target labels
/// * `mean_position` - Mean ICRS position of the target
/// * `contacts` - Contacts of the target
/// * `epochs` - Epochs the contacts were extracted from
pub fn compute_stats(
    name: &str,
    category: &str,
    mean_position: SkyPosition,
    contacts: &[Contact],
    epochs: &EpochSeries,
) -> StatsRow {
    let durations: Vec<f64> = contacts.iter().map(|c| c.duration).collect();
    let n_contacts = durations.len();

    let mut row = StatsRow {
        name: name.to_string(),
        category: category.to_string(),
        mean_ra: mean_position.wrapped_lon_deg(),
        mean_dec: mean_position.lat_deg,
        n_contacts,
        total_duration: 0.0,
        percentage_duration: 0.0,
        mean_duration: f64::NAN,
        stddev_duration: f64::NAN,
        min_duration: f64::NAN,
        max_duration: f64::NAN,
    };

    if n_contacts == 0 {
        return row;
    }

    let total: f64 = durations.iter().sum();
    let mean = total / n_contacts as f64;
    let variance = durations.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n_contacts as f64;

    let span = epochs.span_days();
    row.percentage_duration = if span > 0.0 {
        100.0 * total / span
    } else {
        warn!("target '{name}' has contacts over a zero-length epoch span");
        0.0
    };
    row.total_duration = total;
    row.mean_duration = mean;
    row.stddev_duration = variance.sqrt();
    row.min_duration = durations.iter().copied().fold(f64::INFINITY, f64::min);
    row.max_duration = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    row
}

/// Statistics rows of several targets, in insertion order
///
/// Serializes as a bare JSON array of rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsTable {
    pub rows: Vec<StatsRow>,
}

impl StatsTable {
    pub fn new(rows: Vec<StatsRow>) -> Self {
        StatsTable { rows }
    }

    pub fn push(&mut self, row: StatsRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// JSON array of rows; NaN statistics serialize as `null`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read back a table written by [`StatsTable::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// CSV text with a header row, NaN written as `NaN`
    pub fn to_csv(&self) -> String {
        let mut out = STATS_COLUMNS.join(",");
        out.push('\n');
        for row in &self.rows {
            let fields = [
                csv_escape(&row.name),
                csv_escape(&row.category),
                row.mean_ra.to_string(),
                row.mean_dec.to_string(),
                row.n_contacts.to_string(),
                row.total_duration.to_string(),
                row.percentage_duration.to_string(),
                row.mean_duration.to_string(),
                row.stddev_duration.to_string(),
                row.min_duration.to_string(),
                row.max_duration.to_string(),
            ];
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(start: f64, end: f64) -> Contact {
        Contact {
            target: "t".to_string(),
            start,
            end,
            duration: end - start,
            benefit: 0.0,
            start_index: start as usize,
            end_index: end as usize,
        }
    }

    fn epochs() -> EpochSeries {
        EpochSeries::from_julian_dates((0..9).map(|i| i as f64).collect()).unwrap()
    }

    #[test]
    fn test_zero_contacts_yield_nan_statistics() {
        let row = compute_stats("t", "brown dwarf", SkyPosition::new(10.0, -5.0), &[], &epochs());
        assert_eq!(row.n_contacts, 0);
        assert_eq!(row.total_duration, 0.0);
        assert_eq!(row.percentage_duration, 0.0);
        assert!(row.mean_duration.is_nan());
        assert!(row.stddev_duration.is_nan());
        assert!(row.min_duration.is_nan());
        assert!(row.max_duration.is_nan());
    }

    #[test]
    fn test_contact_statistics() {
        let contacts = [contact(1.0, 3.0), contact(4.0, 8.0)];
        let row = compute_stats("t", "c", SkyPosition::new(200.0, 12.5), &contacts, &epochs());
        assert_eq!(row.n_contacts, 2);
        assert_eq!(row.total_duration, 6.0);
        assert_eq!(row.percentage_duration, 75.0);
        assert_eq!(row.mean_duration, 3.0);
        assert_eq!(row.stddev_duration, 1.0);
        assert_eq!(row.min_duration, 2.0);
        assert_eq!(row.max_duration, 4.0);
        assert_eq!(row.mean_ra, -160.0);
        assert_eq!(row.mean_dec, 12.5);
    }

    #[test]
    fn test_table_exports() {
        let table = StatsTable::new(vec![compute_stats(
            "Gl 229B",
            "brown, dwarf",
            SkyPosition::new(92.6, -21.9),
            &[],
            &epochs(),
        )]);
        let csv = table.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), STATS_COLUMNS.join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("Gl 229B,\"brown, dwarf\","));
        assert!(row.ends_with("NaN,NaN,NaN,NaN"));

        let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["n_contacts"], 0);
        assert!(json[0]["mean_duration"].is_null());
    }

    #[test]
    fn test_json_reads_back_with_nan_statistics() {
        let table = StatsTable::new(vec![
            compute_stats(
                "seen",
                "c",
                SkyPosition::new(1.0, 2.0),
                &[contact(1.0, 3.0)],
                &epochs(),
            ),
            compute_stats("unseen", "c", SkyPosition::new(3.0, 4.0), &[], &epochs()),
        ]);
        let json = table.to_json().unwrap();

        let restored = StatsTable::from_json(&json).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.rows[0].mean_duration, 2.0);
        assert_eq!(restored.rows[0].percentage_duration, 25.0);
        let unseen = &restored.rows[1];
        assert_eq!(unseen.name, "unseen");
        assert_eq!(unseen.n_contacts, 0);
        assert!(unseen.mean_duration.is_nan());
        assert!(unseen.stddev_duration.is_nan());
        assert!(unseen.min_duration.is_nan());
        assert!(unseen.max_duration.is_nan());

        let rows: Vec<StatsRow> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].max_duration.is_nan());
    }
}
