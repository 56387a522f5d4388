//! Visibility → contacts → statistics pipeline for one or many targets

use log::{debug, info, warn};

use super::body::Occluder;
use super::contact::Contact;
use super::stats::{StatsRow, StatsTable};
use super::target::{Target, TargetVisibility};
use crate::error::Result;

/// Everything derived for one target
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub visibility: TargetVisibility,
    pub contacts: Vec<Contact>,
    pub stats: StatsRow,
}

/// Run the full pipeline for one target
pub fn analyse_target(target: &Target, occluders: &[Occluder]) -> Result<TargetReport> {
    let visibility = target.calculate_visibility(occluders)?;
    let contacts = target.calculate_contacts(&visibility.visibility)?;
    let stats = target.calculate_stats(&contacts)?;

    if contacts.is_empty() {
        warn!("target '{}' is never visible", target.name());
    } else {
        debug!(
            "target '{}': {} contacts, {:.2}% visible",
            target.name(),
            contacts.len(),
            stats.percentage_duration
        );
    }

    Ok(TargetReport {
        visibility,
        contacts,
        stats,
    })
}

/// Run the pipeline for every target, in order
///
/// The first failing target aborts the survey.
pub fn survey(targets: &[Target], occluders: &[Occluder]) -> Result<Vec<TargetReport>> {
    info!(
        "analysing {} targets against {} occluders",
        targets.len(),
        occluders.len()
    );
    let reports = targets
        .iter()
        .map(|target| analyse_target(target, occluders))
        .collect::<Result<Vec<_>>>()?;

    let total_contacts: usize = reports.iter().map(|r| r.contacts.len()).sum();
    info!("survey complete: {total_contacts} contacts");
    Ok(reports)
}

/// Statistics rows of a set of reports
pub fn stats_table(reports: &[TargetReport]) -> StatsTable {
    StatsTable::new(reports.iter().map(|r| r.stats.clone()).collect())
}
