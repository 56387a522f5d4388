//! Visibility constraint evaluation
//!
//! This module determines when observation targets are unobstructed by
//! solar-system bodies, turns the resulting timelines into contact windows
//! and summarises them per target.

pub mod analysis;
pub mod body;
pub mod contact;
pub mod exclusion;
pub mod stats;
pub mod subtarget;
pub mod target;

// Re-export main types
pub use analysis::{analyse_target, stats_table, survey, TargetReport};
pub use body::{Occluder, OccluderConfig, SkyBody};
pub use contact::{
    extract_contacts, run_length_encode, BenefitMode, Contact, RunLengths, TimeStorage,
};
pub use exclusion::{hard_visible, is_visible, visibility_mask, SoftBand};
pub use stats::{compute_stats, StatsRow, StatsTable, STATS_COLUMNS};
pub use subtarget::{Subtarget, SubtargetShape, SubtargetVisibility};
pub use target::{mean_sky_position, Target, TargetConfig, TargetVisibility};
