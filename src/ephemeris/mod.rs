//! Epoch series and per-epoch sky positions
//!
//! Frame conversion and ephemeris propagation are done by the caller; this module
//! only holds the already-computed series the visibility pipeline consumes.

pub mod ephemeris_common;
pub mod sky_track;

pub use ephemeris_common::EpochSeries;
pub use sky_track::{Frame, SkyPosition, SkyTrack};
