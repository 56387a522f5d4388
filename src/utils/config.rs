//! Configuration constants

/// Offset between Julian Date and Modified Julian Date
pub const MJD_TO_JD: f64 = 2400000.5;

/// Maximum number of timestamps a generated epoch series may hold
pub const MAX_TIMESTAMPS: i64 = 100_000_000;

/// Default sky-grid resolution (longitude samples, latitude samples)
pub const DEFAULT_GRID_NPIX: (usize, usize) = (721, 361);
