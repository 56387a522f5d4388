// Module declarations
pub mod constraints;
pub mod ephemeris;
pub mod error;
pub mod render;
pub mod utils;

// Re-export public API
pub use constraints::{
    analyse_target, compute_stats, extract_contacts, stats_table, survey, BenefitMode, Contact,
    Occluder, OccluderConfig, SkyBody, SoftBand, StatsRow, StatsTable, Subtarget,
    SubtargetShape, SubtargetVisibility, Target, TargetConfig, TargetReport, TargetVisibility,
    TimeStorage,
};
pub use ephemeris::{EpochSeries, Frame, SkyPosition, SkyTrack};
pub use error::{RenderError, Result, VisibilityError};
pub use render::{
    BitmapPair, CancellationToken, RendererConfig, SeparationKind, SkyGrid, SkyGridRenderer,
};
