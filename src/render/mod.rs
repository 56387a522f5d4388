//! Sky-grid rendering of occluder and target footprints
//!
//! Produces per-epoch boolean bitmaps over a longitude/latitude grid,
//! either one epoch at a time or as a parallel, cancellable batch.

pub mod bitmap;
pub mod grid;
pub mod separation;

pub use bitmap::{BitmapPair, CancellationToken, RendererConfig, SkyGridRenderer};
pub use grid::SkyGrid;
pub use separation::{
    AcceleratedSeparation, ReferenceSeparation, SeparationKind, SeparationStrategy,
};
