//! Sample storage collaborators.
//!
//! The scheduler and filters only depend on the [`Channel`] and
//! [`OutputGrid`] traits; the concrete grids and pixel formats here are
//! the implementations the crate ships with.

pub mod grid;
pub mod pixel;

pub use grid::{Channel, Grid, OutputGrid, SharedGrid};
pub use pixel::{ChannelView, PixelImage};
