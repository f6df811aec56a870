//! Filters built on the region scheduler.
//!
//! ## Filters
//!
//! | Filter | Output bounds | Description |
//! |--------|---------------|-------------|
//! | `row_average` | min x extended by `radius - 1` | Sliding box mean along rows |
//! | `column_average` | min y extended by `radius - 1` | Sliding box mean along columns |
//! | `band_average_with` | as above | Box mean over `2 * padding + 1` lines |
//! | `edges` | input bounds | Box-difference edge strength |
//!
//! Filters read any [`Channel`](crate::image::Channel) and return a
//! [`Grid`](crate::image::Grid) of 16-bit samples. The `*_with` variants
//! take an explicit [`Scheduler`](crate::scheduler::Scheduler); the plain
//! ones use the current rayon pool's parallelism.

pub mod average;
pub mod edge;

pub use average::{
    band_average_with, box_average, box_average_with, column_average, image_mean, region_mean,
    row_average, Direction,
};
pub use edge::{edges, edges_with, edges_with_options, image_edges, EdgeOptions, EdgePolicy};
