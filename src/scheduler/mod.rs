//! Rectangle-partitioning scheduler.
//!
//! Splits a region into disjoint sub-regions, runs a [`RegionProcessor`]
//! on each of them concurrently and joins before returning.
//!
//! - [`processor`]: the processor trait and point-wise adapters
//! - [`partition`]: stripe and bubble partitioners plus combinators
//! - [`dispatch`]: spawning processors onto a rayon scope
//! - [`auto`]: the [`Scheduler`] that ties partitioning and dispatch together
//!
//! ```ignore
//! let out = SharedGrid::new(bounds);
//! run_parallel(bounds, &all_points(|pt| out.set(pt.x, pt.y, f(pt))));
//! let grid = out.into_grid();
//! ```

pub mod auto;
pub mod dispatch;
pub mod partition;
pub mod processor;

pub use auto::{quick, run_parallel, Scheduler};
pub use dispatch::{Concurrent, Dispatcher};
pub use partition::{
    columns, n_columns, n_rectangles, n_rows, partition_arbitrary, partition_bubbles,
    partition_by_count, partition_by_size, partition_stripes, rows, Bubbles, Lattice,
    StripeAxis, Stripes,
};
pub use processor::{all_points, points, RegionProcessor};
