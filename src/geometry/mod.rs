//! Integer geometry shared by the scheduler and the filters.
//!
//! - **Point**: an (x, y) cursor
//! - **Region**: an axis-aligned rectangle, half-open on its max corner

pub mod region;

pub use region::{Point, Region};
