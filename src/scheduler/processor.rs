//! Region processors: the unit of schedulable work.
//!
//! A region processor receives one [`Region`] and performs its work over
//! it. Processors carry no per-call state, so the same processor may be
//! invoked concurrently on disjoint regions as long as it only writes to
//! coordinates inside the region it was handed.
//!
//! Any `Fn(Region) + Sync` closure is a processor. Point-wise work is
//! lifted into a processor with [`points`] or [`all_points`].

use crate::geometry::{Point, Region};

/// Work that can be scheduled over a rectangular region.
pub trait RegionProcessor: Sync {
    fn process(&self, region: Region);
}

impl<F> RegionProcessor for F
where
    F: Fn(Region) + Sync,
{
    #[inline]
    fn process(&self, region: Region) {
        self(region)
    }
}

/// Visit points of a region on a strided lattice.
///
/// The returned processor visits, in row-major order, every point
/// `min + offset + (i * step_x, j * step_y)` that lies inside the region it
/// is given. Non-positive steps or a negative offset produce a no-op
/// processor.
///
/// # Arguments
/// * `offset` - Start of the lattice relative to the region's min corner
/// * `step_x` - Horizontal distance between visited points
/// * `step_y` - Vertical distance between visited points
/// * `pp` - Point processor invoked for each visited point
pub fn points<F>(offset: Point, step_x: i32, step_y: i32, pp: F) -> impl RegionProcessor
where
    F: Fn(Point) + Sync,
{
    let active = step_x > 0 && step_y > 0 && offset.x >= 0 && offset.y >= 0;

    move |region: Region| {
        if !active {
            return;
        }
        let origin = region.min + offset;
        for y in (origin.y..region.max.y).step_by(step_y as usize) {
            for x in (origin.x..region.max.x).step_by(step_x as usize) {
                pp(Point::new(x, y));
            }
        }
    }
}

/// Visit every point of a region, row by row.
pub fn all_points<F>(pp: F) -> impl RegionProcessor
where
    F: Fn(Point) + Sync,
{
    points(Point::ORIGIN, 1, 1, pp)
}
