//! Box-difference edge detection.
//!
//! For a radius `r` two box averages are taken, one along rows and one
//! along columns. At each input point the horizontal response is the
//! absolute difference between the row average ending at the point
//! (window `[x - r + 1, x + 1)`) and the one starting just after it
//! (window `[x + 1, x + r + 1)`); the vertical response is the same along
//! columns. A response whose operand falls outside the averaged grid is 0,
//! so the last row and column of an image never report an edge across the
//! border.
//!
//! The two responses are combined per [`EdgePolicy`]. With
//! [`EdgeOptions::padding`] each average also spans that many lines on
//! either side across its sliding axis.

use log::debug;

use crate::error::Result;
use crate::filters::average::{band_average_with, Direction};
use crate::geometry::Point;
use crate::image::{Channel, Grid, OutputGrid, PixelImage, SharedGrid};
use crate::scheduler::{all_points, Scheduler};

/// How horizontal and vertical responses merge into one edge strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Stronger of the two responses.
    #[default]
    Max,
    /// Floor mean of the two responses.
    Mean,
}

impl EdgePolicy {
    /// Merge a horizontal and a vertical response.
    pub fn combine(self, horizontal: u16, vertical: u16) -> u16 {
        match self {
            EdgePolicy::Max => horizontal.max(vertical),
            EdgePolicy::Mean => ((horizontal as u32 + vertical as u32) / 2) as u16,
        }
    }
}

/// Absolute difference of two averaged samples, 0 if either is missing.
fn difference(averages: &Grid, before: Point, after: Point) -> u16 {
    match (averages.get(before.x, before.y), averages.get(after.x, after.y)) {
        (Some(a), Some(b)) => a.abs_diff(b),
        _ => 0,
    }
}

/// Settings for [`edges_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeOptions {
    pub policy: EdgePolicy,
    /// Lines averaged on either side across each window; negative gives
    /// an all-zero result.
    pub padding: i32,
}

impl From<EdgePolicy> for EdgeOptions {
    fn from(policy: EdgePolicy) -> Self {
        EdgeOptions { policy, padding: 0 }
    }
}

/// Edge strength of `channel` at `radius` with the default policy and
/// scheduler.
pub fn edges<C>(radius: i32, channel: &C) -> Grid
where
    C: Channel + ?Sized,
{
    edges_with(&Scheduler::from_pool(), radius, channel, EdgePolicy::default())
}

/// Edge strength of `channel` at `radius`.
///
/// The output has the channel's bounds. `radius < 1` yields all zeros.
/// Both averaging passes and the combination pass run on `scheduler`.
pub fn edges_with<C>(scheduler: &Scheduler, radius: i32, channel: &C, policy: EdgePolicy) -> Grid
where
    C: Channel + ?Sized,
{
    edges_with_options(scheduler, radius, channel, policy.into())
}

/// Edge strength of `channel` at `radius` with band-averaged windows.
///
/// Each window spans `options.padding` lines on either side across its
/// sliding axis, which smooths the response along the edge. The output has
/// the channel's bounds; `radius < 1` or a negative padding yields all
/// zeros.
pub fn edges_with_options<C>(scheduler: &Scheduler, radius: i32, channel: &C, options: EdgeOptions) -> Grid
where
    C: Channel + ?Sized,
{
    let bounds = channel.bounds();
    let EdgeOptions { policy, padding } = options;
    if radius < 1 || padding < 0 || bounds.is_empty() {
        return Grid::new(bounds);
    }

    let horizontal = band_average_with(scheduler, radius, padding, channel, Direction::Horizontal);
    let vertical = band_average_with(scheduler, radius, padding, channel, Direction::Vertical);
    debug!(
        "edges: radius {} padding {} over {} ({:?}, parallelism {})",
        radius,
        padding,
        bounds,
        policy,
        scheduler.parallelism()
    );

    let shift = radius - 1;
    let out = SharedGrid::new(bounds);
    scheduler.run(
        bounds,
        &all_points(|pt: Point| {
            let h = difference(
                &horizontal,
                Point::new(pt.x - shift, pt.y),
                Point::new(pt.x + 1, pt.y),
            );
            let v = difference(
                &vertical,
                Point::new(pt.x, pt.y - shift),
                Point::new(pt.x, pt.y + 1),
            );
            out.set(pt.x, pt.y, policy.combine(h, v));
        }),
    );
    out.into_grid()
}

/// Edge strength of every channel of `image`.
///
/// Gray images give a 16-bit gray result, RGBA images a 16-bit RGBA result
/// with each channel (alpha included) filtered on its own. `options` is an
/// [`EdgeOptions`] or just an [`EdgePolicy`].
pub fn image_edges(
    scheduler: &Scheduler,
    image: &PixelImage,
    radius: i32,
    options: impl Into<EdgeOptions>,
) -> Result<PixelImage> {
    let options = options.into();
    let planes: Vec<Grid> = image
        .channels()
        .iter()
        .map(|channel| edges_with_options(scheduler, radius, channel, options))
        .collect();
    let channels: Vec<&dyn Channel> = planes.iter().map(|g| g as &dyn Channel).collect();
    PixelImage::from_channels(scheduler, &channels)
}
