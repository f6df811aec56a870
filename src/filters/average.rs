//! Sliding-window box averages.
//!
//! For every output coordinate `o` along one axis the filter emits the
//! floor mean of the input samples in `[o, o + radius)`, clipped to the
//! input. The output therefore extends `radius - 1` samples before the
//! input's min edge: the first outputs average a growing head window and
//! the last ones a shrinking tail window, each weighted only by the number
//! of samples it actually covers (no zero padding).
//!
//! ## Algorithm
//!
//! One pass per line with a running sum `n` and a valid-sample count `d`:
//! 1. **Head**: add the entering sample, `d += 1`
//! 2. **Middle**: add the entering sample, subtract the leaving one
//! 3. **Tail**: subtract the leaving sample, `d -= 1`
//!
//! When `radius` exceeds the line length the window covers the whole line
//! for a while; those outputs repeat the full-line mean. Each output is
//! `n / d` with integer truncation, so results are bit-exact against a
//! brute-force recomputation.
//!
//! With a `padding` the window also spans `padding` lines on either side
//! across the sliding axis; each line position then contributes the sum of
//! its band and `d` counts band samples instead of positions.
//!
//! Lines are spread over the scheduler: each task owns a contiguous block of
//! rows (horizontal pass) or columns (vertical pass) and writes only those.

use crate::geometry::{Point, Region};
use crate::image::{Channel, Grid, OutputGrid, PixelImage, SharedGrid};
use crate::scheduler::Scheduler;

/// Axis a box average slides along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Along each row (x varies).
    Horizontal,
    /// Along each column (y varies).
    Vertical,
}

/// Walk the three phases over one line of `len` column sums.
///
/// `sample(i)` is the sum of the `weight` band samples at line position
/// `i` in `0..len`; `emit(k, mean)` receives output position `k` in
/// `0..len + radius - 1`.
fn slide_line<S, E>(len: usize, radius: usize, weight: u64, sample: S, mut emit: E)
where
    S: Fn(usize) -> u64,
    E: FnMut(usize, u16),
{
    if len == 0 || radius == 0 || weight == 0 {
        return;
    }

    let mut n = 0u64;
    let mut d = 0u64;
    let mut k = 0usize;
    let full = len.min(radius);

    // Head: window still growing
    for i in 0..full {
        n += sample(i);
        d += weight;
        emit(k, (n / d) as u16);
        k += 1;
    }

    // Middle: window full, one sample in and one out
    for i in radius..len {
        n += sample(i);
        n -= sample(i - radius);
        emit(k, (n / d) as u16);
        k += 1;
    }

    // Window wider than the line: it covers everything for a while
    for _ in len..radius {
        emit(k, (n / d) as u16);
        k += 1;
    }

    // Tail: window shrinking at the far end
    for i in (len - full)..(len - 1) {
        n -= sample(i);
        d -= weight;
        emit(k, (n / d) as u16);
        k += 1;
    }
}

/// Lines `[c - padding, c + padding]` clipped to `[min, max)`, as i32 bounds.
fn band(c: i32, padding: i32, min: i32, max: i32) -> (i32, i32) {
    let lo = (c as i64 - padding as i64).max(min as i64);
    let hi = (c as i64 + padding as i64 + 1).min(max as i64);
    (lo as i32, hi as i32)
}

/// Box average of `channel` along `direction`, scheduled on `scheduler`.
///
/// # Arguments
/// * `scheduler` - Executor the lines are spread over
/// * `radius` - Window length in samples; `radius < 1` gives a zero grid
/// * `channel` - Input samples
/// * `direction` - Axis to slide along
///
/// # Returns
/// Grid whose bounds extend the input's by `radius - 1` before its min
/// edge along `direction`. For `radius < 1` the grid is all zeros with the
/// input's bounds.
pub fn box_average_with<C>(scheduler: &Scheduler, radius: i32, channel: &C, direction: Direction) -> Grid
where
    C: Channel + ?Sized,
{
    band_average_with(scheduler, radius, 0, channel, direction)
}

/// Box average over a band of `2 * padding + 1` lines.
///
/// Like [`box_average_with`], but every window also spans `padding` lines
/// on either side across the sliding axis (clipped to the input), and the
/// mean is taken over all samples the window covers. `padding == 0` is the
/// plain box average; `padding < 0` gives a zero grid with the input's
/// bounds.
pub fn band_average_with<C>(
    scheduler: &Scheduler,
    radius: i32,
    padding: i32,
    channel: &C,
    direction: Direction,
) -> Grid
where
    C: Channel + ?Sized,
{
    let bounds = channel.bounds();
    if radius < 1 || padding < 0 || bounds.is_empty() {
        return Grid::new(bounds);
    }

    let extra = radius - 1;
    let window = radius as usize;

    match direction {
        Direction::Horizontal => {
            let out_bounds = Region::new(
                bounds.min.x.saturating_sub(extra),
                bounds.min.y,
                bounds.max.x,
                bounds.max.y,
            );
            let out = SharedGrid::new(out_bounds);
            let len = bounds.width() as usize;

            // One unit of width per row: the scheduler splits it into row bands
            let lines = Region::new(0, bounds.min.y, 1, bounds.max.y);
            scheduler.run(lines, &|part: Region| {
                let mut sums = vec![0u64; len];
                for y in part.min.y..part.max.y {
                    let (y0, y1) = band(y, padding, bounds.min.y, bounds.max.y);
                    for (i, sum) in sums.iter_mut().enumerate() {
                        let x = bounds.min.x + i as i32;
                        *sum = (y0..y1).map(|yy| channel.sample(x, yy) as u64).sum();
                    }
                    slide_line(
                        len,
                        window,
                        (y1 - y0) as u64,
                        |i| sums[i],
                        |k, mean| out.set(out_bounds.min.x + k as i32, y, mean),
                    );
                }
            });
            out.into_grid()
        }
        Direction::Vertical => {
            let out_bounds = Region::new(
                bounds.min.x,
                bounds.min.y.saturating_sub(extra),
                bounds.max.x,
                bounds.max.y,
            );
            let out = SharedGrid::new(out_bounds);
            let len = bounds.height() as usize;

            let lines = Region::new(bounds.min.x, 0, bounds.max.x, 1);
            scheduler.run(lines, &|part: Region| {
                let mut sums = vec![0u64; len];
                for x in part.min.x..part.max.x {
                    let (x0, x1) = band(x, padding, bounds.min.x, bounds.max.x);
                    for (i, sum) in sums.iter_mut().enumerate() {
                        let y = bounds.min.y + i as i32;
                        *sum = (x0..x1).map(|xx| channel.sample(xx, y) as u64).sum();
                    }
                    slide_line(
                        len,
                        window,
                        (x1 - x0) as u64,
                        |i| sums[i],
                        |k, mean| out.set(x, out_bounds.min.y + k as i32, mean),
                    );
                }
            });
            out.into_grid()
        }
    }
}

/// Box average along `direction` on the default scheduler.
pub fn box_average<C>(radius: i32, channel: &C, direction: Direction) -> Grid
where
    C: Channel + ?Sized,
{
    box_average_with(&Scheduler::from_pool(), radius, channel, direction)
}

/// Horizontal box average: each row is averaged on its own.
pub fn row_average<C>(radius: i32, channel: &C) -> Grid
where
    C: Channel + ?Sized,
{
    box_average(radius, channel, Direction::Horizontal)
}

/// Vertical box average: each column is averaged on its own.
pub fn column_average<C>(radius: i32, channel: &C) -> Grid
where
    C: Channel + ?Sized,
{
    box_average(radius, channel, Direction::Vertical)
}

// ============================================================================
// Region means
// ============================================================================

/// Floor mean of the samples of `channel` inside `region`.
///
/// The region is clipped to the channel bounds first; an empty overlap
/// gives 0.
pub fn region_mean<C>(region: Region, channel: &C) -> u16
where
    C: Channel + ?Sized,
{
    let area = region.intersect(&channel.bounds());
    let count = area.area();
    if count == 0 {
        return 0;
    }
    let sum: u64 = area
        .points()
        .map(|pt: Point| channel.sample(pt.x, pt.y) as u64)
        .sum();
    (sum / count) as u16
}

/// Per-channel floor means of `image` inside `region` (gray, or R, G, B, A).
pub fn image_mean(image: &PixelImage, region: Region) -> Vec<u16> {
    image
        .channels()
        .iter()
        .map(|channel| region_mean(region, channel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(len: i32, horizontal: bool) -> Grid {
        let bounds = if horizontal {
            Region::with_size(len, 1)
        } else {
            Region::with_size(1, len)
        };
        Grid::from_shape_vec(bounds, (0..len).map(|v| v as u16).collect()).unwrap()
    }

    /// Deterministic pseudo-random samples over `bounds`.
    fn noise(bounds: Region, seed: u32) -> Grid {
        let mut state = seed;
        let samples = (0..bounds.area())
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 16) as u16
            })
            .collect();
        Grid::from_shape_vec(bounds, samples).unwrap()
    }

    /// Recompute one output sample directly from the input.
    fn brute_force(input: &Grid, radius: i32, direction: Direction, at: Point) -> u16 {
        let b = input.bounds();
        let window = match direction {
            Direction::Horizontal => Region::new(at.x, at.y, at.x + radius, at.y + 1),
            Direction::Vertical => Region::new(at.x, at.y, at.x + 1, at.y + radius),
        };
        region_mean(window.intersect(&b), input)
    }

    #[test]
    fn test_row_average_1024() {
        let input = line(1024, true);
        let result = box_average_with(&Scheduler::new(4), 10, &input, Direction::Horizontal);
        assert_eq!(result.bounds(), Region::new(-9, 0, 1024, 1));

        for i in 0..1024 {
            let mut n = 0;
            let mut d = 0;
            let mut j = 0;
            while j < 10 && i + j < 1024 {
                n += i + j;
                d += 1;
                j += 1;
            }
            let expected = (n / d) as u16;
            assert_eq!(result.get(i, 0), Some(expected), "x={}", i);
        }

        // Partial head windows before the input's min edge
        for i in -9..0 {
            let covered = i + 10;
            let expected = ((0..covered).sum::<i32>() / covered) as u16;
            assert_eq!(result.get(i, 0), Some(expected), "x={}", i);
        }
    }

    #[test]
    fn test_column_average_1024() {
        let input = line(1024, false);
        let result = box_average_with(&Scheduler::new(3), 10, &input, Direction::Vertical);
        assert_eq!(result.bounds(), Region::new(0, -9, 1, 1024));

        for i in -9..1024 {
            let expected = brute_force(&input, 10, Direction::Vertical, Point::new(0, i));
            assert_eq!(result.get(0, i), Some(expected), "y={}", i);
        }
        assert_eq!(result.get(0, 1023), Some(1023));
        assert_eq!(result.get(0, 1014), Some((1014..1024).sum::<i32>() as u16 / 10));
    }

    #[test]
    fn test_matches_brute_force_on_noise() {
        let input = noise(Region::new(-4, 7, 37, 30), 17);
        for radius in [1, 2, 5, 23, 41, 60] {
            for direction in [Direction::Horizontal, Direction::Vertical] {
                let result = box_average_with(&Scheduler::new(4), radius, &input, direction);
                for pt in result.bounds().points() {
                    assert_eq!(
                        result.get(pt.x, pt.y),
                        Some(brute_force(&input, radius, direction, pt)),
                        "radius {} {:?} at {}",
                        radius,
                        direction,
                        pt
                    );
                }
            }
        }
    }

    fn brute_force_band(input: &Grid, radius: i32, padding: i32, direction: Direction, at: Point) -> u16 {
        let window = match direction {
            Direction::Horizontal => Region::new(at.x, at.y - padding, at.x + radius, at.y + padding + 1),
            Direction::Vertical => Region::new(at.x - padding, at.y, at.x + padding + 1, at.y + radius),
        };
        region_mean(window, input)
    }

    #[test]
    fn test_band_average_matches_brute_force() {
        let input = noise(Region::new(-6, 3, 29, 24), 41);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        for (radius, padding) in [(1, 1), (4, 2), (9, 5), (50, 30)] {
            for direction in [Direction::Horizontal, Direction::Vertical] {
                let result = pool.install(|| {
                    band_average_with(&Scheduler::new(3), radius, padding, &input, direction)
                });
                for pt in result.bounds().points() {
                    assert_eq!(
                        result.get(pt.x, pt.y),
                        Some(brute_force_band(&input, radius, padding, direction, pt)),
                        "radius {} padding {} {:?} at {}",
                        radius,
                        padding,
                        direction,
                        pt
                    );
                }
            }
        }
    }

    #[test]
    fn test_band_padding_zero_and_negative() {
        let input = noise(Region::with_size(23, 11), 8);
        let scheduler = Scheduler::new(2);
        for direction in [Direction::Horizontal, Direction::Vertical] {
            assert_eq!(
                band_average_with(&scheduler, 6, 0, &input, direction),
                box_average_with(&scheduler, 6, &input, direction)
            );
            let zeros = band_average_with(&scheduler, 6, -1, &input, direction);
            assert_eq!(zeros.bounds(), input.bounds());
            assert!(zeros.view().iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_radius_wider_than_line() {
        // 3 samples, window of 5: 7 outputs, middle ones are the full mean
        let input = Grid::from_shape_vec(Region::with_size(3, 1), vec![3, 6, 10]).unwrap();
        let result = box_average_with(&Scheduler::sequential(), 5, &input, Direction::Horizontal);
        assert_eq!(result.to_vec(), vec![3, 4, 6, 6, 6, 8, 10]);
    }

    #[test]
    fn test_radius_one_is_identity() {
        let input = noise(Region::with_size(9, 4), 3);
        let result = box_average_with(&Scheduler::new(2), 1, &input, Direction::Vertical);
        assert_eq!(result, input);
    }

    #[test]
    fn test_non_positive_radius_gives_zeros() {
        let input = noise(Region::new(2, 2, 12, 5), 5);
        for radius in [0, -1, -40] {
            let result = row_average(radius, &input);
            assert_eq!(result.bounds(), input.bounds());
            assert!(result.view().iter().all(|&v| v == 0));
            let result = column_average(radius, &input);
            assert!(result.view().iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input = noise(Region::new(0, 0, 200, 77), 99);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        for direction in [Direction::Horizontal, Direction::Vertical] {
            let expected = box_average_with(&Scheduler::sequential(), 7, &input, direction);
            let parallel = pool.install(|| box_average_with(&Scheduler::new(8), 7, &input, direction));
            assert_eq!(parallel, expected);
        }
    }

    #[test]
    fn test_region_mean_clips_to_bounds() {
        let input = Grid::from_shape_vec(Region::with_size(2, 2), vec![10, 20, 30, 41]).unwrap();
        assert_eq!(region_mean(Region::new(-5, -5, 50, 50), &input), 25);
        assert_eq!(region_mean(Region::new(1, 0, 2, 2), &input), 30);
        assert_eq!(region_mean(Region::new(3, 3, 9, 9), &input), 0);
        assert_eq!(region_mean(Region::new(1, 1, 0, 0), &input), 0);
    }

    #[test]
    fn test_image_mean_per_channel() {
        let img = PixelImage::from_rgba8(2, 1, vec![0, 10, 255, 255, 2, 20, 255, 0]).unwrap();
        let means = image_mean(&img, img.bounds());
        assert_eq!(means, vec![257, 15 * 257, 0xffff, 0xffff / 2]);
    }
}
