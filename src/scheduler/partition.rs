//! Partitioning of regions into disjoint sub-regions.
//!
//! Every partitioner here upholds the same contract: the produced
//! sub-regions are pairwise disjoint and their union is exactly the input
//! region. Degenerate requests (empty region, non-positive size, count or
//! stride) produce nothing.
//!
//! ## Variants
//!
//! | Function | Shape | Remainder |
//! |----------|-------|-----------|
//! | [`partition_by_size`] | stripes of exactly `size` | last stripe, shorter |
//! | [`partition_by_count`] | at most `n` stripes, `ceil(len / n)` each | last stripe, shorter |
//! | [`partition_arbitrary`] | `partition_by_count` along the longer axis | last stripe, shorter |
//! | [`partition_stripes`] | exactly `n` stripes, `floor(len / n)` each | last stripe, longer |
//! | [`partition_bubbles`] | interleaved strided lattices | none |
//!
//! The `rows`, `columns`, `n_rows`, `n_columns` and `n_rectangles`
//! combinators wrap a [`RegionProcessor`] so that it is invoked once per
//! sub-region.

use crate::geometry::{Point, Region};

use super::processor::RegionProcessor;

/// Axis along which a region is cut into stripes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeAxis {
    /// Horizontal bands spanning the full width, stacked along y.
    Rows,
    /// Vertical bands spanning the full height, laid out along x.
    Columns,
}

impl StripeAxis {
    /// The axis that cuts the longer side of `region`. Ties cut rows.
    pub fn longer(region: &Region) -> StripeAxis {
        if region.width() > region.height() {
            StripeAxis::Columns
        } else {
            StripeAxis::Rows
        }
    }

    /// Extent of `region` along the cut direction.
    pub fn extent(self, region: &Region) -> i64 {
        match self {
            StripeAxis::Rows => region.height(),
            StripeAxis::Columns => region.width(),
        }
    }

    /// The sub-region of `region` between `start` and `end` on this axis.
    ///
    /// Both ends lie within the region's own bounds on this axis.
    fn slice(self, region: &Region, start: i64, end: i64) -> Region {
        let (start, end) = (start as i32, end as i32);
        match self {
            StripeAxis::Rows => Region::new(region.min.x, start, region.max.x, end),
            StripeAxis::Columns => Region::new(start, region.min.y, end, region.max.y),
        }
    }

    fn bounds(self, region: &Region) -> (i64, i64) {
        let (start, end) = match self {
            StripeAxis::Rows => (region.min.y, region.max.y),
            StripeAxis::Columns => (region.min.x, region.max.x),
        };
        (start as i64, end as i64)
    }
}

// ============================================================================
// Contiguous stripes
// ============================================================================

/// Iterator over fixed-size stripes of a region.
///
/// Every stripe except the last is exactly `size` long; the last one takes
/// whatever remains and is never empty.
#[derive(Debug, Clone)]
pub struct Stripes {
    region: Region,
    axis: StripeAxis,
    size: i64,
    cursor: i64,
    done: bool,
}

impl Stripes {
    fn new(region: Region, size: i64, axis: StripeAxis) -> Self {
        let (start, _) = axis.bounds(&region);
        Stripes {
            region,
            axis,
            size,
            cursor: start,
            done: size <= 0 || region.is_empty(),
        }
    }

    fn empty() -> Self {
        Stripes {
            region: Region::ZERO,
            axis: StripeAxis::Rows,
            size: 0,
            cursor: 0,
            done: true,
        }
    }

    pub fn axis(&self) -> StripeAxis {
        self.axis
    }
}

impl Iterator for Stripes {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        if self.done {
            return None;
        }
        let (_, end) = self.axis.bounds(&self.region);
        let start = self.cursor;

        // Remaining length fits in the current stripe: this is the last one
        if end - start <= self.size {
            self.done = true;
            return Some(self.axis.slice(&self.region, start, end));
        }

        self.cursor = start + self.size;
        Some(self.axis.slice(&self.region, start, self.cursor))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let (_, end) = self.axis.bounds(&self.region);
        let remaining = end - self.cursor;
        let n = ((remaining + self.size - 1) / self.size) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Stripes {}

impl std::iter::FusedIterator for Stripes {}

/// Cut `region` into stripes of `size` along `axis`.
///
/// # Arguments
/// * `region` - Region to cut
/// * `size` - Stripe length along the cut direction; `size <= 0` yields nothing
/// * `axis` - Whether to cut rows or columns
///
/// # Returns
/// Iterator over the stripes, in increasing coordinate order
pub fn partition_by_size(region: Region, size: i32, axis: StripeAxis) -> Stripes {
    Stripes::new(region, size as i64, axis)
}

/// Cut `region` into at most `n` stripes of equal, rounded-up size.
///
/// The stripe size is `ceil(len / n)`, so the last stripe may be shorter
/// and fewer than `n` stripes come out when `len` is small. `n <= 0`
/// yields nothing.
pub fn partition_by_count(region: Region, n: i32, axis: StripeAxis) -> Stripes {
    if n <= 0 || region.is_empty() {
        return Stripes::empty();
    }
    let len = axis.extent(&region);
    let n = n as i64;
    Stripes::new(region, (len + n - 1) / n, axis)
}

/// Cut `region` into at most `n` stripes along its longer side.
///
/// Cutting the longer side keeps the pieces as square as possible, so no
/// task ends up with a sliver when the region is much wider than tall (or
/// the reverse).
pub fn partition_arbitrary(region: Region, n: i32) -> Stripes {
    partition_by_count(region, n, StripeAxis::longer(&region))
}

/// Cut `region` into exactly `n` stripes of `floor(len / n)` along its
/// longer side, folding the division remainder into the final stripe.
///
/// When the floor size is zero (fewer lines than stripes) the whole region
/// is returned as a single stripe. Empty regions and `n <= 0` yield an
/// empty vector.
pub fn partition_stripes(region: Region, n: i32) -> Vec<Region> {
    if n <= 0 || region.is_empty() {
        return Vec::new();
    }
    let axis = StripeAxis::longer(&region);
    let size = axis.extent(&region) / n as i64;
    if n == 1 || size == 0 {
        return vec![region];
    }

    let (start, end) = axis.bounds(&region);
    let mut stripes = Vec::with_capacity(n as usize);
    let mut cursor = start;
    for _ in 0..n - 1 {
        stripes.push(axis.slice(&region, cursor, cursor + size));
        cursor += size;
    }
    stripes.push(axis.slice(&region, cursor, end));
    stripes
}

// ============================================================================
// Interleaved bubbles
// ============================================================================

/// A strided set of points: every `step` starting at `region.min + offset`,
/// clipped to `region`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lattice {
    pub region: Region,
    pub offset: Point,
    pub step: Point,
}

impl Lattice {
    /// Row-major iterator over the lattice points.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let Lattice {
            region,
            offset,
            step,
        } = *self;
        let origin = region.min + offset;
        let (sx, sy) = (step.x.max(1) as usize, step.y.max(1) as usize);
        (origin.y..region.max.y)
            .step_by(sy)
            .flat_map(move |y| (origin.x..region.max.x).step_by(sx).map(move |x| Point::new(x, y)))
    }

    /// Number of points in the lattice.
    pub fn len(&self) -> usize {
        let origin = self.region.min + self.offset;
        let count = |from: i32, to: i32, step: i32| -> usize {
            let step = step.max(1) as i64;
            if from >= to {
                0
            } else {
                ((to as i64 - from as i64 + step - 1) / step) as usize
            }
        };
        count(origin.x, self.region.max.x, self.step.x) * count(origin.y, self.region.max.y, self.step.y)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Iterator over the lattices of a bubble partition.
#[derive(Debug, Clone)]
pub struct Bubbles {
    region: Region,
    step: Point,
    // Offsets are limited to the region size; larger ones are empty
    span: Point,
    next: u64,
}

impl Bubbles {
    fn total(&self) -> u64 {
        self.span.x as u64 * self.span.y as u64
    }
}

impl Iterator for Bubbles {
    type Item = Lattice;

    fn next(&mut self) -> Option<Lattice> {
        if self.next >= self.total() {
            return None;
        }
        let columns = self.span.x as u64;
        let offset = Point::new((self.next % columns) as i32, (self.next / columns) as i32);
        self.next += 1;
        Some(Lattice {
            region: self.region,
            offset,
            step: self.step,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total() - self.next.min(self.total());
        match usize::try_from(left) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl std::iter::FusedIterator for Bubbles {}

/// Split `region` into interleaved lattices for a `(bw, bh)` pattern.
///
/// For each offset `(ox, oy)` in `[0, bw) x [0, bh)` one lattice is
/// produced that starts at `(min.x + ox, min.y + oy)` and steps by
/// `(bw, bh)`. Offsets that fall outside the region are skipped since their
/// lattice would be empty. Non-positive strides or an empty region yield
/// nothing.
pub fn partition_bubbles(region: Region, bw: i32, bh: i32) -> Bubbles {
    let span = if bw <= 0 || bh <= 0 || region.is_empty() {
        Point::ORIGIN
    } else {
        // Both minima are bounded by a positive i32 stride
        Point::new(
            (bw as i64).min(region.width()) as i32,
            (bh as i64).min(region.height()) as i32,
        )
    };
    Bubbles {
        region,
        step: Point::new(bw, bh),
        span,
        next: 0,
    }
}

// ============================================================================
// Processor combinators
// ============================================================================

/// Invoke `rp` on consecutive rows of `height`; the last row takes the rest.
pub fn rows<P: RegionProcessor>(height: i32, rp: P) -> impl RegionProcessor {
    move |region: Region| {
        for stripe in partition_by_size(region, height, StripeAxis::Rows) {
            rp.process(stripe);
        }
    }
}

/// Invoke `rp` on consecutive columns of `width`; the last column takes the rest.
pub fn columns<P: RegionProcessor>(width: i32, rp: P) -> impl RegionProcessor {
    move |region: Region| {
        for stripe in partition_by_size(region, width, StripeAxis::Columns) {
            rp.process(stripe);
        }
    }
}

/// Invoke `rp` on each of at most `n` rows spanning the region.
pub fn n_rows<P: RegionProcessor>(n: i32, rp: P) -> impl RegionProcessor {
    move |region: Region| {
        for stripe in partition_by_count(region, n, StripeAxis::Rows) {
            rp.process(stripe);
        }
    }
}

/// Invoke `rp` on each of at most `n` columns spanning the region.
pub fn n_columns<P: RegionProcessor>(n: i32, rp: P) -> impl RegionProcessor {
    move |region: Region| {
        for stripe in partition_by_count(region, n, StripeAxis::Columns) {
            rp.process(stripe);
        }
    }
}

/// Invoke `rp` on each of at most `n` stripes cut along the longer side.
pub fn n_rectangles<P: RegionProcessor>(n: i32, rp: P) -> impl RegionProcessor {
    move |region: Region| {
        for stripe in partition_arbitrary(region, n) {
            rp.process(stripe);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn regions() -> Vec<Region> {
        vec![
            Region::new(0, 0, 0, 0),
            Region::new(0, 0, 1, 0),
            Region::new(0, 0, 0, 1),
            Region::new(0, 0, 1, 1),
            Region::new(0, 0, 16, 1),
            Region::new(0, 0, 1, 16),
            Region::new(0, 0, 17, 1),
            Region::new(0, 0, 1, 17),
            Region::new(-5, 3, 40, 9),
            Region::new(7, -20, 13, 100),
            Region::new(0, 0, 100, 100),
        ]
    }

    /// Assert the partition contract: disjoint pieces inside `region`
    /// whose areas add up to the region's area.
    fn assert_partition(region: Region, parts: &[Region]) {
        let mut total = 0u64;
        for (i, a) in parts.iter().enumerate() {
            assert!(!a.is_empty(), "empty piece {} of {}", a, region);
            assert!(region.contains_region(a), "{} escapes {}", a, region);
            for b in &parts[i + 1..] {
                assert!(!a.overlaps(b), "{} overlaps {} in {}", a, b, region);
            }
            total += a.area();
        }
        assert_eq!(total, region.area(), "pieces of {} do not cover it", region);

        let union = parts.iter().fold(Region::ZERO, |acc, r| acc.union(r));
        if region.is_empty() {
            assert!(union.is_empty());
        } else {
            assert_eq!(union, region);
        }
    }

    #[test]
    fn test_arbitrary_partition_is_complete_and_disjoint() {
        for region in regions() {
            for n in 1..=12 {
                let parts: Vec<Region> = partition_arbitrary(region, n).collect();
                assert!(parts.len() <= n as usize);
                assert_partition(region, &parts);
            }
        }
    }

    #[test]
    fn test_partition_by_size_exact_except_last() {
        let region = Region::new(0, 0, 10, 23);
        let parts: Vec<Region> = partition_by_size(region, 5, StripeAxis::Rows).collect();
        assert_eq!(parts.len(), 5);
        for part in &parts[..4] {
            assert_eq!(part.height(), 5);
            assert_eq!(part.width(), 10);
        }
        assert_eq!(parts[4], Region::new(0, 20, 10, 23));
        assert_partition(region, &parts);

        // Exact multiple: the last stripe is full size, not empty
        let parts: Vec<Region> = partition_by_size(Region::with_size(20, 4), 5, StripeAxis::Columns).collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[3], Region::new(15, 0, 20, 4));
    }

    #[test]
    fn test_degenerate_partitions_are_empty() {
        for region in regions() {
            for axis in [StripeAxis::Rows, StripeAxis::Columns] {
                assert_eq!(partition_by_size(region, 0, axis).count(), 0);
                assert_eq!(partition_by_size(region, -3, axis).count(), 0);
                assert_eq!(partition_by_count(region, 0, axis).count(), 0);
                assert_eq!(partition_by_count(region, -1, axis).count(), 0);
            }
            assert_eq!(partition_arbitrary(region, 0).count(), 0);
            assert!(partition_stripes(region, 0).is_empty());
            assert_eq!(partition_bubbles(region, 0, 2).count(), 0);
            assert_eq!(partition_bubbles(region, 2, -1).count(), 0);
        }
    }

    #[test]
    fn test_partition_by_count_rounds_up() {
        // 10 rows over 4 stripes: ceil(10 / 4) = 3 -> 3, 3, 3, 1
        let parts: Vec<Region> = partition_by_count(Region::with_size(2, 10), 4, StripeAxis::Rows).collect();
        let heights: Vec<i64> = parts.iter().map(|r| r.height()).collect();
        assert_eq!(heights, vec![3, 3, 3, 1]);

        // Fewer lines than stripes
        let parts: Vec<Region> = partition_by_count(Region::with_size(3, 2), 8, StripeAxis::Columns).collect();
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn test_size_hint_matches_count() {
        for region in regions() {
            for size in 1..7 {
                let stripes = partition_by_size(region, size, StripeAxis::Columns);
                let expected = stripes.len();
                assert_eq!(stripes.count(), expected);
            }
        }
    }

    #[test]
    fn test_arbitrary_cuts_longer_side() {
        let wide = Region::with_size(100, 10);
        assert!(partition_arbitrary(wide, 4).all(|r| r.height() == 10));
        let tall = Region::with_size(10, 100);
        assert!(partition_arbitrary(tall, 4).all(|r| r.width() == 10));
    }

    #[test]
    fn test_partition_stripes_floor_and_remainder() {
        // 10 columns over 4 stripes: floor = 2 -> 2, 2, 2, 4
        let parts = partition_stripes(Region::with_size(10, 3), 4);
        let widths: Vec<i64> = parts.iter().map(|r| r.width()).collect();
        assert_eq!(widths, vec![2, 2, 2, 4]);

        // Too few lines: single stripe
        assert_eq!(partition_stripes(Region::with_size(1, 3), 8), vec![Region::with_size(1, 3)]);

        for region in regions() {
            for n in 1..=9 {
                assert_partition(region, &partition_stripes(region, n));
            }
        }
    }

    #[test]
    fn test_bubbles_cover_every_point_once() {
        for region in regions() {
            for (bw, bh) in [(1, 1), (2, 1), (1, 2), (3, 4), (33, 1), (1, 33)] {
                let mut hits = vec![0u8; region.area() as usize];
                for lattice in partition_bubbles(region, bw, bh) {
                    assert!(!lattice.is_empty());
                    assert_eq!(lattice.points().count(), lattice.len());
                    for pt in lattice.points() {
                        let d = pt - region.min;
                        hits[(d.y as i64 * region.width() + d.x as i64) as usize] += 1;
                    }
                }
                assert!(hits.iter().all(|&h| h == 1), "bubbles {}x{} over {}", bw, bh, region);
            }
        }
    }

    #[test]
    fn test_bubbles_with_more_lattices_than_i32() {
        // 50_000 x 50_000 offsets: 2.5e9 lattices
        let mut bubbles = partition_bubbles(Region::with_size(50_000, 50_000), 50_000, 50_000);
        let first = bubbles.next().unwrap();
        assert_eq!(first.offset, Point::ORIGIN);
        assert_eq!(first.len(), 1);
        assert_eq!(first.points().next(), Some(Point::new(0, 0)));
        let second = bubbles.next().unwrap();
        assert_eq!(second.offset, Point::new(1, 0));
    }

    #[test]
    fn test_partition_wider_than_i32() {
        let region = Region::new(i32::MIN / 2 - 10, 0, i32::MAX / 2 + 10, 1);
        assert!(region.width() > i32::MAX as i64);

        let check = |parts: &[Region], expected: usize| {
            assert_eq!(parts.len(), expected);
            assert_eq!(parts[0].min.x, region.min.x);
            assert_eq!(parts[parts.len() - 1].max.x, region.max.x);
            for pair in parts.windows(2) {
                assert_eq!(pair[0].max.x, pair[1].min.x);
            }
            assert!(parts.iter().all(|r| r.min.y == 0 && r.max.y == 1 && !r.is_empty()));
            let total: u64 = parts.iter().map(Region::area).sum();
            assert_eq!(total, region.area());
        };

        let parts: Vec<Region> = partition_arbitrary(region, 4).collect();
        check(&parts, 4);
        check(&partition_stripes(region, 3), 3);
        let parts: Vec<Region> = partition_by_size(region, i32::MAX, StripeAxis::Columns).collect();
        check(&parts, 2);
    }

    #[test]
    fn test_combinators_forward_each_piece() {
        let seen = Mutex::new(Vec::new());
        let record = |r: Region| seen.lock().unwrap().push(r);

        rows(4, &record).process(Region::with_size(3, 9));
        columns(5, &record).process(Region::with_size(6, 2));
        n_rows(0, &record).process(Region::with_size(3, 9));
        n_columns(2, &record).process(Region::with_size(5, 1));
        n_rectangles(2, &record).process(Region::with_size(1, 4));

        let seen = seen.into_inner().unwrap();
        assert_eq!(
            seen,
            vec![
                Region::new(0, 0, 3, 4),
                Region::new(0, 4, 3, 8),
                Region::new(0, 8, 3, 9),
                Region::new(0, 0, 5, 2),
                Region::new(5, 0, 6, 2),
                Region::new(0, 0, 3, 1),
                Region::new(3, 0, 5, 1),
                Region::new(0, 0, 1, 2),
                Region::new(0, 2, 1, 4),
            ]
        );
    }
}
