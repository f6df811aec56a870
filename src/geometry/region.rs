//! Points and rectangular regions.
//!
//! Regions use the usual raster convention: `min` is inclusive, `max` is
//! exclusive, and y grows downwards. A region whose max corner is not
//! strictly greater than its min corner on both axes is empty. Empty
//! regions are valid values and every operation treats them as a no-op
//! domain instead of rejecting them.

use std::fmt;
use std::ops::{Add, Sub};

/// An integer (x, y) coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// An axis-aligned rectangle, inclusive on `min` and exclusive on `max`.
///
/// The corners are not reordered on construction: a region built with
/// `max < min` simply has no area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub min: Point,
    pub max: Point,
}

impl Region {
    /// The zero region, returned by empty intersections.
    pub const ZERO: Region = Region {
        min: Point::ORIGIN,
        max: Point::ORIGIN,
    };

    /// Create a region from its min corner (x0, y0) and max corner (x1, y1).
    #[inline]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Region {
            min: Point::new(x0, y0),
            max: Point::new(x1, y1),
        }
    }

    /// Create a region anchored at the origin with the given dimensions.
    #[inline]
    pub const fn with_size(width: i32, height: i32) -> Self {
        Region::new(0, 0, width, height)
    }

    /// Signed extent along x. Negative for inverted regions.
    ///
    /// Widened to `i64`: a region may span more than `i32::MAX` columns.
    #[inline]
    pub const fn width(&self) -> i64 {
        self.max.x as i64 - self.min.x as i64
    }

    /// Signed extent along y. Negative for inverted regions.
    #[inline]
    pub const fn height(&self) -> i64 {
        self.max.y as i64 - self.min.y as i64
    }

    /// Extent as (width, height).
    #[inline]
    pub const fn size(&self) -> (i64, i64) {
        (self.width(), self.height())
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Number of points covered; zero for empty regions.
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width() as u64 * self.height() as u64
        }
    }

    /// Whether `pt` lies inside the region.
    #[inline]
    pub const fn contains(&self, pt: Point) -> bool {
        self.min.x <= pt.x && pt.x < self.max.x && self.min.y <= pt.y && pt.y < self.max.y
    }

    /// Whether `other` lies entirely inside the region.
    ///
    /// An empty region is contained in every region.
    pub fn contains_region(&self, other: &Region) -> bool {
        if other.is_empty() {
            return true;
        }
        self.min.x <= other.min.x
            && other.max.x <= self.max.x
            && self.min.y <= other.min.y
            && other.max.y <= self.max.y
    }

    /// Largest region contained in both; `Region::ZERO` if they don't overlap.
    pub fn intersect(&self, other: &Region) -> Region {
        let r = Region::new(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
        );
        if r.is_empty() {
            Region::ZERO
        } else {
            r
        }
    }

    /// Smallest region containing both. Empty operands are ignored.
    pub fn union(&self, other: &Region) -> Region {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Region::new(
            self.min.x.min(other.min.x),
            self.min.y.min(other.min.y),
            self.max.x.max(other.max.x),
            self.max.y.max(other.max.y),
        )
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        !self.intersect(other).is_empty()
    }

    /// The region moved by `delta`.
    #[inline]
    pub fn translate(&self, delta: Point) -> Region {
        Region {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Row-major iterator over every point of the region.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let r = *self;
        (r.min.y..r.max.y).flat_map(move |y| (r.min.x..r.max.x).map(move |x| Point::new(x, y)))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}
