//! Sample grids and the accessor traits the filters work against.
//!
//! - [`Channel`]: read-only `(x, y) -> u16` access plus bounds
//! - [`OutputGrid`]: write access through a shared reference
//! - [`Grid`]: owned, origin-anchored `u16` grid on top of `ndarray`
//! - [`SharedGrid`]: lock-free grid that concurrent tasks write into
//!
//! Grids carry their bounds, which may start at negative coordinates.
//! Reads outside the bounds yield 0 and writes outside them are dropped, so
//! accessors never panic on stray coordinates.

use std::sync::atomic::{AtomicU16, Ordering};

use ndarray::{Array2, ArrayView2};

use crate::error::{Result, StripeError};
use crate::geometry::{Point, Region};
use crate::scheduler::{all_points, Scheduler};

/// A single-component, read-only view over a 2-D sample grid.
pub trait Channel: Sync {
    fn bounds(&self) -> Region;

    /// Sample at `(x, y)`; 0 outside the bounds.
    fn sample(&self, x: i32, y: i32) -> u16;
}

/// A 2-D grid that can be written through a shared reference.
///
/// Concurrent writers must address disjoint coordinates.
pub trait OutputGrid: Sync {
    fn set(&self, x: i32, y: i32, value: u16);
}

/// (height, width) of the storage for `bounds`.
fn storage_dim(bounds: &Region) -> (usize, usize) {
    if bounds.is_empty() {
        (0, 0)
    } else {
        (bounds.height() as usize, bounds.width() as usize)
    }
}

/// Row-major storage offset of `(x, y)` inside `bounds`.
#[inline]
fn offset_of(bounds: &Region, x: i32, y: i32) -> Option<(usize, usize)> {
    if bounds.contains(Point::new(x, y)) {
        Some((
            (y as i64 - bounds.min.y as i64) as usize,
            (x as i64 - bounds.min.x as i64) as usize,
        ))
    } else {
        None
    }
}

// ============================================================================
// Owned grid
// ============================================================================

/// An owned grid of `u16` samples anchored at `bounds.min`.
///
/// Storage is an `Array2<u16>` of shape `(height, width)`; element
/// `[[0, 0]]` is the sample at `bounds.min`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    bounds: Region,
    data: Array2<u16>,
}

impl Grid {
    /// Zero-filled grid covering `bounds`.
    pub fn new(bounds: Region) -> Self {
        Grid {
            bounds,
            data: Array2::zeros(storage_dim(&bounds)),
        }
    }

    /// Wrap an array, anchoring element `[[0, 0]]` at `origin`.
    pub fn from_array(origin: Point, data: Array2<u16>) -> Result<Self> {
        let (height, width) = data.dim();
        let overflow = StripeError::DimensionOverflow { width, height };
        let w = i32::try_from(width).map_err(|_| overflow.clone())?;
        let h = i32::try_from(height).map_err(|_| overflow.clone())?;
        let max_x = origin.x.checked_add(w).ok_or_else(|| overflow.clone())?;
        let max_y = origin.y.checked_add(h).ok_or(overflow)?;

        Ok(Grid {
            bounds: Region::new(origin.x, origin.y, max_x, max_y),
            data,
        })
    }

    /// Build a grid over `bounds` from row-major samples.
    pub fn from_shape_vec(bounds: Region, samples: Vec<u16>) -> Result<Self> {
        let (height, width) = storage_dim(&bounds);
        let mismatch = StripeError::ShapeMismatch {
            expected: height * width,
            actual: samples.len(),
        };
        if samples.len() != height * width {
            return Err(mismatch);
        }
        let data = Array2::from_shape_vec((height, width), samples).map_err(|_| mismatch)?;
        Ok(Grid { bounds, data })
    }

    /// Copy a channel into a new grid, spreading the copy over `scheduler`.
    pub fn from_channel<C>(scheduler: &Scheduler, channel: &C) -> Self
    where
        C: Channel + ?Sized,
    {
        let bounds = channel.bounds();
        let out = SharedGrid::new(bounds);
        scheduler.run(
            bounds,
            &all_points(|pt: Point| out.set(pt.x, pt.y, channel.sample(pt.x, pt.y))),
        );
        out.into_grid()
    }

    pub fn bounds(&self) -> Region {
        self.bounds
    }

    /// Sample at `(x, y)`, or `None` outside the bounds.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u16> {
        offset_of(&self.bounds, x, y).map(|(r, c)| self.data[[r, c]])
    }

    /// Store a sample; ignored outside the bounds.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: u16) {
        if let Some((r, c)) = offset_of(&self.bounds, x, y) {
            self.data[[r, c]] = value;
        }
    }

    pub fn view(&self) -> ArrayView2<'_, u16> {
        self.data.view()
    }

    pub fn into_array(self) -> Array2<u16> {
        self.data
    }

    /// Row-major copy of the samples.
    pub fn to_vec(&self) -> Vec<u16> {
        self.data.iter().copied().collect()
    }
}

impl Channel for Grid {
    fn bounds(&self) -> Region {
        self.bounds
    }

    #[inline]
    fn sample(&self, x: i32, y: i32) -> u16 {
        self.get(x, y).unwrap_or(0)
    }
}

// ============================================================================
// Shared grid
// ============================================================================

/// A grid written concurrently by tasks that own disjoint coordinates.
///
/// Cells are atomics with relaxed ordering: no two tasks touch the same
/// cell, and the join at the end of a scheduler call publishes all writes
/// to the joining thread. Call [`SharedGrid::into_grid`] after the join.
#[derive(Debug)]
pub struct SharedGrid {
    bounds: Region,
    width: usize,
    cells: Vec<AtomicU16>,
}

impl SharedGrid {
    /// Zero-filled shared grid covering `bounds`.
    pub fn new(bounds: Region) -> Self {
        let (height, width) = storage_dim(&bounds);
        SharedGrid {
            bounds,
            width,
            cells: (0..height * width).map(|_| AtomicU16::new(0)).collect(),
        }
    }

    pub fn bounds(&self) -> Region {
        self.bounds
    }

    #[inline]
    fn cell(&self, x: i32, y: i32) -> Option<&AtomicU16> {
        offset_of(&self.bounds, x, y).map(|(r, c)| &self.cells[r * self.width + c])
    }

    /// Freeze the samples into an owned grid.
    pub fn into_grid(self) -> Grid {
        let (height, width) = storage_dim(&self.bounds);
        let values: Vec<u16> = self.cells.into_iter().map(AtomicU16::into_inner).collect();
        Grid {
            bounds: self.bounds,
            data: Array2::from_shape_fn((height, width), |(r, c)| values[r * width + c]),
        }
    }
}

impl OutputGrid for SharedGrid {
    #[inline]
    fn set(&self, x: i32, y: i32, value: u16) {
        if let Some(cell) = self.cell(x, y) {
            cell.store(value, Ordering::Relaxed);
        }
    }
}

impl Channel for SharedGrid {
    fn bounds(&self) -> Region {
        self.bounds
    }

    #[inline]
    fn sample(&self, x: i32, y: i32) -> u16 {
        self.cell(x, y).map_or(0, |cell| cell.load(Ordering::Relaxed))
    }
}
