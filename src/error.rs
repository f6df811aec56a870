//! Error types for grid and image construction.
//!
//! Degenerate requests (empty regions, non-positive radius, size or count)
//! are never errors: they produce empty or zero results. Errors only come
//! from raw buffers that do not match the dimensions they are paired with.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeError {
    /// Buffer length does not match the requested dimensions
    ShapeMismatch { expected: usize, actual: usize },
    /// Channel count other than 1 (gray) or 4 (RGBA)
    UnsupportedChannels(usize),
    /// Dimensions do not fit the i32 coordinate space
    DimensionOverflow { width: usize, height: usize },
}

impl fmt::Display for StripeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StripeError::ShapeMismatch { expected, actual } => {
                write!(f, "Buffer holds {} samples, dimensions need {}", actual, expected)
            }
            StripeError::UnsupportedChannels(c) => {
                write!(f, "Unsupported channel count: {} (expected 1 or 4)", c)
            }
            StripeError::DimensionOverflow { width, height } => {
                write!(f, "Dimensions {}x{} exceed the coordinate range", width, height)
            }
        }
    }
}

impl std::error::Error for StripeError {}

/// Result type for grid and image construction
pub type Result<T> = std::result::Result<T, StripeError>;
