//! ImageStripe
//!
//! Region-partitioning scheduler for image filters, with Python bindings
//! via PyO3 and WASM bindings for JavaScript.
//!
//! ## Layout
//! - [`geometry`]: integer points and half-open rectangles
//! - [`scheduler`]: partitioners, the concurrent dispatcher and the
//!   parallelism-aware [`Scheduler`]
//! - [`image`]: 16-bit sample grids and pixel formats
//! - [`filters`]: box averages and edge detection
//!
//! Work is always expressed as a [`RegionProcessor`] applied to a
//! [`Region`]. The scheduler cuts the region into disjoint parts, runs them
//! on the rayon pool and returns once every part is done.
//!
//! ## Example
//! ```
//! use imagestripe::{edges, Grid, Region};
//!
//! let samples = (0..64).map(|x| if x < 32 { 0 } else { 1000 }).collect();
//! let input = Grid::from_shape_vec(Region::with_size(64, 1), samples).unwrap();
//! let strength = edges(4, &input);
//! assert_eq!(strength.get(31, 0), Some(1000));
//! ```

pub mod error;
pub mod filters;
pub mod geometry;
pub mod image;
pub mod scheduler;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Result, StripeError};
pub use filters::{
    band_average_with, box_average, box_average_with, column_average, edges, edges_with,
    edges_with_options, image_edges, image_mean, region_mean, row_average, Direction, EdgeOptions,
    EdgePolicy,
};
pub use geometry::{Point, Region};
pub use image::{Channel, ChannelView, Grid, OutputGrid, PixelImage, SharedGrid};
pub use scheduler::{quick, run_parallel, Dispatcher, RegionProcessor, Scheduler};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use ndarray::{Array2, Array3};
    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::StripeError;
    use crate::filters::{self, Direction, EdgeOptions, EdgePolicy};
    use crate::geometry::Point;
    use crate::image::{Grid, PixelImage};
    use crate::scheduler::Scheduler;

    fn to_py_err(err: StripeError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    fn parse_options(policy: &str, padding: i32) -> PyResult<EdgeOptions> {
        let policy = match policy {
            "max" => EdgePolicy::Max,
            "mean" => EdgePolicy::Mean,
            other => {
                return Err(PyValueError::new_err(format!(
                    "Unknown edge policy '{}' (expected 'max' or 'mean')",
                    other
                )))
            }
        };
        Ok(EdgeOptions { policy, padding })
    }

    fn grid_from(image: PyReadonlyArray2<'_, u16>) -> PyResult<Grid> {
        Grid::from_array(Point::ORIGIN, image.as_array().to_owned()).map_err(to_py_err)
    }

    fn box_average_py<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u16>,
        radius: i32,
        direction: Direction,
    ) -> PyResult<Bound<'py, PyArray2<u16>>> {
        let input = grid_from(image)?;
        let result: Array2<u16> = py.allow_threads(|| {
            filters::box_average_with(&Scheduler::from_pool(), radius, &input, direction).into_array()
        });
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Box averages
    // ========================================================================

    /// Sliding box mean along each row of a 16-bit gray image.
    ///
    /// The result is `radius - 1` columns wider than the input: column `i`
    /// holds the mean of input columns `[i - radius + 1, i + 1)` clipped to
    /// the image.
    #[pyfunction]
    pub fn row_average<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u16>,
        radius: i32,
    ) -> PyResult<Bound<'py, PyArray2<u16>>> {
        box_average_py(py, image, radius, Direction::Horizontal)
    }

    /// Sliding box mean along each column of a 16-bit gray image.
    ///
    /// The result is `radius - 1` rows taller than the input.
    #[pyfunction]
    pub fn column_average<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u16>,
        radius: i32,
    ) -> PyResult<Bound<'py, PyArray2<u16>>> {
        box_average_py(py, image, radius, Direction::Vertical)
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Box-difference edge strength of a 16-bit gray image.
    ///
    /// # Arguments
    /// * `image` - (H, W) u16 array
    /// * `radius` - Averaging window length (< 1 gives zeros)
    /// * `policy` - "max" (default) or "mean" to merge both axes
    /// * `padding` - Lines averaged on either side of each window (default 0)
    #[pyfunction]
    #[pyo3(signature = (image, radius, policy="max", padding=0))]
    pub fn edges<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u16>,
        radius: i32,
        policy: &str,
        padding: i32,
    ) -> PyResult<Bound<'py, PyArray2<u16>>> {
        let options = parse_options(policy, padding)?;
        let input = grid_from(image)?;
        let result: Array2<u16> = py.allow_threads(|| {
            filters::edges_with_options(&Scheduler::from_pool(), radius, &input, options).into_array()
        });
        Ok(result.into_pyarray(py))
    }

    /// Per-channel edge strength of an 8-bit image with 1 or 4 channels.
    ///
    /// Returns an (H, W, C) u16 array, channels filtered independently.
    #[pyfunction]
    #[pyo3(signature = (image, radius, policy="max", padding=0))]
    pub fn edges_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        radius: i32,
        policy: &str,
        padding: i32,
    ) -> PyResult<Bound<'py, PyArray3<u16>>> {
        let options = parse_options(policy, padding)?;
        let input = PixelImage::from_array3_u8(image.as_array().to_owned()).map_err(to_py_err)?;
        let (height, width, channels) = (input.height(), input.width(), input.channel_count());

        let samples = py.allow_threads(|| {
            filters::image_edges(&Scheduler::from_pool(), &input, radius, options)
                .map(|result| result.to_samples_u16())
        });
        let samples = samples.map_err(to_py_err)?;
        let expected = height * width * channels;
        let actual = samples.len();
        let result = Array3::from_shape_vec((height, width, channels), samples)
            .map_err(|_| to_py_err(StripeError::ShapeMismatch { expected, actual }))?;
        Ok(result.into_pyarray(py))
    }

    #[pymodule]
    pub fn imagestripe(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(row_average, m)?)?;
        m.add_function(wrap_pyfunction!(column_average, m)?)?;
        m.add_function(wrap_pyfunction!(edges, m)?)?;
        m.add_function(wrap_pyfunction!(edges_rgba, m)?)?;
        Ok(())
    }
}
