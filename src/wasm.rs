//! WebAssembly exports for the ImageStripe filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images are
//! passed as flat row-major buffers together with their dimensions; a
//! buffer that does not match its dimensions raises a JavaScript error.
//!
//! Without threads in the browser the scheduler falls back to one
//! partition, so results are identical to the native build.

use wasm_bindgen::prelude::*;

use crate::error::StripeError;
use crate::filters::{self, Direction, EdgeOptions, EdgePolicy};
use crate::geometry::Region;
use crate::image::{Grid, PixelImage};
use crate::scheduler::Scheduler;

fn to_js_err(err: StripeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn gray_grid(data: &[u16], width: usize, height: usize) -> Result<Grid, JsValue> {
    let w = i32::try_from(width).map_err(|_| to_js_err(StripeError::DimensionOverflow { width, height }))?;
    let h = i32::try_from(height).map_err(|_| to_js_err(StripeError::DimensionOverflow { width, height }))?;
    Grid::from_shape_vec(Region::with_size(w, h), data.to_vec()).map_err(to_js_err)
}

fn options_from(mean: bool, padding: i32) -> EdgeOptions {
    let policy = if mean { EdgePolicy::Mean } else { EdgePolicy::Max };
    EdgeOptions { policy, padding }
}

// ============================================================================
// Box averages
// ============================================================================

/// Horizontal box average of a 16-bit gray image.
///
/// # Arguments
/// * `data` - Flat array of samples (length = width * height)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `radius` - Window length
///
/// # Returns
/// Flat array of `(width + radius - 1) * height` samples
#[wasm_bindgen]
pub fn row_average_wasm(data: &[u16], width: usize, height: usize, radius: i32) -> Result<Vec<u16>, JsValue> {
    let input = gray_grid(data, width, height)?;
    Ok(filters::box_average_with(&Scheduler::from_pool(), radius, &input, Direction::Horizontal).to_vec())
}

/// Vertical box average of a 16-bit gray image.
///
/// # Returns
/// Flat array of `width * (height + radius - 1)` samples
#[wasm_bindgen]
pub fn column_average_wasm(data: &[u16], width: usize, height: usize, radius: i32) -> Result<Vec<u16>, JsValue> {
    let input = gray_grid(data, width, height)?;
    Ok(filters::box_average_with(&Scheduler::from_pool(), radius, &input, Direction::Vertical).to_vec())
}

// ============================================================================
// Edges
// ============================================================================

/// Edge strength of a 16-bit gray image.
///
/// `mean` selects the averaging combine policy instead of the maximum;
/// `padding` widens each window across its sliding axis.
#[wasm_bindgen]
pub fn edges_wasm(
    data: &[u16],
    width: usize,
    height: usize,
    radius: i32,
    mean: bool,
    padding: i32,
) -> Result<Vec<u16>, JsValue> {
    let input = gray_grid(data, width, height)?;
    let options = options_from(mean, padding);
    Ok(filters::edges_with_options(&Scheduler::from_pool(), radius, &input, options).to_vec())
}

/// Per-channel edge strength of an RGBA u8 image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
///
/// # Returns
/// Flat array of interleaved 16-bit RGBA samples
#[wasm_bindgen]
pub fn edges_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    radius: i32,
    mean: bool,
    padding: i32,
) -> Result<Vec<u16>, JsValue> {
    let input = PixelImage::from_rgba8(width, height, data.to_vec()).map_err(to_js_err)?;
    let options = options_from(mean, padding);
    let result = filters::image_edges(&Scheduler::from_pool(), &input, radius, options).map_err(to_js_err)?;
    Ok(result.to_samples_u16())
}
