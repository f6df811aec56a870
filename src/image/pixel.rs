//! Pixel formats and their channel views.
//!
//! ## Supported Formats
//!
//! | Variant | Storage | Channels | Sample width |
//! |---------|---------|----------|--------------|
//! | `Gray8` | `Array2<u8>` (H, W) | 1 | 8-bit |
//! | `Gray16` | `Array2<u16>` (H, W) | 1 | 16-bit |
//! | `Rgba8` | `Array3<u8>` (H, W, 4) | 4 | 8-bit |
//! | `Rgba16` | `Array3<u16>` (H, W, 4) | 4 | 16-bit |
//!
//! Whatever the storage, every channel is read through [`ChannelView`] as
//! 16-bit samples, so the filters never see the concrete format. 8-bit
//! samples are widened with `v * 257` (0xff maps to 0xffff).

use ndarray::{Array2, Array3, Axis};

use crate::error::{Result, StripeError};
use crate::geometry::Region;
use crate::scheduler::Scheduler;

use super::grid::{Channel, Grid};

/// Widening factor from 8-bit to 16-bit samples.
const WIDEN_8_TO_16: u16 = 257;

/// An image in one of the supported sample formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelImage {
    Gray8(Array2<u8>),
    Gray16(Array2<u16>),
    Rgba8(Array3<u8>),
    Rgba16(Array3<u16>),
}

impl PixelImage {
    /// Gray16 image from row-major samples.
    pub fn from_gray16(width: usize, height: usize, samples: Vec<u16>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width * height;
        let actual = samples.len();
        Array2::from_shape_vec((height, width), samples)
            .map(PixelImage::Gray16)
            .map_err(|_| StripeError::ShapeMismatch { expected, actual })
    }

    /// Rgba8 image from interleaved RGBA bytes.
    pub fn from_rgba8(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width * height * 4;
        let actual = data.len();
        Array3::from_shape_vec((height, width, 4), data)
            .map(PixelImage::Rgba8)
            .map_err(|_| StripeError::ShapeMismatch { expected, actual })
    }

    /// Image from an (H, W, C) byte array with 1 (gray) or 4 (RGBA) channels.
    pub fn from_array3_u8(array: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = array.dim();
        check_dimensions(width, height)?;
        match channels {
            1 => Ok(PixelImage::Gray8(array.index_axis_move(Axis(2), 0))),
            4 => Ok(PixelImage::Rgba8(array)),
            c => Err(StripeError::UnsupportedChannels(c)),
        }
    }

    /// Assemble an image from 1 (gray) or 4 (RGBA) channels.
    ///
    /// The result covers the union of the channel bounds, re-anchored so
    /// that the union's min corner becomes `(0, 0)`. Each channel is copied
    /// through `scheduler`.
    pub fn from_channels(scheduler: &Scheduler, channels: &[&dyn Channel]) -> Result<Self> {
        let bounds = channels
            .iter()
            .fold(Region::ZERO, |acc, c| acc.union(&c.bounds()));
        let planes: Vec<Grid> = channels
            .iter()
            .map(|c| Grid::from_channel(scheduler, &Rebound { channel: *c, bounds }))
            .collect();

        match planes.as_slice() {
            [gray] => Ok(PixelImage::Gray16(gray.view().to_owned())),
            [_, _, _, _] => {
                let views: Vec<_> = planes.iter().map(Grid::view).collect();
                let (height, width) = views[0].dim();
                Ok(PixelImage::Rgba16(Array3::from_shape_fn(
                    (height, width, 4),
                    |(y, x, c)| views[c][[y, x]],
                )))
            }
            _ => Err(StripeError::UnsupportedChannels(channels.len())),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            PixelImage::Gray8(a) => a.dim().1,
            PixelImage::Gray16(a) => a.dim().1,
            PixelImage::Rgba8(a) => a.dim().1,
            PixelImage::Rgba16(a) => a.dim().1,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            PixelImage::Gray8(a) => a.dim().0,
            PixelImage::Gray16(a) => a.dim().0,
            PixelImage::Rgba8(a) => a.dim().0,
            PixelImage::Rgba16(a) => a.dim().0,
        }
    }

    /// Image bounds, anchored at the origin.
    pub fn bounds(&self) -> Region {
        let w = i32::try_from(self.width()).unwrap_or(i32::MAX);
        let h = i32::try_from(self.height()).unwrap_or(i32::MAX);
        Region::with_size(w, h)
    }

    pub fn channel_count(&self) -> usize {
        match self {
            PixelImage::Gray8(_) | PixelImage::Gray16(_) => 1,
            PixelImage::Rgba8(_) | PixelImage::Rgba16(_) => 4,
        }
    }

    pub fn is_gray(&self) -> bool {
        self.channel_count() == 1
    }

    /// View of channel `index`, or `None` if the format has no such channel.
    pub fn channel(&self, index: usize) -> Option<ChannelView<'_>> {
        (index < self.channel_count()).then_some(ChannelView { image: self, index })
    }

    /// Views of all channels in storage order (gray, or R, G, B, A).
    pub fn channels(&self) -> Vec<ChannelView<'_>> {
        (0..self.channel_count())
            .map(|index| ChannelView { image: self, index })
            .collect()
    }

    /// Row-major 16-bit samples, channels interleaved (8-bit formats widened).
    pub fn to_samples_u16(&self) -> Vec<u16> {
        match self {
            PixelImage::Gray8(a) => a.iter().map(|&v| v as u16 * WIDEN_8_TO_16).collect(),
            PixelImage::Gray16(a) => a.iter().copied().collect(),
            PixelImage::Rgba8(a) => a.iter().map(|&v| v as u16 * WIDEN_8_TO_16).collect(),
            PixelImage::Rgba16(a) => a.iter().copied().collect(),
        }
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(StripeError::DimensionOverflow { width, height });
    }
    Ok(())
}

/// Read-only view of one channel of a [`PixelImage`] as 16-bit samples.
#[derive(Debug, Clone, Copy)]
pub struct ChannelView<'a> {
    image: &'a PixelImage,
    index: usize,
}

impl ChannelView<'_> {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Channel for ChannelView<'_> {
    fn bounds(&self) -> Region {
        self.image.bounds()
    }

    #[inline]
    fn sample(&self, x: i32, y: i32) -> u16 {
        if x < 0 || y < 0 {
            return 0;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.image.width() || y >= self.image.height() {
            return 0;
        }
        match self.image {
            PixelImage::Gray8(a) => a[[y, x]] as u16 * WIDEN_8_TO_16,
            PixelImage::Gray16(a) => a[[y, x]],
            PixelImage::Rgba8(a) => a[[y, x, self.index]] as u16 * WIDEN_8_TO_16,
            PixelImage::Rgba16(a) => a[[y, x, self.index]],
        }
    }
}

/// A channel read over different bounds (samples outside its own are 0).
struct Rebound<'a> {
    channel: &'a dyn Channel,
    bounds: Region,
}

impl Channel for Rebound<'_> {
    fn bounds(&self) -> Region {
        // Anchor at the origin
        self.bounds.translate(Region::ZERO.min - self.bounds.min)
    }

    fn sample(&self, x: i32, y: i32) -> u16 {
        self.channel.sample(x + self.bounds.min.x, y + self.bounds.min.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn rgba8_2x1() -> PixelImage {
        PixelImage::from_rgba8(2, 1, vec![255, 0, 10, 255, 1, 2, 3, 128]).unwrap()
    }

    #[test]
    fn test_rgba8_channels_widen_to_16_bit() {
        let img = rgba8_2x1();
        assert_eq!(img.channel_count(), 4);
        assert_eq!(img.bounds(), Region::with_size(2, 1));

        let ch = img.channels();
        assert_eq!(ch[0].sample(0, 0), 0xffff);
        assert_eq!(ch[1].sample(0, 0), 0);
        assert_eq!(ch[2].sample(0, 0), 10 * 257);
        assert_eq!(ch[3].sample(1, 0), 128 * 257);
        assert_eq!(ch[2].sample(1, 0), 3 * 257);
    }

    #[test]
    fn test_samples_u16_interleaved() {
        let samples = rgba8_2x1().to_samples_u16();
        assert_eq!(samples.len(), 8);
        assert_eq!(&samples[..4], &[0xffff, 0, 2570, 0xffff]);
        assert_eq!(samples[7], 128 * 257);
    }

    #[test]
    fn test_channel_view_out_of_bounds() {
        let img = PixelImage::Gray16(array![[1u16, 2], [3, 4]]);
        let ch = img.channel(0).unwrap();
        assert_eq!(ch.sample(1, 1), 4);
        assert_eq!(ch.sample(2, 0), 0);
        assert_eq!(ch.sample(-1, 0), 0);
        assert!(img.channel(1).is_none());
    }

    #[test]
    fn test_constructors_validate_shapes() {
        assert_eq!(
            PixelImage::from_rgba8(2, 2, vec![0; 15]).unwrap_err(),
            StripeError::ShapeMismatch { expected: 16, actual: 15 }
        );
        assert_eq!(
            PixelImage::from_gray16(3, 1, vec![0; 4]).unwrap_err(),
            StripeError::ShapeMismatch { expected: 3, actual: 4 }
        );
        assert_eq!(
            PixelImage::from_array3_u8(Array3::zeros((2, 2, 3))).unwrap_err(),
            StripeError::UnsupportedChannels(3)
        );
        let gray = PixelImage::from_array3_u8(Array3::from_elem((2, 3, 1), 9)).unwrap();
        assert!(gray.is_gray());
        assert_eq!((gray.width(), gray.height()), (3, 2));
    }

    #[test]
    fn test_channels_round_trip() {
        let img = rgba8_2x1();
        let views = img.channels();
        let refs: Vec<&dyn Channel> = views.iter().map(|v| v as &dyn Channel).collect();
        let rebuilt = PixelImage::from_channels(&Scheduler::sequential(), &refs).unwrap();

        let PixelImage::Rgba16(data) = rebuilt else {
            panic!("expected Rgba16");
        };
        assert_eq!(data.dim(), (1, 2, 4));
        assert_eq!(data[[0, 0, 0]], 0xffff);
        assert_eq!(data[[0, 1, 3]], 128 * 257);
    }

    #[test]
    fn test_from_channels_unions_and_reanchors_bounds() {
        let a = Grid::from_shape_vec(Region::new(5, 5, 7, 6), vec![1, 2]).unwrap();
        let b = Grid::from_shape_vec(Region::new(6, 6, 7, 7), vec![3]).unwrap();
        let gray = PixelImage::from_channels(&Scheduler::new(2), &[&a]).unwrap();
        assert_eq!(gray, PixelImage::Gray16(array![[1u16, 2]]));

        let rgba = PixelImage::from_channels(&Scheduler::new(2), &[&a, &b, &a, &b]).unwrap();
        let PixelImage::Rgba16(data) = rgba else {
            panic!("expected Rgba16");
        };
        assert_eq!(data.dim(), (2, 2, 4));
        assert_eq!(data[[0, 1, 0]], 2);
        assert_eq!(data[[1, 1, 1]], 3);
        assert_eq!(data[[1, 0, 0]], 0);

        assert_eq!(
            PixelImage::from_channels(&Scheduler::new(2), &[&a, &b]).unwrap_err(),
            StripeError::UnsupportedChannels(2)
        );
    }
}
