use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgba, RgbaImage, RgbImage};

use crate::error::{CompositorError, Result};

/// An 8-bit RGB or RGBA raster
///
/// Pixels are held as RGBA internally; `has_alpha` remembers whether the source
/// carried an alpha channel so exports reproduce the original layout. Every
/// transformation in this crate returns a new `Image` and leaves its input alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    buffer: RgbaImage,
    has_alpha: bool,
}

impl Image {
    /// Wrap an RGB buffer
    pub fn from_rgb(buffer: RgbImage) -> Result<Self> {
        check_dimensions(buffer.width(), buffer.height())?;
        let rgba = DynamicImage::ImageRgb8(buffer).to_rgba8();
        Ok(Self { buffer: rgba, has_alpha: false })
    }

    /// Wrap an RGBA buffer
    pub fn from_rgba(buffer: RgbaImage) -> Result<Self> {
        check_dimensions(buffer.width(), buffer.height())?;
        Ok(Self { buffer, has_alpha: true })
    }

    /// Accept a decoded image, rejecting channel layouts other than RGB8 and RGBA8
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        match image {
            DynamicImage::ImageRgb8(buffer) => Self::from_rgb(buffer),
            DynamicImage::ImageRgba8(buffer) => Self::from_rgba(buffer),
            other => Err(CompositorError::invalid_image(format!(
                "unsupported channel layout {:?}",
                other.color()
            ))
            .into()),
        }
    }

    /// Build an image from raw interleaved bytes with 3 or 4 channels
    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = expected_len(width, height, channels);
        let actual = data.len();
        let wrong_length = || {
            CompositorError::invalid_image(format!(
                "expected {} bytes for {}x{} with {} channels, got {}",
                expected,
                width,
                height,
                channels,
                actual
            ))
        };
        if matches!(channels, 3 | 4) && actual as u64 != expected {
            return Err(wrong_length().into());
        }

        match channels {
            3 => {
                let buffer: RgbImage = ImageBuffer::from_raw(width, height, data).ok_or_else(wrong_length)?;
                Self::from_rgb(buffer)
            }
            4 => {
                let buffer: RgbaImage = ImageBuffer::from_raw(width, height, data).ok_or_else(wrong_length)?;
                Self::from_rgba(buffer)
            }
            n => Err(CompositorError::invalid_image(format!("unsupported channel count {}", n)).into()),
        }
    }

    /// Create an opaque RGB image filled with one color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Result<Self> {
        check_dimensions(width, height)?;
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([color[0], color[1], color[2], 255]));
        Ok(Self { buffer, has_alpha: false })
    }

    /// Decode an image file (PNG or JPEG)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let decoded = image::open(path.as_ref())?;
        Self::from_dynamic(decoded)
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Get a pixel at the given coordinates as RGBA
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get the color channels of a pixel
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, _] = self.get_pixel(x, y);
        [r, g, b]
    }

    /// Get the underlying RGBA buffer
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.buffer
    }

    pub(crate) fn as_rgba_mut(&mut self) -> &mut RgbaImage {
        &mut self.buffer
    }

    /// Copy of this image with every color channel passed through a lookup table.
    /// Alpha is carried over untouched.
    pub(crate) fn map_channels(&self, lut: &[u8; 256]) -> Image {
        let mut out = self.clone();
        for pixel in out.buffer.pixels_mut() {
            pixel[0] = lut[pixel[0] as usize];
            pixel[1] = lut[pixel[1] as usize];
            pixel[2] = lut[pixel[2] as usize];
        }
        out
    }

    /// Convert back to a `DynamicImage` in the source channel layout
    pub fn to_dynamic(&self) -> DynamicImage {
        let rgba = DynamicImage::ImageRgba8(self.buffer.clone());
        if self.has_alpha {
            rgba
        } else {
            DynamicImage::ImageRgb8(rgba.to_rgb8())
        }
    }

    /// Encode as PNG bytes (the download format)
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        self.to_dynamic().write_to(&mut bytes, ImageOutputFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Save the image as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(CompositorError::invalid_image(format!("zero-sized image {}x{}", width, height)).into());
    }
    Ok(())
}

fn expected_len(width: u32, height: u32, channels: u8) -> u64 {
    width as u64 * height as u64 * channels as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::tempdir;

    #[test]
    fn test_zero_sized_image_is_rejected() {
        let err = Image::new_filled(0, 10, [1, 2, 3]).unwrap_err();
        assert!(matches!(err.as_compositor(), Some(CompositorError::InvalidImage { .. })));

        let err = Image::from_rgba(RgbaImage::new(4, 0)).unwrap_err();
        assert!(matches!(err.as_compositor(), Some(CompositorError::InvalidImage { .. })));
    }

    #[test]
    fn test_grayscale_layout_is_rejected() {
        let gray = GrayImage::from_pixel(3, 3, Luma([7]));
        let err = Image::from_dynamic(DynamicImage::ImageLuma8(gray)).unwrap_err();
        assert!(matches!(err.as_compositor(), Some(CompositorError::InvalidImage { .. })));
    }

    #[test]
    fn test_from_raw_checks_length_and_channels() {
        assert!(Image::from_raw(2, 2, 3, vec![0; 12]).is_ok());
        assert!(Image::from_raw(2, 2, 4, vec![0; 16]).is_ok());
        assert!(Image::from_raw(2, 2, 3, vec![0; 5]).is_err());
        assert!(Image::from_raw(2, 2, 4, vec![7; 20]).is_err());
        assert!(Image::from_raw(2, 2, 3, vec![7; 16]).is_err());
        assert!(Image::from_raw(2, 2, 2, vec![0; 8]).is_err());
    }

    #[test]
    fn test_rgb_source_exports_as_rgb() {
        let image = Image::new_filled(5, 4, [10, 20, 30]).unwrap();
        assert!(!image.has_alpha());
        assert_eq!(image.get_pixel(2, 2), [10, 20, 30, 255]);
        assert!(matches!(image.to_dynamic(), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_png_roundtrip_preserves_pixels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("art.png");

        let mut buffer = RgbaImage::new(3, 2);
        buffer.put_pixel(1, 1, Rgba([200, 100, 50, 128]));
        let image = Image::from_rgba(buffer).unwrap();

        image.save_png(&path).unwrap();
        let loaded = Image::open(&path).unwrap();
        assert_eq!(loaded, image);
    }
}
