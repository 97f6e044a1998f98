use crate::raster::{
    filter::{convolve, SMOOTH},
    types::Image,
};

/// Blend each pixel away from (or towards) its grayscale value
///
/// Factor 0.0 gives a gray image, 1.0 the input, larger values boost color.
pub fn apply_saturation(image: &Image, factor: f32) -> Image {
    let factor = if factor.is_finite() { factor.max(0.0) } else { 1.0 };
    if factor == 1.0 {
        return image.clone();
    }

    let mut out = image.clone();
    for pixel in out.as_rgba_mut().pixels_mut() {
        let gray = luma(pixel.0[0], pixel.0[1], pixel.0[2]) as f32;
        for c in 0..3 {
            pixel.0[c] = to_channel(gray + (pixel.0[c] as f32 - gray) * factor);
        }
    }
    out
}

/// Power-law correction: values below 1.0 brighten, above 1.0 darken
pub fn apply_gamma(image: &Image, gamma: f32) -> Image {
    if !gamma.is_finite() || gamma <= 0.0 || gamma == 1.0 {
        return image.clone();
    }

    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        *slot = to_channel((value as f32 / 255.0).powf(gamma) * 255.0);
    }
    image.map_channels(&lut)
}

/// Blend against a smoothed copy; 0.0 softens, 1.0 is the input, 2.0 sharpens
pub fn apply_sharpness(image: &Image, factor: f32) -> Image {
    let factor = if factor.is_finite() { factor.max(0.0) } else { 1.0 };
    if factor == 1.0 {
        return image.clone();
    }

    let smooth = convolve(image, &SMOOTH);
    let mut out = image.clone();
    for (pixel, soft) in out.as_rgba_mut().pixels_mut().zip(smooth.as_rgba().pixels()) {
        for c in 0..3 {
            let s = soft.0[c] as f32;
            pixel.0[c] = to_channel(s + (pixel.0[c] as f32 - s) * factor);
        }
    }
    out
}

/// Darken towards the corners
///
/// Inside the circle of radius half the shorter side the color falls off linearly
/// with distance from the center, down to `1 - intensity` at the rim; everything
/// outside stays at `1 - intensity`.
pub fn apply_vignette(image: &Image, intensity: f32) -> Image {
    let intensity = if intensity.is_finite() { intensity.clamp(0.0, 1.0) } else { 0.0 };
    if intensity == 0.0 {
        return image.clone();
    }

    let (cx, cy) = ((image.width() / 2) as f32, (image.height() / 2) as f32);
    let max_radius = (image.width().min(image.height()) / 2) as f32;

    let mut out = image.clone();
    for (x, y, pixel) in out.as_rgba_mut().enumerate_pixels_mut() {
        let distance = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
        let t = if max_radius > 0.0 {
            (distance / max_radius).min(1.0)
        } else if distance > 0.0 {
            1.0
        } else {
            0.0
        };
        let mask = (255.0 * (1.0 - t * intensity)).floor();
        for c in 0..3 {
            pixel.0[c] = to_channel(pixel.0[c] as f32 * mask / 255.0);
        }
    }
    out
}

/// ITU-R 601-2 luma, as used for grayscale conversion
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114 + 500) / 1000) as u8
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn colorful(width: u32, height: u32) -> Image {
        let buffer = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 40 % 256) as u8, (y * 60 % 256) as u8, 180, 255])
        });
        Image::from_rgba(buffer).unwrap()
    }

    #[test]
    fn test_identity_values() {
        let image = colorful(9, 7);
        assert_eq!(apply_saturation(&image, 1.0), image);
        assert_eq!(apply_gamma(&image, 1.0), image);
        assert_eq!(apply_sharpness(&image, 1.0), image);
        assert_eq!(apply_vignette(&image, 0.0), image);
    }

    #[test]
    fn test_zero_saturation_is_gray() {
        let out = apply_saturation(&colorful(6, 6), 0.0);
        for y in 0..6 {
            for x in 0..6 {
                let [r, g, b] = out.rgb(x, y);
                assert!(r == g && g == b, "pixel ({}, {}) not gray: {:?}", x, y, [r, g, b]);
            }
        }
    }

    #[test]
    fn test_saturation_boost_widens_channel_spread() {
        let image = Image::new_filled(2, 2, [150, 100, 80]).unwrap();
        let [r, _, b] = apply_saturation(&image, 2.0).rgb(0, 0);
        assert!(r as i32 - b as i32 > 150 - 80);
    }

    #[test]
    fn test_gamma_direction() {
        let image = Image::new_filled(2, 2, [128, 64, 200]).unwrap();
        let lighter = apply_gamma(&image, 0.5).rgb(0, 0);
        let darker = apply_gamma(&image, 2.0).rgb(0, 0);
        for c in 0..3 {
            assert!(lighter[c] > image.rgb(0, 0)[c]);
            assert!(darker[c] < image.rgb(0, 0)[c]);
        }

        let extremes = Image::new_filled(1, 1, [0, 255, 0]).unwrap();
        assert_eq!(apply_gamma(&extremes, 2.5), extremes);
    }

    #[test]
    fn test_sharpness_on_flat_image_is_identity() {
        let flat = Image::new_filled(5, 5, [70, 80, 90]).unwrap();
        assert_eq!(apply_sharpness(&flat, 2.0), flat);
        assert_eq!(apply_sharpness(&flat, 0.0), flat);
    }

    #[test]
    fn test_sharpness_increases_local_contrast() {
        let buffer = RgbaImage::from_fn(8, 8, |x, _| {
            let v = if x < 4 { 60 } else { 190 };
            Rgba([v, v, v, 255])
        });
        let image = Image::from_rgba(buffer).unwrap();
        let sharp = apply_sharpness(&image, 2.0);
        let soft = apply_sharpness(&image, 0.0);

        let edge = |img: &Image| img.rgb(4, 4)[0] as i32 - img.rgb(3, 4)[0] as i32;
        assert!(edge(&sharp) > edge(&image));
        assert!(edge(&soft) < edge(&image));
    }

    #[test]
    fn test_vignette_darkens_corners_only() {
        let image = Image::new_filled(41, 41, [200, 200, 200]).unwrap();
        let out = apply_vignette(&image, 0.5);

        assert_eq!(out.rgb(20, 20), [200, 200, 200]);
        let corner = out.rgb(0, 0)[0];
        assert!(corner < 110 && corner > 90, "corner value {}", corner);
        assert!(out.rgb(10, 20)[0] > corner);
        assert!(out.rgb(10, 20)[0] < 200);
    }

    #[test]
    fn test_vignette_on_single_pixel() {
        let image = Image::new_filled(1, 1, [90, 90, 90]).unwrap();
        assert_eq!(apply_vignette(&image, 1.0), image);
    }

    #[test]
    fn test_alpha_is_untouched() {
        let image = Image::from_rgba(RgbaImage::from_pixel(5, 5, Rgba([10, 200, 90, 33]))).unwrap();
        for out in [
            apply_saturation(&image, 0.3),
            apply_gamma(&image, 1.8),
            apply_sharpness(&image, 1.7),
            apply_vignette(&image, 0.8),
        ] {
            assert_eq!(out.get_pixel(0, 4)[3], 33);
        }
    }
}
