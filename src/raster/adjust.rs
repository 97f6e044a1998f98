use std::borrow::Cow;

use tracing::debug;

use crate::{
    error::{CompositorError, Result},
    raster::{
        enhance::{apply_gamma, apply_saturation, apply_sharpness, apply_vignette},
        filter::{apply_filter, NamedFilter},
        types::Image,
    },
};

pub const MIN_FACTOR: f32 = 0.1;
pub const MAX_FACTOR: f32 = 2.0;
pub const MAX_BLUR_LEVEL: u8 = 5;
pub const MAX_SATURATION: f32 = 2.0;
pub const MAX_SHARPNESS: f32 = 2.0;
pub const MIN_GAMMA: f32 = 0.1;
pub const MAX_GAMMA: f32 = 3.0;

/// Raster settings for one render
///
/// Brightness, contrast and blur are the everyday controls. Saturation, gamma,
/// sharpness, a named filter and a vignette are optional finishing edits that
/// default to leaving the image alone. Values are range-checked on construction;
/// the `apply_*` functions clamp again so they stay total when called directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustments {
    brightness: f32,
    contrast: f32,
    blur: u8,
    saturation: f32,
    gamma: f32,
    sharpness: f32,
    filter: Option<NamedFilter>,
    vignette: f32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Adjustments {
    /// Parameters that leave an image untouched
    pub const IDENTITY: Adjustments = Adjustments {
        brightness: 1.0,
        contrast: 1.0,
        blur: 0,
        saturation: 1.0,
        gamma: 1.0,
        sharpness: 1.0,
        filter: None,
        vignette: 0.0,
    };

    pub fn new(brightness: f32, contrast: f32, blur: u8) -> Result<Self> {
        check_range("brightness", brightness, MIN_FACTOR, MAX_FACTOR)?;
        check_range("contrast", contrast, MIN_FACTOR, MAX_FACTOR)?;
        if blur > MAX_BLUR_LEVEL {
            return Err(CompositorError::invalid_parameters(format!(
                "blur level {} outside 0-{}",
                blur, MAX_BLUR_LEVEL
            ))
            .into());
        }
        Ok(Self {
            brightness,
            contrast,
            blur,
            ..Self::IDENTITY
        })
    }

    pub fn with_saturation(mut self, saturation: f32) -> Result<Self> {
        check_range("saturation", saturation, 0.0, MAX_SATURATION)?;
        self.saturation = saturation;
        Ok(self)
    }

    pub fn with_gamma(mut self, gamma: f32) -> Result<Self> {
        check_range("gamma", gamma, MIN_GAMMA, MAX_GAMMA)?;
        self.gamma = gamma;
        Ok(self)
    }

    pub fn with_sharpness(mut self, sharpness: f32) -> Result<Self> {
        check_range("sharpness", sharpness, 0.0, MAX_SHARPNESS)?;
        self.sharpness = sharpness;
        Ok(self)
    }

    pub fn with_filter(mut self, filter: Option<NamedFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_vignette(mut self, intensity: f32) -> Result<Self> {
        check_range("vignette", intensity, 0.0, 1.0)?;
        self.vignette = intensity;
        Ok(self)
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn blur(&self) -> u8 {
        self.blur
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn sharpness(&self) -> f32 {
        self.sharpness
    }

    pub fn filter(&self) -> Option<NamedFilter> {
        self.filter
    }

    pub fn vignette(&self) -> f32 {
        self.vignette
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Apply every edit in the fixed order brightness, contrast, saturation,
    /// gamma, sharpness, blur, filter, vignette
    pub fn apply(&self, image: &Image) -> Image {
        let mut out = apply_brightness(image, self.brightness);
        out = apply_contrast(&out, self.contrast);
        out = apply_saturation(&out, self.saturation);
        out = apply_gamma(&out, self.gamma);
        out = apply_sharpness(&out, self.sharpness);
        out = apply_blur(&out, self.blur);
        if let Some(filter) = self.filter {
            out = apply_filter(&out, filter);
        }
        apply_vignette(&out, self.vignette)
    }
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if !value.is_finite() || !(min..=max).contains(&value) {
        return Err(CompositorError::invalid_parameters(format!(
            "{} {} outside {}-{}",
            name, value, min, max
        ))
        .into());
    }
    Ok(())
}

fn clamp_factor(factor: f32) -> f32 {
    if factor.is_nan() {
        return 1.0;
    }
    factor.clamp(MIN_FACTOR, MAX_FACTOR)
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Scale every color channel by `factor`, saturating at 0 and 255
pub fn apply_brightness(image: &Image, factor: f32) -> Image {
    let factor = clamp_factor(factor);
    if factor == 1.0 {
        return image.clone();
    }

    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        *slot = to_channel(value as f32 * factor);
    }
    image.map_channels(&lut)
}

/// Stretch or squash channel values around the midpoint 128
pub fn apply_contrast(image: &Image, factor: f32) -> Image {
    let factor = clamp_factor(factor);
    if factor == 1.0 {
        return image.clone();
    }

    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        *slot = to_channel(128.0 + (value as f32 - 128.0) * factor);
    }
    image.map_channels(&lut)
}

/// Gaussian blur with `sigma = level`
///
/// Level 0 returns an equal image; levels above the maximum are clamped. The kernel
/// is separable with Q16 integer weights and clamp-to-edge sampling, so output is
/// identical across runs and images smaller than the kernel are fine. Images with
/// alpha are blurred premultiplied, so transparent pixels add no color.
pub fn apply_blur(image: &Image, level: u8) -> Image {
    let level = level.min(MAX_BLUR_LEVEL);
    if level == 0 {
        return image.clone();
    }

    let sigma = level as f32;
    let radius = (3.0 * sigma).ceil() as u32;
    let kernel = gaussian_kernel_q16(radius, sigma);
    debug!(
        "Blurring {}x{} image at level {} (radius {})",
        image.width(),
        image.height(),
        level,
        radius
    );

    let (width, height) = (image.width(), image.height());
    let raw = image.as_rgba().as_raw();
    let src: Cow<'_, [u8]> = if image.has_alpha() {
        Cow::Owned(premultiply(raw))
    } else {
        Cow::Borrowed(raw)
    };
    let mut tmp = vec![0u8; src.len()];

    horizontal_pass(&src, &mut tmp, width, height, &kernel);

    let mut out = image.clone();
    vertical_pass(&tmp, out.as_rgba_mut(), width, height, &kernel);
    if image.has_alpha() {
        unpremultiply(out.as_rgba_mut());
    }
    out
}

fn premultiply(src: &[u8]) -> Vec<u8> {
    let mut out = src.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = px[3] as u32;
        for c in 0..3 {
            px[c] = ((px[c] as u32 * a + 127) / 255) as u8;
        }
    }
    out
}

fn unpremultiply(buf: &mut [u8]) {
    for px in buf.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in 0..3 {
            px[c] = ((px[c] as u32 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> Vec<u32> {
    let r = radius as i32;
    let denom = 2.0 * (sigma as f64) * (sigma as f64);
    let weights_f: Vec<f64> = (-r..=r).map(|i| (-(i as f64).powi(2) / denom).exp()).collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|w| ((w / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();

    // Rounding drift goes into the center tap so the kernel sums to exactly 1.0
    let total: i64 = weights.iter().map(|&w| w as i64).sum();
    let delta = 65536 - total;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (weights[mid] as i64 + delta).clamp(0, 65536) as u32;
    }
    weights
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, kernel: &[u32]) {
    let radius = (kernel.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += kw as u64 * src[idx + c] as u64;
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, kernel: &[u32]) {
    let radius = (kernel.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += kw as u64 * src[idx + c] as u64;
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}
