use clap::ValueEnum;
use tracing::debug;

use crate::raster::types::Image;

/// Fixed convolution filters offered by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum NamedFilter {
    Blur,
    Contour,
    Detail,
    EdgeEnhance,
    EdgeEnhanceMore,
    Emboss,
    FindEdges,
    Smooth,
    SmoothMore,
    Sharpen,
}

impl NamedFilter {
    pub const ALL: [NamedFilter; 10] = [
        NamedFilter::Blur,
        NamedFilter::Contour,
        NamedFilter::Detail,
        NamedFilter::EdgeEnhance,
        NamedFilter::EdgeEnhanceMore,
        NamedFilter::Emboss,
        NamedFilter::FindEdges,
        NamedFilter::Smooth,
        NamedFilter::SmoothMore,
        NamedFilter::Sharpen,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NamedFilter::Blur => "blur",
            NamedFilter::Contour => "contour",
            NamedFilter::Detail => "detail",
            NamedFilter::EdgeEnhance => "edge-enhance",
            NamedFilter::EdgeEnhanceMore => "edge-enhance-more",
            NamedFilter::Emboss => "emboss",
            NamedFilter::FindEdges => "find-edges",
            NamedFilter::Smooth => "smooth",
            NamedFilter::SmoothMore => "smooth-more",
            NamedFilter::Sharpen => "sharpen",
        }
    }

    pub(crate) fn kernel(&self) -> Kernel {
        match self {
            NamedFilter::Blur => Kernel {
                size: 5,
                weights: &[
                    1, 1, 1, 1, 1,
                    1, 0, 0, 0, 1,
                    1, 0, 0, 0, 1,
                    1, 0, 0, 0, 1,
                    1, 1, 1, 1, 1,
                ],
                scale: 16,
                offset: 0,
            },
            NamedFilter::Contour => Kernel::square3(&[-1, -1, -1, -1, 8, -1, -1, -1, -1], 1, 255),
            NamedFilter::Detail => Kernel::square3(&[0, -1, 0, -1, 10, -1, 0, -1, 0], 6, 0),
            NamedFilter::EdgeEnhance => Kernel::square3(&[-1, -1, -1, -1, 10, -1, -1, -1, -1], 2, 0),
            NamedFilter::EdgeEnhanceMore => Kernel::square3(&[-1, -1, -1, -1, 9, -1, -1, -1, -1], 1, 0),
            NamedFilter::Emboss => Kernel::square3(&[-1, 0, 0, 0, 1, 0, 0, 0, 0], 1, 128),
            NamedFilter::FindEdges => Kernel::square3(&[-1, -1, -1, -1, 8, -1, -1, -1, -1], 1, 0),
            NamedFilter::Smooth => SMOOTH,
            NamedFilter::SmoothMore => Kernel {
                size: 5,
                weights: &[
                    1, 1,  1, 1, 1,
                    1, 5,  5, 5, 1,
                    1, 5, 44, 5, 1,
                    1, 5,  5, 5, 1,
                    1, 1,  1, 1, 1,
                ],
                scale: 100,
                offset: 0,
            },
            NamedFilter::Sharpen => Kernel::square3(&[-2, -2, -2, -2, 32, -2, -2, -2, -2], 16, 0),
        }
    }
}

/// Square integer convolution kernel: `out = sum(w * in) / scale + offset`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Kernel {
    size: u32,
    weights: &'static [i32],
    scale: i32,
    offset: i32,
}

impl Kernel {
    const fn square3(weights: &'static [i32], scale: i32, offset: i32) -> Self {
        Self { size: 3, weights, scale, offset }
    }
}

/// Low-pass kernel that sharpness adjustment blends away from
pub(crate) const SMOOTH: Kernel = Kernel::square3(&[1, 1, 1, 1, 5, 1, 1, 1, 1], 13, 0);

/// Run one of the named filters over the color channels
pub fn apply_filter(image: &Image, filter: NamedFilter) -> Image {
    debug!("Applying {} filter to {}x{} image", filter.name(), image.width(), image.height());
    convolve(image, &filter.kernel())
}

/// Convolve the color channels with clamp-to-edge sampling; alpha is left alone
pub(crate) fn convolve(image: &Image, kernel: &Kernel) -> Image {
    let (width, height) = (image.width() as i32, image.height() as i32);
    let radius = (kernel.size / 2) as i32;
    let size = kernel.size as i32;
    let src = image.as_rgba();

    let mut out = image.clone();
    for (x, y, pixel) in out.as_rgba_mut().enumerate_pixels_mut() {
        let mut acc = [0i32; 3];
        for ky in 0..size {
            let sy = (y as i32 + ky - radius).clamp(0, height - 1) as u32;
            for kx in 0..size {
                let weight = kernel.weights[(ky * size + kx) as usize];
                if weight == 0 {
                    continue;
                }
                let sx = (x as i32 + kx - radius).clamp(0, width - 1) as u32;
                let sample = src.get_pixel(sx, sy).0;
                for c in 0..3 {
                    acc[c] += weight * sample[c] as i32;
                }
            }
        }
        for c in 0..3 {
            let value = (acc[c] as f32 / kernel.scale as f32).round() as i32 + kernel.offset;
            pixel.0[c] = value.clamp(0, 255) as u8;
        }
    }
    out
}
