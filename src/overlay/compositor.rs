use ab_glyph::{point, Font, GlyphId, ScaleFont};
use image::RgbaImage;
use tracing::debug;

use crate::{
    config::OverlayConfig,
    error::Result,
    overlay::{
        fonts::FontRegistry,
        layout::{layout_text, Rect, ScaledFace, TextBlock},
        spec::TextOverlaySpec,
    },
    raster::Image,
};

/// Draws poem text, with its translucent backing box, onto images
pub struct OverlayCompositor<'a> {
    fonts: &'a FontRegistry,
    settings: &'a OverlayConfig,
}

impl<'a> OverlayCompositor<'a> {
    pub fn new(fonts: &'a FontRegistry, settings: &'a OverlayConfig) -> Self {
        Self { fonts, settings }
    }

    /// Return a copy of `image` with the overlay rendered on top
    ///
    /// A disabled spec (or one with blank text) returns an identical image. The
    /// font is resolved before layout, so a missing face is reported even when the
    /// text would not fit on the image.
    pub fn composite(&self, image: &Image, spec: &TextOverlaySpec) -> Result<Image> {
        if spec.is_noop() {
            return Ok(image.clone());
        }

        let font = self.fonts.resolve(spec.font())?;
        let face = ScaledFace::new(&font, spec.font_size());

        let Some(block) = layout_text(
            &face,
            spec.text(),
            spec.position(),
            spec.alignment(),
            image.width(),
            image.height(),
            self.settings,
        ) else {
            debug!("Overlay text does not fit on {}x{} image", image.width(), image.height());
            return Ok(image.clone());
        };

        debug!(
            "Overlay: {} lines in {:?}, font {} {}px",
            block.lines.len(),
            block.bounds,
            spec.font().name(),
            spec.font_size()
        );

        let mut out = image.clone();
        let buffer = out.as_rgba_mut();

        if spec.background_opacity() > 0 {
            let alpha = spec.background_opacity() as f32 / 100.0;
            fill_rect(buffer, block.background, self.settings.background_color, alpha);
        }

        draw_lines(buffer, &face, &block, spec.color().rgb());

        Ok(out)
    }
}

/// Blend `color` over every pixel of `rect` with constant opacity
pub fn fill_rect(buffer: &mut RgbaImage, rect: Rect, color: [u8; 3], alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    for y in rect.y..rect.bottom().min(buffer.height()) {
        for x in rect.x..rect.right().min(buffer.width()) {
            blend_pixel(&mut buffer.get_pixel_mut(x, y).0, color, alpha);
        }
    }
}

fn draw_lines(buffer: &mut RgbaImage, face: &ScaledFace<'_>, block: &TextBlock, color: [u8; 3]) {
    let font = face.font();
    let scale = face.scale();
    let scaled = font.as_scaled(scale);
    let clip = block.bounds;

    for line in &block.lines {
        let mut caret = line.x;
        let mut previous: Option<GlyphId> = None;

        for ch in line.text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, line.baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let origin = outlined.px_bounds().min;
            outlined.draw(|gx, gy, coverage| {
                let px = origin.x as i64 + gx as i64;
                let py = origin.y as i64 + gy as i64;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if clip.contains(px, py) {
                    blend_pixel(&mut buffer.get_pixel_mut(px, py).0, color, coverage.clamp(0.0, 1.0));
                }
            });
        }
    }
}

/// Source-over blend of an opaque color at `alpha` onto an RGBA pixel
fn blend_pixel(pixel: &mut [u8; 4], color: [u8; 3], alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    for c in 0..3 {
        let mixed = pixel[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
        pixel[c] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    let a = pixel[3] as f32;
    pixel[3] = (a + (255.0 - a) * alpha).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::CompositorError,
        overlay::{
            fonts::fixture_registry,
            spec::{FontFamily, TextColor, TextPosition},
        },
    };
    use image::Rgba;

    #[test]
    fn test_disabled_overlay_is_identity() {
        let fonts = FontRegistry::empty();
        let settings = OverlayConfig::default();
        let compositor = OverlayCompositor::new(&fonts, &settings);
        let image = Image::new_filled(64, 64, [9, 99, 199]).unwrap();

        let spec = TextOverlaySpec::new("Hello").with_enabled(false);
        assert_eq!(compositor.composite(&image, &spec).unwrap(), image);
        assert_eq!(compositor.composite(&image, &TextOverlaySpec::new("  ")).unwrap(), image);
    }

    #[test]
    fn test_missing_font_is_reported() {
        let fonts = FontRegistry::empty();
        let settings = OverlayConfig::default();
        let compositor = OverlayCompositor::new(&fonts, &settings);
        let image = Image::new_filled(64, 64, [255, 255, 255]).unwrap();

        let spec = TextOverlaySpec::new("Hello").with_font(FontFamily::Helvetica);
        let err = compositor.composite(&image, &spec).unwrap_err();
        assert_eq!(
            err.as_compositor(),
            Some(&CompositorError::FontUnavailable { family: "helvetica".to_string() })
        );
    }

    #[test]
    fn test_fill_rect_blends_inside_only() {
        let mut buffer = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        fill_rect(&mut buffer, Rect { x: 2, y: 3, width: 4, height: 2 }, [0, 0, 0], 0.5);

        assert_eq!(buffer.get_pixel(2, 3).0, [128, 128, 128, 255]);
        assert_eq!(buffer.get_pixel(5, 4).0, [128, 128, 128, 255]);
        assert_eq!(buffer.get_pixel(6, 4).0, [255, 255, 255, 255]);
        assert_eq!(buffer.get_pixel(2, 5).0, [255, 255, 255, 255]);
        assert_eq!(buffer.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_opaque_fill_replaces_color() {
        let mut buffer = RgbaImage::from_pixel(4, 4, Rgba([10, 200, 30, 0]));
        fill_rect(&mut buffer, Rect { x: 0, y: 0, width: 4, height: 4 }, [80, 80, 80], 1.0);
        assert_eq!(buffer.get_pixel(1, 1).0, [80, 80, 80, 255]);
    }

    #[test]
    fn test_text_stays_inside_background() {
        let fonts = fixture_registry();
        let settings = OverlayConfig::default();
        let compositor = OverlayCompositor::new(&fonts, &settings);
        let image = Image::new_filled(300, 200, [30, 60, 90]).unwrap();

        let spec = TextOverlaySpec::new("Two roads diverged in a yellow wood, and sorry I could not travel both")
            .with_font(FontFamily::SansSerif)
            .with_font_size(48)
            .unwrap()
            .with_color(TextColor::White)
            .with_position(TextPosition::Bottom)
            .with_background_opacity(0)
            .unwrap();

        let face_font = fonts.resolve(FontFamily::SansSerif).unwrap();
        let face = ScaledFace::new(&face_font, 48);
        let block = layout_text(&face, spec.text(), spec.position(), spec.alignment(), 300, 200, &settings).unwrap();

        let out = compositor.composite(&image, &spec).unwrap();
        let mut changed = 0;
        for y in 0..200 {
            for x in 0..300 {
                if out.get_pixel(x, y) != image.get_pixel(x, y) {
                    changed += 1;
                    assert!(block.bounds.contains(x, y), "pixel ({}, {}) outside text block", x, y);
                }
            }
        }
        assert!(changed > 0, "no glyph pixels were drawn");
    }
}
