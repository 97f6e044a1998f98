use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use tracing::debug;

use crate::{
    config::OverlayConfig,
    overlay::spec::{TextAlignment, TextPosition},
};

/// Horizontal and vertical measurements needed to lay out text
pub trait TextMetrics {
    /// Advance width of a single line, kerning included
    fn text_width(&self, text: &str) -> f32;

    /// Distance from the top of a line to its baseline
    fn ascent(&self) -> f32;

    /// Distance from the baseline to the bottom of a line (negative)
    fn descent(&self) -> f32;

    fn line_height(&self) -> f32 {
        self.ascent() - self.descent()
    }
}

/// A font face at a pixel size, where the size is the em height as in most
/// design tools rather than ab_glyph's ascent-to-descent height
pub struct ScaledFace<'a> {
    font: &'a FontArc,
    scale: PxScale,
}

impl<'a> ScaledFace<'a> {
    pub fn new(font: &'a FontArc, font_size: u32) -> Self {
        let em = font_size as f32;
        let height = match font.units_per_em() {
            Some(upem) if upem > 0.0 => em * font.height_unscaled() / upem,
            _ => em,
        };
        Self { font, scale: PxScale::from(height) }
    }

    pub fn font(&self) -> &FontArc {
        self.font
    }

    pub fn scale(&self) -> PxScale {
        self.scale
    }
}

impl TextMetrics for ScaledFace<'_> {
    fn text_width(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0f32;
        let mut previous: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    fn ascent(&self) -> f32 {
        self.font.as_scaled(self.scale).ascent()
    }

    fn descent(&self) -> f32 {
        self.font.as_scaled(self.scale).descent()
    }
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Grow by `amount` on every side without leaving a `width` x `height` canvas
    pub fn expand_within(&self, amount: u32, width: u32, height: u32) -> Rect {
        let x = self.x.saturating_sub(amount);
        let y = self.y.saturating_sub(amount);
        let right = (self.right() + amount).min(width);
        let bottom = (self.bottom() + amount).min(height);
        Rect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }
}

/// One wrapped line, positioned in image coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct LaidLine {
    pub text: String,
    /// Left edge of the line's first advance
    pub x: f32,
    pub baseline: f32,
    pub width: f32,
}

/// Result of laying out overlay text on an image
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<LaidLine>,
    /// Area glyphs may be drawn into
    pub bounds: Rect,
    /// Area covered by the translucent background
    pub background: Rect,
}

/// Margin kept between the text block and the image edges
pub fn effective_margin(settings: &OverlayConfig, width: u32, height: u32) -> u32 {
    settings.margin.min(width.min(height) / 10)
}

/// Wrap, measure and place `text` on a `width` x `height` image
///
/// Returns `None` when there is nothing to draw: blank text, or an image too
/// small to hold a single line. Lines that do not fit vertically are dropped,
/// so the block never leaves the image.
pub fn layout_text(
    metrics: &dyn TextMetrics,
    text: &str,
    position: TextPosition,
    alignment: TextAlignment,
    width: u32,
    height: u32,
    settings: &OverlayConfig,
) -> Option<TextBlock> {
    let margin = effective_margin(settings, width, height);
    let padding = margin / 2;
    let max_width = (width as f32 * settings.max_width_ratio)
        .min(width.saturating_sub(2 * margin) as f32)
        .floor()
        .max(1.0);
    let max_height = height.saturating_sub(2 * margin) as f32;

    let mut lines = wrap_text(metrics, text.trim(), max_width);

    let line_height = metrics.line_height().ceil();
    let spacing = settings.line_spacing as f32;
    let fitting = if line_height <= 0.0 || line_height > max_height {
        0
    } else {
        (((max_height - line_height) / (line_height + spacing)).floor() as usize) + 1
    };
    if lines.len() > fitting {
        debug!("Dropping {} of {} overlay lines that do not fit", lines.len() - fitting, lines.len());
        lines.truncate(fitting);
    }

    let widths: Vec<f32> = lines.iter().map(|l| metrics.text_width(l)).collect();
    // A single glyph can be wider than max_width; its line keeps its real width and
    // the compositor clips it to the block.
    let block_width = widths.iter().cloned().fold(0.0f32, f32::max).min(max_width).ceil() as u32;
    if lines.is_empty() || block_width == 0 {
        return None;
    }
    let block_height = (lines.len() as f32 * line_height + (lines.len() - 1) as f32 * spacing).ceil() as u32;

    let centered_x = width.saturating_sub(block_width) / 2;
    let centered_y = height.saturating_sub(block_height) / 2;
    let (x, y) = match position {
        TextPosition::Center => (centered_x, centered_y),
        TextPosition::Top => (centered_x, margin),
        TextPosition::Bottom => (centered_x, height.saturating_sub(block_height + margin)),
        TextPosition::Left => (margin, centered_y),
        TextPosition::Right => (width.saturating_sub(block_width + margin), centered_y),
    };

    let bounds = Rect {
        x,
        y,
        width: block_width.min(width - x),
        height: block_height.min(height - y),
    };
    let background = bounds.expand_within(padding, width, height);

    let ascent = metrics.ascent();
    let laid = lines
        .into_iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (text, line_width))| {
            let slack = (block_width as f32 - line_width).max(0.0);
            let offset = match alignment {
                TextAlignment::Left => 0.0,
                TextAlignment::Center => (slack / 2.0).floor(),
                TextAlignment::Right => slack,
            };
            LaidLine {
                text,
                x: x as f32 + offset,
                baseline: y as f32 + i as f32 * (line_height + spacing) + ascent,
                width: line_width,
            }
        })
        .collect();

    Some(TextBlock { lines: laid, bounds, background })
}

/// Greedy word wrap measured in pixels
///
/// Paragraph breaks (`\n`) are kept, blank paragraphs become empty lines and
/// words wider than `max_width` are split between characters.
pub fn wrap_text(metrics: &dyn TextMetrics, text: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if metrics.text_width(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if metrics.text_width(word) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_word(metrics, word, max_width);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

fn break_word(metrics: &dyn TextMetrics, word: &str, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut chunk = String::new();
    for ch in word.chars() {
        chunk.push(ch);
        if chunk.chars().count() > 1 && metrics.text_width(&chunk) > max_width {
            chunk.pop();
            pieces.push(std::mem::take(&mut chunk));
            chunk.push(ch);
        }
    }
    if !chunk.is_empty() {
        pieces.push(chunk);
    }
    pieces
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Monospace stand-in: every character advances 10px, lines are 16px tall
    pub(crate) struct FixedMetrics;

    impl TextMetrics for FixedMetrics {
        fn text_width(&self, text: &str) -> f32 {
            text.chars().count() as f32 * 10.0
        }

        fn ascent(&self) -> f32 {
            12.0
        }

        fn descent(&self) -> f32 {
            -4.0
        }
    }

    fn settings() -> OverlayConfig {
        OverlayConfig::default()
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap_text(&FixedMetrics, "two roads diverged in a yellow wood", 100.0);
        assert_eq!(lines, vec!["two roads", "diverged", "in a", "yellow", "wood"]);
        for line in &lines {
            assert!(FixedMetrics.text_width(line) <= 100.0);
        }
    }

    #[test]
    fn test_wrap_keeps_paragraphs() {
        let lines = wrap_text(&FixedMetrics, "Petals fall\n\nNature's whisper", 1000.0);
        assert_eq!(lines, vec!["Petals fall", "", "Nature's whisper"]);
    }

    #[test]
    fn test_long_word_is_broken() {
        let lines = wrap_text(&FixedMetrics, "abcdefghijkl xy", 50.0);
        assert_eq!(lines, vec!["abcde", "fghij", "kl xy"]);
    }

    #[test]
    fn test_center_layout() {
        let block = layout_text(
            &FixedMetrics,
            "Hello",
            TextPosition::Center,
            TextAlignment::Center,
            512,
            512,
            &settings(),
        )
        .unwrap();

        assert_eq!(block.bounds, Rect { x: 231, y: 248, width: 50, height: 16 });
        // margin 50 -> padding 25
        assert_eq!(block.background, Rect { x: 206, y: 223, width: 100, height: 66 });
        assert_eq!(block.lines.len(), 1);
        assert_eq!(block.lines[0].baseline, 260.0);
    }

    #[test]
    fn test_positions_respect_margin() {
        let place = |position| {
            layout_text(&FixedMetrics, "Hi", position, TextAlignment::Left, 400, 300, &settings())
                .unwrap()
                .bounds
        };

        // shorter side 300 -> margin 30
        assert_eq!(place(TextPosition::Top).y, 30);
        assert_eq!(place(TextPosition::Bottom).bottom(), 270);
        assert_eq!(place(TextPosition::Left).x, 30);
        assert_eq!(place(TextPosition::Right).right(), 370);
    }

    #[test]
    fn test_alignment_within_block() {
        let layout = |alignment| {
            layout_text(&FixedMetrics, "aaaa\nbb", TextPosition::Left, alignment, 400, 400, &settings()).unwrap()
        };

        let left = layout(TextAlignment::Left);
        assert_eq!(left.lines[1].x, left.lines[0].x);

        let center = layout(TextAlignment::Center);
        assert_eq!(center.lines[1].x, center.lines[0].x + 10.0);

        let right = layout(TextAlignment::Right);
        assert_eq!(right.lines[1].x, right.lines[0].x + 20.0);
    }

    #[test]
    fn test_block_never_leaves_image() {
        let poem = "Endless waves crash upon the shore, whispering secrets of the deep, \
                    as moonlight dances on the foam and ancient tides eternal sweep. "
            .repeat(20);
        for (w, h) in [(512, 512), (120, 80), (40, 300), (20, 20)] {
            for position in [TextPosition::Center, TextPosition::Top, TextPosition::Bottom, TextPosition::Left, TextPosition::Right] {
                if let Some(block) = layout_text(&FixedMetrics, &poem, position, TextAlignment::Right, w, h, &settings()) {
                    assert!(block.bounds.right() <= w && block.bounds.bottom() <= h);
                    assert!(block.background.right() <= w && block.background.bottom() <= h);
                }
            }
        }
    }

    #[test]
    fn test_too_small_image_yields_nothing() {
        let block = layout_text(&FixedMetrics, "Hello", TextPosition::Center, TextAlignment::Center, 2, 2, &settings());
        assert!(block.is_none());
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        let block = layout_text(&FixedMetrics, " \n ", TextPosition::Center, TextAlignment::Center, 200, 200, &settings());
        assert!(block.is_none());
    }

    #[test]
    fn test_glyph_wider_than_wrap_width_is_clipped_to_block() {
        // width 12 -> margin 1, wrap width 9, every glyph 10px wide
        let block = layout_text(&FixedMetrics, "ab", TextPosition::Center, TextAlignment::Center, 12, 400, &settings()).unwrap();

        let texts: Vec<&str> = block.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert_eq!(block.bounds.width, 9);
        assert!(block.bounds.right() <= 12);
        for line in &block.lines {
            assert_eq!(line.width, 10.0);
            assert_eq!(line.x, block.bounds.x as f32);
        }
    }
}
