//! # Text Overlay
//!
//! Renders poem text onto images: a closed set of styling choices, a font
//! registry that maps font families to real faces, pixel-measured word wrap and
//! placement, and the compositor that blends the backing box and glyphs.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use verse_canvas::config::Config;
//! use verse_canvas::overlay::{FontRegistry, OverlayCompositor, TextOverlaySpec, TextPosition};
//! use verse_canvas::raster::Image;
//!
//! # fn main() -> verse_canvas::Result<()> {
//! let config = Config::default();
//! let fonts = FontRegistry::new(&config.fonts, config.overlay.font_fallback);
//! let compositor = OverlayCompositor::new(&fonts, &config.overlay);
//!
//! let image = Image::new_filled(512, 512, [255, 255, 255])?;
//! let spec = TextOverlaySpec::new("Petals fall gently").with_position(TextPosition::Bottom);
//! let with_text = compositor.composite(&image, &spec)?;
//! # Ok(())
//! # }
//! ```

pub mod compositor;
pub mod fonts;
pub mod layout;
pub mod spec;

pub use compositor::OverlayCompositor;
pub use fonts::FontRegistry;
pub use layout::{layout_text, wrap_text, Rect, ScaledFace, TextBlock, TextMetrics};
pub use spec::{FontFamily, TextAlignment, TextColor, TextOverlaySpec, TextPosition};
