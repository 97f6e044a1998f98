//! # VerseCanvas
//!
//! Post-process AI-generated poem artwork: adjust brightness, contrast and blur,
//! then lay the poem over the image in a translucent text block.
//!
//! The crate is the deterministic image compositor behind the app. Poem analysis
//! and image generation live elsewhere; this library starts from the decoded
//! images they hand over.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use verse_canvas::{
//!     config::Config,
//!     overlay::{FontRegistry, TextOverlaySpec, TextPosition},
//!     raster::{Adjustments, Image},
//!     Editor,
//! };
//!
//! # fn main() -> verse_canvas::Result<()> {
//! let config = Config::default();
//! let fonts = Arc::new(FontRegistry::new(&config.fonts, config.overlay.font_fallback));
//!
//! let mut editor = Editor::new(fonts, &config);
//! editor.load(Image::open("sunset.png")?);
//!
//! let adjustments = Adjustments::new(1.2, 1.1, 1)?;
//! let overlay = TextOverlaySpec::new("The light lingers\nlong after the sun")
//!     .with_position(TextPosition::Bottom)
//!     .with_background_opacity(60)?;
//!
//! editor.render(&adjustments, &overlay)?.save_png("sunset_edited.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`raster`] - Image type and brightness/contrast/blur adjustments
//! - [`overlay`] - Font registry, text layout and overlay compositing
//! - [`pipeline`] - Pure render function, per-image editor and multi-image session
//! - [`config`] - Configuration management
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod overlay;
pub mod pipeline;
pub mod raster;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{CompositorError, Result, VerseError},
    overlay::{FontRegistry, TextOverlaySpec},
    pipeline::{Editor, Session},
    raster::{Adjustments, Image},
};
