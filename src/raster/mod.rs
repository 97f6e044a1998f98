//! # Raster Module
//!
//! The image value type and the deterministic pixel edits that run before the
//! text overlay: brightness, contrast and blur, plus optional saturation, gamma,
//! sharpness, named convolution filters and a vignette.

pub mod adjust;
pub mod enhance;
pub mod filter;
pub mod types;

pub use adjust::{apply_blur, apply_brightness, apply_contrast, Adjustments};
pub use enhance::{apply_gamma, apply_saturation, apply_sharpness, apply_vignette};
pub use filter::{apply_filter, NamedFilter};
pub use types::Image;
