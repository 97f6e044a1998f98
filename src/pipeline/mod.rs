//! # Edit Pipeline
//!
//! Ties the raster adjustments and the text overlay together. [`render`] is the
//! pure pipeline, [`Editor`] holds one original and memoizes its renders, and
//! [`Session`] manages the handful of images produced by one generation run.

pub mod editor;
pub mod session;

// Re-exports for convenience
pub use editor::{render, Editor};
pub use session::{Session, MAX_IMAGES};
