use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::{debug, info};

use crate::{
    config::{Config, OverlayConfig},
    error::{CompositorError, Result},
    overlay::{FontRegistry, OverlayCompositor, TextOverlaySpec},
    raster::{Adjustments, Image, NamedFilter},
};

/// Run the full edit pipeline on `original`
///
/// Raster adjustments are applied first, brightness then contrast then blur, with
/// any finishing edits in their fixed slots. The overlay is then composited on the
/// adjusted image. `original` is never modified and identical inputs always give
/// identical pixels.
pub fn render(
    original: &Image,
    adjustments: &Adjustments,
    overlay: &TextOverlaySpec,
    fonts: &FontRegistry,
    settings: &OverlayConfig,
) -> Result<Image> {
    let adjusted = if adjustments.is_identity() {
        original.clone()
    } else {
        adjustments.apply(original)
    };

    OverlayCompositor::new(fonts, settings).composite(&adjusted, overlay)
}

/// Everything that determines a rendered image besides the original itself
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RenderKey {
    brightness: u32,
    contrast: u32,
    blur: u8,
    saturation: u32,
    gamma: u32,
    sharpness: u32,
    filter: Option<NamedFilter>,
    vignette: u32,
    overlay: TextOverlaySpec,
}

impl RenderKey {
    fn new(adjustments: &Adjustments, overlay: &TextOverlaySpec) -> Self {
        Self {
            brightness: adjustments.brightness().to_bits(),
            contrast: adjustments.contrast().to_bits(),
            blur: adjustments.blur(),
            saturation: adjustments.saturation().to_bits(),
            gamma: adjustments.gamma().to_bits(),
            sharpness: adjustments.sharpness().to_bits(),
            filter: adjustments.filter(),
            vignette: adjustments.vignette().to_bits(),
            overlay: overlay.clone(),
        }
    }
}

/// Holds one original image and renders edited versions of it
///
/// An editor starts empty; `render` and `reset` fail with `NoImageLoaded` until
/// `load` is called. Renders are memoized per parameter set, and loading a new
/// original drops every memoized render.
pub struct Editor {
    original: Option<Image>,
    fonts: Arc<FontRegistry>,
    settings: OverlayConfig,
    cache: LruCache<RenderKey, Image>,
}

impl Editor {
    pub fn new(fonts: Arc<FontRegistry>, config: &Config) -> Self {
        let capacity = NonZeroUsize::new(config.cache.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            original: None,
            fonts,
            settings: config.overlay.clone(),
            cache: LruCache::new(capacity),
        }
    }

    /// Editor that already holds `image`
    pub fn with_image(image: Image, fonts: Arc<FontRegistry>, config: &Config) -> Self {
        let mut editor = Self::new(fonts, config);
        editor.load(image);
        editor
    }

    /// Replace the held original
    pub fn load(&mut self, image: Image) {
        info!("Loaded {}x{} image into editor", image.width(), image.height());
        self.cache.clear();
        self.original = Some(image);
    }

    pub fn is_loaded(&self) -> bool {
        self.original.is_some()
    }

    pub fn original(&self) -> Option<&Image> {
        self.original.as_ref()
    }

    /// Render the held original with the given parameters
    pub fn render(&mut self, adjustments: &Adjustments, overlay: &TextOverlaySpec) -> Result<Image> {
        let original = self.original.as_ref().ok_or(CompositorError::NoImageLoaded)?;
        let key = RenderKey::new(adjustments, overlay);

        if let Some(hit) = self.cache.get(&key) {
            debug!("Render cache hit");
            return Ok(hit.clone());
        }

        let rendered = render(original, adjustments, overlay, &self.fonts, &self.settings)?;
        self.cache.put(key, rendered.clone());
        Ok(rendered)
    }

    /// The unmodified original
    pub fn reset(&self) -> Result<Image> {
        self.original
            .clone()
            .ok_or_else(|| CompositorError::NoImageLoaded.into())
    }

    /// Number of memoized renders
    pub fn cached_renders(&self) -> usize {
        self.cache.len()
    }
}
