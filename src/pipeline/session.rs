use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::Config,
    error::{CompositorError, Result, VerseError},
    overlay::{FontRegistry, TextOverlaySpec},
    pipeline::editor::Editor,
    raster::{Adjustments, Image},
};

/// Most images a single generation run produces
pub const MAX_IMAGES: usize = 3;

struct Slot {
    editor: Editor,
    adjustments: Adjustments,
    overlay: TextOverlaySpec,
    displayed: Image,
}

/// The images from one generation run, each with its own editor
///
/// Every image keeps the parameters last applied to it and the image currently
/// shown for it. A carousel cursor picks the image being worked on. Whether the
/// text overlay is switched on carries over from the last apply to the other
/// images of the session.
pub struct Session {
    slots: Vec<Slot>,
    current: usize,
    overlay_default: bool,
}

impl Session {
    pub fn new(originals: Vec<Image>, fonts: Arc<FontRegistry>, config: &Config) -> Result<Self> {
        if originals.is_empty() || originals.len() > MAX_IMAGES {
            return Err(CompositorError::invalid_parameters(format!(
                "a session holds 1-{} images, got {}",
                MAX_IMAGES,
                originals.len()
            ))
            .into());
        }

        info!("Starting session with {} image(s)", originals.len());

        let slots = originals
            .into_iter()
            .map(|image| Slot {
                displayed: image.clone(),
                editor: Editor::with_image(image, fonts.clone(), config),
                adjustments: Adjustments::IDENTITY,
                overlay: TextOverlaySpec::disabled(),
            })
            .collect();

        Ok(Self {
            slots,
            current: 0,
            overlay_default: false,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index of the image under the carousel cursor
    pub fn current(&self) -> usize {
        self.current
    }

    /// Move the cursor forward, wrapping to the first image
    pub fn next(&mut self) -> usize {
        self.current = (self.current + 1) % self.slots.len();
        self.current
    }

    /// Move the cursor back, wrapping to the last image
    pub fn previous(&mut self) -> usize {
        self.current = (self.current + self.slots.len() - 1) % self.slots.len();
        self.current
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        self.slot(index)?;
        self.current = index;
        Ok(())
    }

    /// Whether new overlays start out enabled
    pub fn overlay_default(&self) -> bool {
        self.overlay_default
    }

    /// Render `index` with new parameters and show the result
    pub fn apply(&mut self, index: usize, adjustments: Adjustments, overlay: TextOverlaySpec) -> Result<&Image> {
        let slot = self.slot_mut(index)?;
        let rendered = slot.editor.render(&adjustments, &overlay)?;
        let enabled = overlay.is_enabled();

        slot.displayed = rendered;
        slot.adjustments = adjustments;
        slot.overlay = overlay;
        self.overlay_default = enabled;

        debug!("Applied edits to image {}", index);
        Ok(&self.slots[index].displayed)
    }

    /// Show the original again and return the parameters to their defaults
    ///
    /// The overlay keeps its text so it can be re-enabled without retyping.
    pub fn reset(&mut self, index: usize) -> Result<&Image> {
        let overlay_default = self.overlay_default;
        let slot = self.slot_mut(index)?;

        slot.displayed = slot.editor.reset()?;
        slot.adjustments = Adjustments::IDENTITY;
        slot.overlay = TextOverlaySpec::new(slot.overlay.text()).with_enabled(overlay_default);

        debug!("Reset image {} to original", index);
        Ok(&slot.displayed)
    }

    pub fn displayed(&self, index: usize) -> Result<&Image> {
        Ok(&self.slot(index)?.displayed)
    }

    pub fn original(&self, index: usize) -> Result<&Image> {
        self.slot(index)?
            .editor
            .original()
            .ok_or_else(|| CompositorError::NoImageLoaded.into())
    }

    pub fn adjustments(&self, index: usize) -> Result<Adjustments> {
        Ok(self.slot(index)?.adjustments)
    }

    pub fn overlay(&self, index: usize) -> Result<&TextOverlaySpec> {
        Ok(&self.slot(index)?.overlay)
    }

    /// Displayed image of `index` encoded as PNG
    pub fn export_png(&self, index: usize) -> Result<Vec<u8>> {
        self.displayed(index)?.encode_png()
    }

    pub fn save_png<P: AsRef<Path>>(&self, index: usize, path: P) -> Result<()> {
        let path = path.as_ref();
        self.displayed(index)?.save_png(path)?;
        info!("Saved image {} to {:?}", index, path);
        Ok(())
    }

    fn slot(&self, index: usize) -> Result<&Slot> {
        let len = self.slots.len();
        self.slots.get(index).ok_or_else(|| out_of_range(index, len))
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Slot> {
        let len = self.slots.len();
        self.slots.get_mut(index).ok_or_else(|| out_of_range(index, len))
    }
}

fn out_of_range(index: usize, len: usize) -> VerseError {
    CompositorError::invalid_parameters(format!("image index {} out of range for {} image(s)", index, len)).into()
}
