use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use ab_glyph::{FontArc, FontVec};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use tracing::{debug, info, warn};

use crate::{
    config::FontConfig,
    error::{CompositorError, Result},
    overlay::spec::FontFamily,
};

/// Resolves the fixed font families to loaded font faces
///
/// Lookup order for a family: a face registered directly or pinned by a `file`
/// entry in the configuration, then the configured family names in the font
/// database. When fallback is allowed, a generic serif/sans-serif face (or any
/// face at all) is substituted and the substitution is logged. Loaded faces are
/// memoized, so a registry can be shared between editors.
pub struct FontRegistry {
    database: Database,
    config: FontConfig,
    allow_fallback: bool,
    loaded: Mutex<HashMap<FontFamily, FontArc>>,
}

impl FontRegistry {
    /// Build a registry from configuration, loading system fonts and font directories
    pub fn new(config: &FontConfig, allow_fallback: bool) -> Self {
        let mut database = Database::new();
        if config.system_fonts {
            database.load_system_fonts();
        }
        for dir in &config.font_dirs {
            load_fonts_from_dir(&mut database, dir);
        }

        info!(
            "Font database ready with {} faces (fallback {})",
            database.len(),
            if allow_fallback { "on" } else { "off" }
        );

        Self::with_database(database, config.clone(), allow_fallback)
    }

    /// Registry over an existing font database
    pub fn with_database(database: Database, config: FontConfig, allow_fallback: bool) -> Self {
        Self {
            database,
            config,
            allow_fallback,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Registry with no faces at all; every lookup fails unless faces are registered
    pub fn empty() -> Self {
        Self::with_database(Database::new(), FontConfig::default(), false)
    }

    /// Pin a family to a face parsed from raw font bytes
    pub fn register_font_data(&mut self, family: FontFamily, data: Vec<u8>) -> Result<()> {
        let font = FontVec::try_from_vec(data).map_err(|_| CompositorError::FontUnavailable {
            family: family.name().to_string(),
        })?;
        self.lock_loaded().insert(family, FontArc::new(font));
        Ok(())
    }

    /// Number of faces in the underlying database
    pub fn face_count(&self) -> usize {
        self.database.len()
    }

    pub fn is_available(&self, family: FontFamily) -> bool {
        self.resolve(family).is_ok()
    }

    /// Get the face for a family, loading it on first use
    pub fn resolve(&self, family: FontFamily) -> Result<FontArc> {
        if let Some(font) = self.lock_loaded().get(&family) {
            return Ok(font.clone());
        }

        let font = self.load(family)?;
        self.lock_loaded().insert(family, font.clone());
        Ok(font)
    }

    fn load(&self, family: FontFamily) -> Result<FontArc> {
        let face = self.config.face(family);

        if let Some(path) = &face.file {
            match std::fs::read(path) {
                Ok(bytes) => match FontVec::try_from_vec(bytes) {
                    Ok(font) => {
                        debug!("Resolved {} from file {:?}", family.name(), path);
                        return Ok(FontArc::new(font));
                    }
                    Err(_) => warn!("Font file {:?} for {} is not a valid font", path, family.name()),
                },
                Err(e) => warn!("Could not read font file {:?} for {}: {}", path, family.name(), e),
            }
        }

        let names: Vec<Family<'_>> = face.names.iter().map(|n| Family::Name(n.as_str())).collect();
        if let Some(font) = self.query(&names) {
            debug!("Resolved {} from configured family names", family.name());
            return Ok(font);
        }

        if self.allow_fallback {
            let generic = if family.is_serif() { Family::Serif } else { Family::SansSerif };
            let substitute = self
                .query(&[generic])
                .or_else(|| self.database.faces().next().and_then(|f| self.face_by_id(f.id)));

            if let Some(font) = substitute {
                warn!("Font {} not found; substituting a fallback face", family.name());
                return Ok(font);
            }
        }

        Err(CompositorError::FontUnavailable {
            family: family.name().to_string(),
        }
        .into())
    }

    fn query(&self, families: &[Family<'_>]) -> Option<FontArc> {
        if families.is_empty() {
            return None;
        }
        let query = Query {
            families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.database.query(&query)?;
        self.face_by_id(id)
    }

    fn face_by_id(&self, id: fontdb::ID) -> Option<FontArc> {
        self.database
            .with_face_data(id, |data, index| FontVec::try_from_vec_and_index(data.to_vec(), index))?
            .ok()
            .map(FontArc::new)
    }

    fn lock_loaded(&self) -> std::sync::MutexGuard<'_, HashMap<FontFamily, FontArc>> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_fonts_from_dir(database: &mut Database, dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        warn!("Font directory {:?} is not readable", dir);
        return;
    };

    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        let is_font = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
            .unwrap_or(false);
        if path.is_file() && is_font {
            if let Err(e) = database.load_font_file(&path) {
                warn!("Skipping font {:?}: {}", path, e);
            }
        }
    }
}

/// Registry over the bundled Tuffy face, mapped to every family through the
/// font database so lookups go through the same path as installed fonts.
#[cfg(test)]
pub(crate) fn fixture_registry() -> FontRegistry {
    let mut config = FontConfig {
        system_fonts: false,
        font_dirs: vec![Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")],
        ..FontConfig::default()
    };
    for face in [
        &mut config.serif,
        &mut config.sans_serif,
        &mut config.arial,
        &mut config.times,
        &mut config.helvetica,
    ] {
        face.names = vec!["Tuffy".to_string()];
    }
    FontRegistry::new(&config, false)
}
