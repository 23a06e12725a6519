//! Font lookup and text measurement.
//!
//! Text elements derive their size from the rendered extents of their string.
//! This module provides the pieces that turn a resolved `fontFamily` /
//! `fontSize` pair into those extents:
//!
//! - [`FontMetrics`] - Measures a string rendered from a font file
//! - [`CosmicTextMetrics`] - The [`FontMetrics`] implementation backed by `cosmic-text`
//! - [`FontBook`] - Maps font-family identifiers to font files and owns a metrics provider
//! - [`TextExtents`] - The measured `(left, top, right, bottom)` box
//!
//! # Example
//!
//! ```
//! # use scrawl_core::font::{FontBook, FontMetrics, TextExtents, FontError};
//! # use std::path::Path;
//! struct FixedWidth;
//!
//! impl FontMetrics for FixedWidth {
//!     fn measure(&self, _file: &Path, size: f64, text: &str) -> Result<TextExtents, FontError> {
//!         Ok(TextExtents::new(0.0, 0.0, text.chars().count() as f64 * size / 2.0, size))
//!     }
//! }
//!
//! let fonts = FontBook::new(FixedWidth).with_family("1", "fonts/Virgil.woff2");
//! let extents = fonts.measure(&1.into(), 20.0, "Hello").unwrap();
//! assert_eq!(extents.width(), 50.0);
//! assert_eq!(extents.height(), 20.0);
//! ```

use std::{
    collections::HashMap,
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, fontdb};
use indexmap::IndexMap;
use log::{debug, info, trace};
use serde_json::Value;
use thiserror::Error;

/// Line height used when laying out measured text, as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.25;

/// Errors produced while locating or measuring a font.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("no font file is mapped for font family {0}")]
    UnmappedFamily(String),

    #[error("failed to read font file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("font file {0} contains no usable font faces")]
    NoFaces(PathBuf),

    #[error("font size is missing or not a number")]
    MissingSize,
}

/// The bounding box of a rendered string, relative to its drawing origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtents {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl TextExtents {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn left(self) -> f64 {
        self.left
    }

    pub fn top(self) -> f64 {
        self.top
    }

    pub fn right(self) -> f64 {
        self.right
    }

    pub fn bottom(self) -> f64 {
        self.bottom
    }

    pub fn width(self) -> f64 {
        self.right - self.left
    }

    pub fn height(self) -> f64 {
        self.bottom - self.top
    }

    /// The smallest box containing both boxes.
    pub fn union(self, other: Self) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// A provider of rendered text extents.
pub trait FontMetrics {
    /// Measures `text` rendered from the font in `font_file` at `font_size` pixels.
    fn measure(
        &self,
        font_file: &Path,
        font_size: f64,
        text: &str,
    ) -> Result<TextExtents, FontError>;
}

/// The font-family table plus the metrics provider used to measure text.
///
/// Families are keyed by the string form of the `fontFamily` attribute, so
/// the numeric Excalidraw family `1` and the string `"1"` resolve to the same
/// entry.
pub struct FontBook {
    families: IndexMap<String, PathBuf>,
    metrics: Box<dyn FontMetrics>,
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.families)
            .finish_non_exhaustive()
    }
}

impl FontBook {
    /// Creates an empty font book that measures with `metrics`.
    pub fn new(metrics: impl FontMetrics + 'static) -> Self {
        Self {
            families: IndexMap::new(),
            metrics: Box::new(metrics),
        }
    }

    /// Returns the book with `family` mapped to `path`.
    pub fn with_family(mut self, family: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert_family(family, path);
        self
    }

    /// Maps `family` to the font file at `path`, replacing any earlier mapping.
    pub fn insert_family(&mut self, family: impl Into<String>, path: impl Into<PathBuf>) {
        self.families.insert(family.into(), path.into());
    }

    /// Returns the font file mapped to a `fontFamily` attribute value.
    pub fn font_file(&self, family: &Value) -> Option<&Path> {
        self.families.get(&family_key(family)).map(PathBuf::as_path)
    }

    /// Measures `text` in the font mapped to `family`.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::UnmappedFamily`] when no file is mapped for the
    /// family, or the metrics provider's error when the file cannot be used.
    pub fn measure(
        &self,
        family: &Value,
        font_size: f64,
        text: &str,
    ) -> Result<TextExtents, FontError> {
        let font_file = self
            .font_file(family)
            .ok_or_else(|| FontError::UnmappedFamily(family_key(family)))?;
        self.metrics.measure(font_file, font_size, text)
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new(CosmicTextMetrics::shared())
    }
}

/// Normalizes a `fontFamily` attribute value into a font-book key.
pub fn family_key(family: &Value) -> String {
    match family {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}

/// [`FontMetrics`] backed by `cosmic-text` shaping.
///
/// Font files are loaded on first use into a private font database (system
/// fonts are never consulted, so measurements depend only on the mapped
/// file). The loaded family name is cached per path.
#[derive(Clone)]
pub struct CosmicTextMetrics {
    inner: Arc<Mutex<MetricsState>>,
}

struct MetricsState {
    font_system: FontSystem,
    swash_cache: SwashCache,
    loaded: HashMap<PathBuf, String>,
}

impl fmt::Debug for CosmicTextMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CosmicTextMetrics").finish_non_exhaustive()
    }
}

impl Default for CosmicTextMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CosmicTextMetrics {
    /// Creates a metrics provider with its own, initially empty, font database.
    pub fn new() -> Self {
        info!("Initializing FontSystem");
        let font_system =
            FontSystem::new_with_locale_and_db(String::from("en-US"), fontdb::Database::new());
        Self {
            inner: Arc::new(Mutex::new(MetricsState {
                font_system,
                swash_cache: SwashCache::new(),
                loaded: HashMap::new(),
            })),
        }
    }

    /// Returns a handle to the process-wide provider, so font files are
    /// loaded once no matter how many font books are created.
    pub fn shared() -> Self {
        SHARED_METRICS.get_or_init(Self::new).clone()
    }
}

impl MetricsState {
    /// Loads `font_file` if needed and returns the family name of its first face.
    fn family_name(&mut self, font_file: &Path) -> Result<String, FontError> {
        if let Some(name) = self.loaded.get(font_file) {
            return Ok(name.clone());
        }

        let data = fs::read(font_file).map_err(|source| FontError::Read {
            path: font_file.to_path_buf(),
            source,
        })?;

        let db = self.font_system.db_mut();
        let ids = db.load_font_source(fontdb::Source::Binary(Arc::new(data)));
        let name = ids
            .iter()
            .filter_map(|id| db.face(*id))
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .ok_or_else(|| FontError::NoFaces(font_file.to_path_buf()))?;

        debug!(path:? = font_file, family = name.as_str(); "Loaded font file");
        self.loaded.insert(font_file.to_path_buf(), name.clone());
        Ok(name)
    }
}

impl FontMetrics for CosmicTextMetrics {
    /// Measures the inked box of the shaped string.
    ///
    /// Every glyph is rasterized with `swash` and the placements of the
    /// resulting images are combined, so the box follows the rendered
    /// outlines: `"."` is shorter than `"Hg"`. Coordinates are relative to the
    /// top-left of the first line, whose height is [`LINE_HEIGHT`] times the
    /// font size. A string without ink (only spaces) spans its advance width
    /// and its line boxes.
    fn measure(
        &self,
        font_file: &Path,
        font_size: f64,
        text: &str,
    ) -> Result<TextExtents, FontError> {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let family = state.family_name(font_file)?;

        if text.is_empty() {
            return Ok(TextExtents::default());
        }

        let font_size_px = font_size as f32;
        let metrics = Metrics::new(font_size_px, font_size_px * LINE_HEIGHT as f32);

        let MetricsState {
            font_system,
            swash_cache,
            ..
        } = &mut *state;
        let mut buffer = Buffer::new(font_system, metrics);

        let attrs = Attrs::new().family(Family::Name(&family));
        buffer.set_size(font_system, None, None);
        buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(font_system, true);

        let mut ink: Option<TextExtents> = None;
        let mut advance: f32 = 0.0;
        let mut lines = 0usize;
        for run in buffer.layout_runs() {
            lines += 1;
            for glyph in run.glyphs.iter() {
                advance = advance.max(glyph.x + glyph.w);

                let physical = glyph.physical((0.0, 0.0), 1.0);
                let Some(image) = swash_cache.get_image(font_system, physical.cache_key) else {
                    continue;
                };
                let placement = image.placement;
                if placement.width == 0 || placement.height == 0 {
                    continue;
                }

                let left = f64::from(physical.x + placement.left);
                let top = f64::from(run.line_y as i32 + physical.y - placement.top);
                let glyph_box = TextExtents::new(
                    left,
                    top,
                    left + f64::from(placement.width),
                    top + f64::from(placement.height),
                );
                ink = Some(match ink {
                    Some(extents) => extents.union(glyph_box),
                    None => glyph_box,
                });
            }
        }

        let extents = ink.unwrap_or_else(|| {
            TextExtents::new(
                0.0,
                0.0,
                f64::from(advance),
                lines as f64 * font_size * LINE_HEIGHT,
            )
        });
        trace!(family = family.as_str(), font_size, extents:?; "Measured text extents");
        Ok(extents)
    }
}

static SHARED_METRICS: OnceLock<CosmicTextMetrics> = OnceLock::new();

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    struct Unused;

    impl FontMetrics for Unused {
        fn measure(&self, _: &Path, _: f64, _: &str) -> Result<TextExtents, FontError> {
            panic!("metrics should not be consulted");
        }
    }

    #[test]
    fn test_text_extents_dimensions() {
        let extents = TextExtents::new(-1.0, 2.0, 41.0, 27.0);
        assert_eq!(extents.width(), 42.0);
        assert_eq!(extents.height(), 25.0);
    }

    #[test]
    fn test_family_key_normalizes_numbers_and_strings() {
        assert_eq!(family_key(&json!(1)), "1");
        assert_eq!(family_key(&json!("1")), "1");
        assert_eq!(family_key(&json!("Virgil")), "Virgil");
    }

    #[test]
    fn test_font_book_lookup() {
        let fonts = FontBook::new(Unused).with_family("2", "/fonts/Helvetica.ttf");
        assert_eq!(fonts.font_file(&json!(2)), Some(Path::new("/fonts/Helvetica.ttf")));
        assert_eq!(fonts.font_file(&json!(3)), None);
    }

    #[test]
    fn test_unmapped_family_does_not_reach_metrics() {
        let fonts = FontBook::new(Unused);
        let err = fonts.measure(&json!(9), 20.0, "text").unwrap_err();
        assert!(matches!(err, FontError::UnmappedFamily(family) if family == "9"));
    }

    #[test]
    fn test_cosmic_missing_file_is_read_error() {
        let metrics = CosmicTextMetrics::new();
        let err = metrics
            .measure(Path::new("/definitely/not/a/font.ttf"), 20.0, "Hello")
            .unwrap_err();
        assert!(matches!(err, FontError::Read { .. }));
    }

    #[test]
    fn test_cosmic_garbage_file_has_no_faces() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a font").unwrap();

        let metrics = CosmicTextMetrics::new();
        let err = metrics.measure(file.path(), 20.0, "Hello").unwrap_err();
        assert!(matches!(err, FontError::NoFaces(_)));
    }

    /// An installed Latin text font file, or `None` on font-less hosts.
    fn system_font_file() -> Option<PathBuf> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        db.faces().find_map(|face| match &face.source {
            fontdb::Source::File(path)
                if face
                    .families
                    .iter()
                    .any(|(name, _)| name.contains("Sans") || name.contains("Serif")) =>
            {
                let ext = path.extension()?.to_str()?.to_ascii_lowercase();
                matches!(ext.as_str(), "ttf" | "otf").then(|| path.clone())
            }
            _ => None,
        })
    }

    #[test]
    fn test_cosmic_height_follows_glyph_ink() {
        let Some(font_file) = system_font_file() else {
            return;
        };
        let metrics = CosmicTextMetrics::new();

        let dot = metrics.measure(&font_file, 40.0, ".").unwrap();
        let tall = metrics.measure(&font_file, 40.0, "Hg").unwrap();

        assert!(dot.height() > 0.0);
        assert!(
            dot.height() < tall.height(),
            "'.' is {} high, 'Hg' is {} high",
            dot.height(),
            tall.height()
        );
        assert!(dot.width() < tall.width());
        // The dot sits on the baseline, below the top of the capital.
        assert!(dot.top() > tall.top());
    }

    #[test]
    fn test_cosmic_whitespace_spans_line_box() {
        let Some(font_file) = system_font_file() else {
            return;
        };
        let metrics = CosmicTextMetrics::new();

        let blank = metrics.measure(&font_file, 20.0, "   ").unwrap();
        assert_eq!(blank.top(), 0.0);
        assert_eq!(blank.height(), 20.0 * LINE_HEIGHT);
        assert!(blank.width() > 0.0);
    }

    #[test]
    fn test_text_extents_union() {
        let a = TextExtents::new(0.0, 5.0, 10.0, 20.0);
        let b = TextExtents::new(-2.0, 8.0, 6.0, 30.0);
        assert_eq!(a.union(b), TextExtents::new(-2.0, 5.0, 10.0, 30.0));
    }
}
