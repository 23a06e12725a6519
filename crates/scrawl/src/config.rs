//! Configuration types for Scrawl sketches.
//!
//! This module provides the configuration that seeds a [`Sketch`](crate::Sketch):
//! per-kind default attribute tables, the font-family table used to measure
//! text, sketch-wide attribute overrides, and document settings. All types
//! implement [`serde::Deserialize`] so they can be loaded from TOML with
//! [`load_config`].
//!
//! # Overview
//!
//! - [`SketchConfig`] - Top-level configuration.
//! - [`DefaultsConfig`] - Per-kind additions and changes to the built-in default tables.
//! - [`DocumentConfig`] - Settings of the written drawing document.
//! - [`DefaultsTable`] - The resolved, read-only default table for every kind.
//!
//! # Example
//!
//! ```
//! # use scrawl::config::SketchConfig;
//! # use scrawl::element::ElementKind;
//! let config: SketchConfig = toml::from_str(
//!     r#"
//!     [overrides]
//!     roughness = 2
//!
//!     [defaults.rectangle]
//!     strokeColor = "blue"
//!
//!     [fonts]
//!     "1" = "fonts/Virgil.ttf"
//!     "#,
//! )
//! .unwrap();
//!
//! let table = config.defaults_table().unwrap();
//! let rectangle = table.get(ElementKind::Rectangle);
//! assert_eq!(rectangle.get("strokeColor"), Some(&"blue".into()));
//! assert_eq!(rectangle.get("roughness"), Some(&2.into()));
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use scrawl_core::{
    attributes::Attributes,
    element::{BOUND_ELEMENTS, ElementKind},
    font::{FontBook, FontMetrics},
};

use crate::ScrawlError;

/// Value of the document's `source` field unless configured otherwise.
pub const DEFAULT_SOURCE: &str = "https://excalidraw.com";

/// Canvas background color unless configured otherwise.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

/// Top-level sketch configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SketchConfig {
    /// Changes to the built-in per-kind default tables.
    #[serde(default)]
    defaults: DefaultsConfig,

    /// Font-family identifier to font file.
    #[serde(default)]
    fonts: IndexMap<String, PathBuf>,

    /// Sketch-wide overrides, applied to every kind whose table has the key.
    #[serde(default)]
    overrides: Attributes,

    /// Document section.
    #[serde(default)]
    document: DocumentConfig,
}

impl SketchConfig {
    /// Returns the configuration with font `family` mapped to `path`.
    pub fn with_font(mut self, family: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.fonts.insert(family.into(), path.into());
        self
    }

    /// Returns the configuration with a sketch-wide override of `key`.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key, value);
        self
    }

    /// Returns the configuration with `attributes` layered onto the
    /// built-in defaults of `kind`.
    pub fn with_defaults(mut self, kind: ElementKind, attributes: Attributes) -> Self {
        *self.defaults.slot_mut(kind) = Some(attributes);
        self
    }

    pub fn fonts(&self) -> &IndexMap<String, PathBuf> {
        &self.fonts
    }

    pub fn overrides(&self) -> &Attributes {
        &self.overrides
    }

    pub fn document(&self) -> &DocumentConfig {
        &self.document
    }

    /// Builds the read-only default table for every element kind.
    ///
    /// Starting from [`DefaultsTable::builtin`], each configured kind table
    /// is layered on (its keys may extend the schema), then every
    /// sketch-wide override is applied to each kind whose table contains it.
    ///
    /// # Errors
    ///
    /// Returns [`ScrawlError::UnusedGlobalOverride`] when an override key is
    /// present in no kind's table.
    pub fn defaults_table(&self) -> Result<DefaultsTable, ScrawlError> {
        let mut table = DefaultsTable::builtin();

        for kind in ElementKind::ALL {
            if let Some(configured) = self.defaults.slot(kind) {
                let target = table.get_mut(kind);
                for (key, value) in configured {
                    target.insert(key.clone(), value.clone());
                }
            }
        }

        for (key, value) in &self.overrides {
            let mut used = false;
            for kind in ElementKind::ALL {
                if let Some(slot) = table.get_mut(kind).get_mut(key) {
                    *slot = value.clone();
                    used = true;
                }
            }
            if !used {
                return Err(ScrawlError::UnusedGlobalOverride(key.clone()));
            }
        }

        Ok(table)
    }

    /// Builds the font book for this configuration, measuring with `metrics`.
    pub fn font_book(&self, metrics: impl FontMetrics + 'static) -> FontBook {
        self.fonts
            .iter()
            .fold(FontBook::new(metrics), |book, (family, path)| {
                book.with_family(family.clone(), path.clone())
            })
    }
}

/// Per-kind attribute tables layered onto the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    rectangle: Option<Attributes>,
    #[serde(default)]
    ellipse: Option<Attributes>,
    #[serde(default)]
    diamond: Option<Attributes>,
    #[serde(default)]
    text: Option<Attributes>,
    #[serde(default)]
    line: Option<Attributes>,
    #[serde(default)]
    arrow: Option<Attributes>,
}

impl DefaultsConfig {
    fn slot(&self, kind: ElementKind) -> Option<&Attributes> {
        match kind {
            ElementKind::Rectangle => self.rectangle.as_ref(),
            ElementKind::Ellipse => self.ellipse.as_ref(),
            ElementKind::Diamond => self.diamond.as_ref(),
            ElementKind::Text => self.text.as_ref(),
            ElementKind::Line => self.line.as_ref(),
            ElementKind::Arrow => self.arrow.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: ElementKind) -> &mut Option<Attributes> {
        match kind {
            ElementKind::Rectangle => &mut self.rectangle,
            ElementKind::Ellipse => &mut self.ellipse,
            ElementKind::Diamond => &mut self.diamond,
            ElementKind::Text => &mut self.text,
            ElementKind::Line => &mut self.line,
            ElementKind::Arrow => &mut self.arrow,
        }
    }
}

/// Settings of the written drawing document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentConfig {
    /// The document's `source` field.
    #[serde(default)]
    source: Option<String>,

    /// The canvas background color, as a CSS color string.
    #[serde(default)]
    background_color: Option<String>,
}

impl DocumentConfig {
    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    pub fn background_color(&self) -> &str {
        self.background_color
            .as_deref()
            .unwrap_or(DEFAULT_BACKGROUND_COLOR)
    }
}

/// The resolved default attribute table of every element kind.
///
/// Elements copy their kind's table on construction, so this table is never
/// changed by edits to elements.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultsTable {
    tables: IndexMap<ElementKind, Attributes>,
}

impl DefaultsTable {
    /// The Excalidraw defaults for every kind.
    pub fn builtin() -> Self {
        let tables = ElementKind::ALL
            .into_iter()
            .map(|kind| (kind, builtin_attributes(kind)))
            .collect();
        Self { tables }
    }

    /// Returns the table of `kind`.
    pub fn get(&self, kind: ElementKind) -> &Attributes {
        &self.tables[&kind]
    }

    fn get_mut(&mut self, kind: ElementKind) -> &mut Attributes {
        self.tables.entry(kind).or_default()
    }
}

fn builtin_attributes(kind: ElementKind) -> Attributes {
    let roundness = match kind {
        ElementKind::Rectangle => json!({ "type": 3 }),
        ElementKind::Diamond | ElementKind::Line | ElementKind::Arrow => json!({ "type": 2 }),
        ElementKind::Ellipse | ElementKind::Text => Value::Null,
    };

    let common = Attributes::new()
        .with("angle", 0)
        .with("strokeColor", "#1e1e1e")
        .with("backgroundColor", "transparent")
        .with("fillStyle", "solid")
        .with("strokeWidth", 2)
        .with("strokeStyle", "solid")
        .with("roughness", 1)
        .with("opacity", 100)
        .with("roundness", roundness)
        .with("frameId", Value::Null)
        .with(BOUND_ELEMENTS, Value::Null)
        .with("updated", 1)
        .with("link", Value::Null)
        .with("locked", false)
        .with("isDeleted", false);

    match kind {
        ElementKind::Rectangle | ElementKind::Ellipse | ElementKind::Diamond => common,
        ElementKind::Text => common
            .with("fontSize", 20)
            .with("fontFamily", 1)
            .with("textAlign", "center")
            .with("verticalAlign", "middle")
            .with("containerId", Value::Null)
            .with("lineHeight", 1.25),
        ElementKind::Line | ElementKind::Arrow => common
            .with("startBinding", Value::Null)
            .with("endBinding", Value::Null)
            .with("startArrowhead", Value::Null)
            .with(
                "endArrowhead",
                if kind == ElementKind::Arrow {
                    json!("arrow")
                } else {
                    Value::Null
                },
            )
            .with("lastCommittedPoint", Value::Null),
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (scrawl/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<SketchConfig, ScrawlError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("scrawl/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "scrawl", "scrawl") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(SketchConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<SketchConfig, ScrawlError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: SketchConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}
