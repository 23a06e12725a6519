//! The Excalidraw drawing document.

use serde::Serialize;
use serde_json::{Map, Value};

use scrawl_core::export::ExportRecord;

use crate::config::DocumentConfig;

/// Document `type` field.
pub const DOCUMENT_TYPE: &str = "excalidraw";

/// Document format version.
pub const DOCUMENT_VERSION: u32 = 2;

/// A complete drawing, ready to be serialized as an `.excalidraw` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "type")]
    kind: &'static str,
    version: u32,
    source: String,
    elements: Vec<ExportRecord>,
    app_state: AppState,
    files: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppState {
    grid_size: Option<u32>,
    view_background_color: String,
}

impl Document {
    pub fn new(config: &DocumentConfig, elements: impl IntoIterator<Item = ExportRecord>) -> Self {
        Self {
            kind: DOCUMENT_TYPE,
            version: DOCUMENT_VERSION,
            source: config.source().to_string(),
            elements: elements.into_iter().collect(),
            app_state: AppState {
                grid_size: None,
                view_background_color: config.background_color().to_string(),
            },
            files: Map::new(),
        }
    }

    pub fn elements(&self) -> &[ExportRecord] {
        &self.elements
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_document_shape() {
        let document = Document::new(&DocumentConfig::default(), Vec::new());
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "excalidraw",
                "version": 2,
                "source": "https://excalidraw.com",
                "elements": [],
                "appState": {"gridSize": null, "viewBackgroundColor": "#ffffff"},
                "files": {},
            })
        );
    }

    #[test]
    fn test_document_key_order() {
        let document = Document::new(&DocumentConfig::default(), Vec::new());
        let value = serde_json::to_value(&document).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec!["type", "version", "source", "elements", "appState", "files"]
        );
    }
}
