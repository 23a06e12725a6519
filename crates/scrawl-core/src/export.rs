//! Export records: the flat, serializable form of an element.
//!
//! An [`ExportRecord`] is the JSON object a drawing-file writer places in the
//! document's `elements` array. Key names and nesting are the compatibility
//! surface with downstream viewers, so they follow the Excalidraw file
//! schema exactly:
//!
//! ```text
//! { id, type, seed, x, y, width, height, groupIds,
//!   ...resolved attributes,
//!   text        (text elements)
//!   points      (line and arrow elements) }
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::element::ElementBase;

/// A single element flattened into its file representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExportRecord(Map<String, Value>);

impl ExportRecord {
    /// Builds the record shared by every element kind: the fixed identity and
    /// geometry keys followed by all resolved attributes.
    pub fn from_base(base: &ElementBase) -> Self {
        let mut record = Map::new();
        record.insert("id".into(), base.id().as_str().into());
        record.insert("type".into(), base.kind().as_str().into());
        record.insert("seed".into(), base.seed().into());
        record.insert("x".into(), base.position().x().into());
        record.insert("y".into(), base.position().y().into());
        record.insert("width".into(), base.size().width().into());
        record.insert("height".into(), base.size().height().into());
        record.insert(
            "groupIds".into(),
            base.group_ids()
                .iter()
                .map(|group| Value::from(group.as_str()))
                .collect(),
        );
        for (key, value) in base.attributes() {
            record.insert(key.clone(), value.clone());
        }
        Self(record)
    }

    /// Adds a kind-specific field, replacing any attribute of the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<ExportRecord> for Value {
    fn from(record: ExportRecord) -> Self {
        record.into_value()
    }
}
