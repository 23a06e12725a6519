//! Error types for element construction.

use thiserror::Error;

use crate::{element::ElementKind, font::FontError};

/// Errors raised while constructing or mutating an element.
///
/// Both variants are fatal to the single operation that raised them: no
/// partially built element is ever returned.
#[derive(Debug, Error)]
pub enum ElementError {
    /// An override key is not part of the kind's default attribute schema.
    #[error("Unexpected key for shape {kind}: {key}")]
    UnrecognizedAttribute { kind: ElementKind, key: String },

    /// Text could not be measured in its resolved font family.
    #[error("Cannot measure text in font family {family}: {source}")]
    UnmeasurableText {
        family: String,
        #[source]
        source: FontError,
    },
}
