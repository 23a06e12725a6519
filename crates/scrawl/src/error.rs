//! Error types for Scrawl operations.
//!
//! This module provides the main error type [`ScrawlError`] which wraps
//! every failure a [`Sketch`](crate::Sketch) can report.

use std::io;

use thiserror::Error;

use scrawl_core::{error::ElementError, identifier::ElementId};

use crate::config::ConfigError;

/// The main error type for Scrawl operations.
#[derive(Debug, Error)]
pub enum ScrawlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Element(#[from] ElementError),

    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),

    #[error("Element {0} is not a line or arrow")]
    NotAConnector(ElementId),

    /// A sketch-wide override whose key appears in no kind's defaults.
    #[error("Key <{0}> not used.")]
    UnusedGlobalOverride(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
