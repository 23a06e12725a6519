//! Scrawl - Build Excalidraw sketches from code.
//!
//! Shapes, text, and connectors are added to a [`Sketch`], which fills in the
//! per-kind default attributes, measures text with real fonts, keeps
//! connector bindings consistent on both ends, and writes the result as an
//! `.excalidraw` document.
//!
//! # Examples
//!
//! ```rust,no_run
//! use scrawl::{Sketch, ConnectorStyle, attributes::Attributes, config, geometry::{Point, Size}};
//!
//! let config = config::load_config(None::<&str>)?.with_font("1", "fonts/Virgil.ttf");
//! let mut sketch = Sketch::new(&config)?;
//!
//! let start = sketch.text_box("Start Here", Point::new(0.0, 0.0), &Attributes::new(), &Attributes::new())?;
//! let circle = sketch.ellipse(
//!     Point::new(200.0, 150.0),
//!     Size::new(50.0, 50.0),
//!     &Attributes::new().with("backgroundColor", "red"),
//! )?;
//! sketch.binding_arrow(&start, &circle, ConnectorStyle::Arrow, &Attributes::new())?;
//!
//! sketch.export_to_file("flowchart.excalidraw")?;
//! # Ok::<(), scrawl::ScrawlError>(())
//! ```

pub mod config;
pub mod document;

mod error;
mod sketch;

pub use scrawl_core::{attributes, element, export, font, geometry, identifier};

pub use error::ScrawlError;
pub use sketch::{
    ConnectorStyle, DEFAULT_BOUNDING_PADDING, HEADER_GAP, Sketch, TEXT_BOX_PADDING,
};
