//! Scrawl Core Types and Definitions
//!
//! This crate provides the element model behind Scrawl sketches. It includes:
//!
//! - **Attributes**: Per-kind default schemas and override merging ([`attributes::Attributes`])
//! - **Elements**: Shapes, text, and connectors with geometry and bindings ([`element`] module)
//! - **Export**: The flat records written to drawing files ([`export::ExportRecord`])
//! - **Fonts**: Font-family lookup and text measurement ([`font`] module)
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Identifiers**: Element/group ids and seed allocation ([`identifier`] module)

pub mod attributes;
pub mod element;
pub mod error;
pub mod export;
pub mod font;
pub mod geometry;
pub mod identifier;
