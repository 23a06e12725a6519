use serde::{Deserialize, Serialize};

use crate::{
    attributes::Attributes,
    element::{ElementBase, ElementKind, Primitive},
    error::ElementError,
    geometry::{Point, Size},
    identifier::IdSource,
};

/// The closed set of shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Diamond,
}

impl From<ShapeKind> for ElementKind {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rectangle => ElementKind::Rectangle,
            ShapeKind::Ellipse => ElementKind::Ellipse,
            ShapeKind::Diamond => ElementKind::Diamond,
        }
    }
}

/// A rectangle, ellipse, or diamond.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    base: ElementBase,
}

impl Shape {
    /// Creates a shape of `size` centered on `center`.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::UnrecognizedAttribute`] for override keys
    /// missing from `defaults`.
    pub fn new(
        kind: ShapeKind,
        defaults: &Attributes,
        ids: &mut dyn IdSource,
        center: Point,
        size: Size,
        overrides: &Attributes,
    ) -> Result<Self, ElementError> {
        let top_left = center.sub_point(size.half());
        let base = ElementBase::new(kind.into(), defaults, ids, top_left, size, overrides)?;
        Ok(Self { base })
    }
}

impl Primitive for Shape {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}
