//! The element model.
//!
//! An element is a single drawable unit of a sketch. All kinds share an
//! [`ElementBase`] holding identity, geometry, group membership, and resolved
//! style attributes; the kind-specific data lives in one of three variants:
//!
//! - [`Shape`] - rectangle, ellipse, or diamond positioned by its center
//! - [`Text`] - a string whose size is measured from real font metrics
//! - [`Connector`] - a line or arrow between two points, with optional bindings
//!
//! The [`Primitive`] trait is the common interface over the variants, and
//! [`Element`] is the closed enum a sketch stores.
//!
//! # Example
//!
//! ```
//! # use scrawl_core::attributes::Attributes;
//! # use scrawl_core::element::{Primitive, Shape, ShapeKind};
//! # use scrawl_core::geometry::{Point, Size};
//! # use scrawl_core::identifier::SequentialIdSource;
//! let defaults = Attributes::new().with("strokeColor", "#1e1e1e");
//! let mut ids = SequentialIdSource::new("el", 1);
//!
//! let shape = Shape::new(
//!     ShapeKind::Rectangle,
//!     &defaults,
//!     &mut ids,
//!     Point::new(0.0, 0.0),
//!     Size::new(100.0, 50.0),
//!     &Attributes::new(),
//! )
//! .unwrap();
//!
//! assert_eq!(shape.center(), Point::new(0.0, 0.0));
//! assert_eq!(shape.bbox(), [-50.0, -25.0, 50.0, 25.0]);
//! ```

use std::{
    f64::consts::{FRAC_PI_2, PI},
    fmt,
    str::FromStr,
};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    attributes::Attributes,
    error::ElementError,
    export::ExportRecord,
    geometry::{Bounds, Point, Size},
    identifier::{ElementId, GroupId, IdSource},
};

mod connector;
mod shape;
mod text;

pub use connector::{Binding, BindingEnd, Connector, ConnectorKind, DEFAULT_BINDING_GAP};
pub use shape::{Shape, ShapeKind};
pub use text::{FONT_FAMILY, FONT_SIZE, Text};

/// Width and height given to elements whose size is not specified.
pub const DEFAULT_SIZE: f64 = 100.0;

/// Distance between an element's edge and an anchor from [`ElementBase::edge_midpoint`].
pub const DEFAULT_EDGE_PADDING: f64 = 5.0;

/// Attribute listing the connectors bound to an element.
pub const BOUND_ELEMENTS: &str = "boundElements";

/// The discriminant of an element, written as the record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Diamond,
    Text,
    Line,
    Arrow,
}

impl ElementKind {
    /// Every kind, in schema order.
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Rectangle,
        ElementKind::Ellipse,
        ElementKind::Diamond,
        ElementKind::Text,
        ElementKind::Line,
        ElementKind::Arrow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Rectangle => "rectangle",
            ElementKind::Ellipse => "ellipse",
            ElementKind::Diamond => "diamond",
            ElementKind::Text => "text",
            ElementKind::Line => "line",
            ElementKind::Arrow => "arrow",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown element kind: {s}"))
    }
}

/// State shared by every element kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBase {
    id: ElementId,
    kind: ElementKind,
    seed: u32,
    position: Point,
    size: Size,
    group_ids: Vec<GroupId>,
    attributes: Attributes,
}

impl ElementBase {
    /// Creates an element at top-left `position` with a fresh id and seed.
    ///
    /// The attributes are the kind's `defaults` with `overrides` merged on
    /// top, see [`Attributes::merged`].
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::UnrecognizedAttribute`] if `overrides` contains
    /// a key missing from `defaults`.
    pub fn new(
        kind: ElementKind,
        defaults: &Attributes,
        ids: &mut dyn IdSource,
        position: Point,
        size: Size,
        overrides: &Attributes,
    ) -> Result<Self, ElementError> {
        let attributes = defaults.merged(kind, overrides)?;
        let id = ids.next_element_id();
        let seed = ids.next_seed();
        debug!(id:%, kind:%, seed; "Created element");

        Ok(Self {
            id,
            kind,
            seed,
            position,
            size,
            group_ids: Vec::new(),
            attributes,
        })
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the top-left corner.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Groups this element belongs to, innermost first.
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    /// Adds the element to `group`, as an outer group of any existing ones.
    pub fn push_group(&mut self, group: GroupId) {
        self.group_ids.push(group);
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Returns `(x + width / 2, y + height / 2)`.
    pub fn center(&self) -> Point {
        self.position.add_point(self.size.half())
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.position, self.size)
    }

    /// Returns `[x, y, x + width, y + height]`.
    pub fn bbox(&self) -> [f64; 4] {
        self.bounds().to_array()
    }

    /// Returns the anchor point for a connector leaving the center in direction `theta`.
    ///
    /// `theta` is measured in radians from the positive x-axis (positive is
    /// downward). Directions inside the cone spanned by the corners of the
    /// left or right side land on the middle of that vertical edge; all other
    /// directions land on the middle of the top or bottom edge. The anchor is
    /// then moved `padding` away from the element along the edge normal.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scrawl_core::attributes::Attributes;
    /// # use scrawl_core::element::{ElementBase, ElementKind};
    /// # use scrawl_core::geometry::{Point, Size};
    /// # use scrawl_core::identifier::SequentialIdSource;
    /// use std::f64::consts::FRAC_PI_2;
    ///
    /// let base = ElementBase::new(
    ///     ElementKind::Rectangle,
    ///     &Attributes::new(),
    ///     &mut SequentialIdSource::new("el", 0),
    ///     Point::new(-50.0, -50.0),
    ///     Size::new(100.0, 100.0),
    ///     &Attributes::new(),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(base.edge_midpoint(0.0, 5.0), Point::new(55.0, 0.0));
    /// assert_eq!(base.edge_midpoint(FRAC_PI_2, 5.0), Point::new(0.0, 55.0));
    /// ```
    pub fn edge_midpoint(&self, theta: f64, padding: f64) -> Point {
        let (x, y) = (self.position.x(), self.position.y());
        let (width, height) = (self.size.width(), self.size.height());
        let theta_lim = height.atan2(width);

        if theta.abs() < theta_lim || theta.abs() > PI - theta_lim {
            let indicator = indicator(theta.abs() < FRAC_PI_2);
            Point::new(
                x + width * indicator + padding * (-1.0 + 2.0 * indicator),
                y + height / 2.0,
            )
        } else {
            let indicator = indicator(theta > 0.0);
            Point::new(
                x + width / 2.0,
                y + height * indicator + padding * (-1.0 + 2.0 * indicator),
            )
        }
    }

    /// Records that connector `id` of `kind` is bound to this element.
    ///
    /// Entries are appended to the `boundElements` attribute, which is created
    /// when absent or null. Existing entries are never removed.
    pub fn push_bound_element(&mut self, id: &ElementId, kind: ElementKind) {
        let entry = json!({ "id": id.as_str(), "type": kind.as_str() });
        match self.attributes.get_mut(BOUND_ELEMENTS) {
            Some(Value::Array(bound)) => bound.push(entry),
            _ => {
                self.attributes.insert(BOUND_ELEMENTS, Value::Array(vec![entry]));
            }
        }
    }

    /// Flattens the shared state into an [`ExportRecord`].
    pub fn export(&self) -> ExportRecord {
        ExportRecord::from_base(self)
    }
}

fn indicator(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}

/// Common interface of all element variants.
pub trait Primitive {
    fn base(&self) -> &ElementBase;

    fn base_mut(&mut self) -> &mut ElementBase;

    /// Returns the element's file record. Variants add their own fields.
    fn export(&self) -> ExportRecord {
        self.base().export()
    }

    fn id(&self) -> &ElementId {
        self.base().id()
    }

    fn kind(&self) -> ElementKind {
        self.base().kind()
    }

    fn center(&self) -> Point {
        self.base().center()
    }

    fn bbox(&self) -> [f64; 4] {
        self.base().bbox()
    }

    fn edge_midpoint(&self, theta: f64, padding: f64) -> Point {
        self.base().edge_midpoint(theta, padding)
    }
}

/// Any element, as stored by a sketch.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Shape(Shape),
    Text(Text),
    Connector(Connector),
}

impl Element {
    pub fn as_connector(&self) -> Option<&Connector> {
        match self {
            Element::Connector(connector) => Some(connector),
            _ => None,
        }
    }

    pub fn as_connector_mut(&mut self) -> Option<&mut Connector> {
        match self {
            Element::Connector(connector) => Some(connector),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Element::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Primitive for Element {
    fn base(&self) -> &ElementBase {
        match self {
            Element::Shape(shape) => shape.base(),
            Element::Text(text) => text.base(),
            Element::Connector(connector) => connector.base(),
        }
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        match self {
            Element::Shape(shape) => shape.base_mut(),
            Element::Text(text) => text.base_mut(),
            Element::Connector(connector) => connector.base_mut(),
        }
    }

    fn export(&self) -> ExportRecord {
        match self {
            Element::Shape(shape) => shape.export(),
            Element::Text(text) => text.export(),
            Element::Connector(connector) => connector.export(),
        }
    }
}

impl From<Shape> for Element {
    fn from(shape: Shape) -> Self {
        Element::Shape(shape)
    }
}

impl From<Text> for Element {
    fn from(text: Text) -> Self {
        Element::Text(text)
    }
}

impl From<Connector> for Element {
    fn from(connector: Connector) -> Self {
        Element::Connector(connector)
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::identifier::SequentialIdSource;

    fn rect_strategy() -> impl Strategy<Value = (Point, Size)> {
        (
            -1000.0f64..1000.0,
            -1000.0f64..1000.0,
            1.0f64..500.0,
            1.0f64..500.0,
        )
            .prop_map(|(x, y, w, h)| (Point::new(x, y), Size::new(w, h)))
    }

    fn theta_strategy() -> impl Strategy<Value = f64> {
        -PI..PI
    }

    /// The anchor sits exactly `padding` outside one edge, at that edge's midpoint.
    fn check_edge_midpoint_on_padded_edge(
        position: Point,
        size: Size,
        theta: f64,
        padding: f64,
    ) -> Result<(), TestCaseError> {
        let base = ElementBase::new(
            ElementKind::Rectangle,
            &Attributes::new(),
            &mut SequentialIdSource::new("p", 0),
            position,
            size,
            &Attributes::new(),
        )
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let anchor = base.edge_midpoint(theta, padding);
        let bounds = base.bounds().expand(padding);
        let center = base.center();

        let on_vertical = (approx_eq!(f64, anchor.x(), bounds.min_x(), epsilon = 1e-9)
            || approx_eq!(f64, anchor.x(), bounds.max_x(), epsilon = 1e-9))
            && approx_eq!(f64, anchor.y(), center.y(), epsilon = 1e-9);
        let on_horizontal = (approx_eq!(f64, anchor.y(), bounds.min_y(), epsilon = 1e-9)
            || approx_eq!(f64, anchor.y(), bounds.max_y(), epsilon = 1e-9))
            && approx_eq!(f64, anchor.x(), center.x(), epsilon = 1e-9);

        prop_assert!(on_vertical || on_horizontal);
        Ok(())
    }

    /// The anchor lies on the same side of the center as the direction `theta`.
    fn check_edge_midpoint_faces_theta(
        position: Point,
        size: Size,
        theta: f64,
    ) -> Result<(), TestCaseError> {
        let base = ElementBase::new(
            ElementKind::Ellipse,
            &Attributes::new(),
            &mut SequentialIdSource::new("p", 0),
            position,
            size,
            &Attributes::new(),
        )
        .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let anchor = base.edge_midpoint(theta, DEFAULT_EDGE_PADDING);
        let offset = anchor.sub_point(base.center());
        let direction = Point::new(theta.cos(), theta.sin());

        prop_assert!(offset.x() * direction.x() + offset.y() * direction.y() >= 0.0);
        Ok(())
    }

    proptest! {
        #[test]
        fn edge_midpoint_on_padded_edge(
            (position, size) in rect_strategy(),
            theta in theta_strategy(),
            padding in 0.0f64..20.0,
        ) {
            check_edge_midpoint_on_padded_edge(position, size, theta, padding)?;
        }

        #[test]
        fn edge_midpoint_faces_theta((position, size) in rect_strategy(), theta in theta_strategy()) {
            check_edge_midpoint_faces_theta(position, size, theta)?;
        }
    }
}
