use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    attributes::Attributes,
    element::{ElementBase, ElementKind, Primitive},
    error::ElementError,
    export::ExportRecord,
    geometry::{Point, Size},
    identifier::{ElementId, IdSource},
};

/// Default distance kept between a bound connector end and its target.
pub const DEFAULT_BINDING_GAP: f64 = 10.0;

/// The closed set of connector kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    Line,
    Arrow,
}

impl From<ConnectorKind> for ElementKind {
    fn from(kind: ConnectorKind) -> Self {
        match kind {
            ConnectorKind::Line => ElementKind::Line,
            ConnectorKind::Arrow => ElementKind::Arrow,
        }
    }
}

/// Which end of a connector a binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingEnd {
    Start,
    End,
}

impl BindingEnd {
    /// The attribute that stores the binding for this end.
    pub fn attribute(self) -> &'static str {
        match self {
            BindingEnd::Start => "startBinding",
            BindingEnd::End => "endBinding",
        }
    }
}

/// Association of one connector end with a target element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    element_id: ElementId,
    focus: i64,
    gap: f64,
}

impl Binding {
    /// Creates a binding to `element_id`; the focus is always zero.
    pub fn new(element_id: ElementId, gap: f64) -> Self {
        Self {
            element_id,
            focus: 0,
            gap,
        }
    }

    pub fn element_id(&self) -> &ElementId {
        &self.element_id
    }

    pub fn focus(&self) -> i64 {
        self.focus
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// The `{elementId, focus, gap}` attribute value.
    ///
    /// A whole-number gap is written as an integer, so a gap of `10` reads
    /// back as `10` and not `10.0`.
    pub fn to_value(&self) -> Value {
        json!({
            "elementId": self.element_id.as_str(),
            "focus": self.focus,
            "gap": whole_or_float(self.gap),
        })
    }
}

fn whole_or_float(value: f64) -> Value {
    // Beyond 2^53 not every integer is representable, so keep the float.
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

/// A straight line or arrow between two points.
///
/// The element's position is the start point and its path holds exactly two
/// points relative to it: the origin and `end - start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    base: ElementBase,
    points: [Point; 2],
}

impl Connector {
    /// Creates a connector from `start` to `end`, both in absolute coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::UnrecognizedAttribute`] for override keys
    /// missing from `defaults`.
    pub fn new(
        kind: ConnectorKind,
        defaults: &Attributes,
        ids: &mut dyn IdSource,
        start: Point,
        end: Point,
        overrides: &Attributes,
    ) -> Result<Self, ElementError> {
        let delta = end.sub_point(start);
        let extent = delta.abs();
        let size = Size::new(extent.x(), extent.y());
        let base = ElementBase::new(kind.into(), defaults, ids, start, size, overrides)?;

        Ok(Self {
            base,
            points: [Point::default(), delta],
        })
    }

    /// The path, relative to the start point.
    pub fn points(&self) -> [Point; 2] {
        self.points
    }

    /// The absolute start point.
    pub fn start(&self) -> Point {
        self.base.position().add_point(self.points[0])
    }

    /// The absolute end point.
    pub fn end(&self) -> Point {
        self.base.position().add_point(self.points[1])
    }

    /// Binds the start of this connector to `target`, see [`Connector::bind`].
    pub fn set_start_binding<T: Primitive + ?Sized>(&mut self, target: &mut T, gap: f64) {
        self.bind(BindingEnd::Start, target.base_mut(), gap);
    }

    /// Binds the end of this connector to `target`, see [`Connector::bind`].
    pub fn set_end_binding<T: Primitive + ?Sized>(&mut self, target: &mut T, gap: f64) {
        self.bind(BindingEnd::End, target.base_mut(), gap);
    }

    /// Records a binding on both sides.
    ///
    /// This connector's `startBinding`/`endBinding` attribute is set to
    /// `{elementId, focus: 0, gap}`, replacing any earlier binding of that
    /// end, and `{id, type}` of this connector is appended to the target's
    /// `boundElements`.
    pub fn bind(&mut self, end: BindingEnd, target: &mut ElementBase, gap: f64) {
        let binding = Binding::new(target.id().clone(), gap);
        self.attach(end, &binding);
        target.push_bound_element(self.base.id(), self.base.kind());
        debug!(
            connector:% = self.base.id(),
            target:% = target.id(),
            end:?,
            gap;
            "Bound connector"
        );
    }

    /// Sets the connector side of a binding only. The target is expected to
    /// record the connector through [`ElementBase::push_bound_element`].
    pub fn attach(&mut self, end: BindingEnd, binding: &Binding) {
        self.base
            .attributes_mut()
            .insert(end.attribute(), binding.to_value());
    }

    /// Returns the binding stored for `end`, if any.
    pub fn binding(&self, end: BindingEnd) -> Option<Binding> {
        self.base
            .attributes()
            .get(end.attribute())
            .and_then(|value| Binding::deserialize(value).ok())
    }
}

impl Primitive for Connector {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn export(&self) -> ExportRecord {
        let mut record = self.base.export();
        record.insert("points", json!(self.points));
        record
    }
}
