//! The element arena that sketches are built in.
//!
//! A [`Sketch`] owns every element it creates, keyed by [`ElementId`] in
//! insertion order, and is the only place where two elements are changed
//! together (bindings and groups).

use std::{f64::consts::SQRT_2, fmt, fs, path::Path};

use indexmap::IndexMap;
use log::{debug, info, trace};

use scrawl_core::{
    attributes::Attributes,
    element::{
        Binding, BindingEnd, Connector, ConnectorKind, DEFAULT_BINDING_GAP, DEFAULT_EDGE_PADDING,
        Element, ElementKind, Primitive, Shape, ShapeKind, Text,
    },
    font::{CosmicTextMetrics, FontBook, FontMetrics},
    geometry::{Bounds, Point, Size},
    identifier::{ElementId, GroupId, IdSource, RandomIdSource},
};

use crate::{
    ScrawlError,
    config::{DefaultsTable, DocumentConfig, SketchConfig},
    document::Document,
};

/// Space between a text and the rectangle drawn around it.
pub const TEXT_BOX_PADDING: f64 = 10.0;

/// Space between the enclosed element and a bounding shape.
pub const DEFAULT_BOUNDING_PADDING: f64 = 10.0;

/// Vertical space between the header and the content of a header box.
pub const HEADER_GAP: f64 = 10.0;

/// How a binding arrow is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectorStyle {
    Line,
    #[default]
    Arrow,
    /// An arrow with heads at both ends.
    DoubleArrow,
}

/// Builder of a single drawing.
///
/// # Examples
///
/// ```rust,no_run
/// use scrawl::{Sketch, ConnectorStyle, attributes::Attributes, geometry::Point};
///
/// let mut sketch = Sketch::default();
/// let start = sketch.text_box("Start Here", Point::new(0.0, 0.0), &Attributes::new(), &Attributes::new())?;
/// let next = sketch.text_box("Next", Point::new(0.0, 150.0), &Attributes::new(), &Attributes::new())?;
/// sketch.binding_arrow(&start, &next, ConnectorStyle::Arrow, &Attributes::new())?;
///
/// let json = sketch.to_json_string()?;
/// # Ok::<(), scrawl::ScrawlError>(())
/// ```
pub struct Sketch {
    defaults: DefaultsTable,
    fonts: FontBook,
    document: DocumentConfig,
    ids: Box<dyn IdSource>,
    elements: IndexMap<ElementId, Element>,
}

impl fmt::Debug for Sketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sketch")
            .field("fonts", &self.fonts)
            .field("elements", &self.elements.len())
            .finish_non_exhaustive()
    }
}

impl Default for Sketch {
    /// A sketch with the built-in defaults, no mapped fonts, and random ids.
    fn default() -> Self {
        Self {
            defaults: DefaultsTable::builtin(),
            fonts: FontBook::default(),
            document: DocumentConfig::default(),
            ids: Box::new(RandomIdSource),
            elements: IndexMap::new(),
        }
    }
}

impl Sketch {
    /// Creates a sketch from `config`, measuring text with `cosmic-text`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrawlError::UnusedGlobalOverride`] for a sketch-wide
    /// override that no element kind uses.
    pub fn new(config: &SketchConfig) -> Result<Self, ScrawlError> {
        Self::with_metrics(config, CosmicTextMetrics::shared())
    }

    /// Creates a sketch from `config` that measures text with `metrics`.
    pub fn with_metrics(
        config: &SketchConfig,
        metrics: impl FontMetrics + 'static,
    ) -> Result<Self, ScrawlError> {
        let defaults = config.defaults_table()?;
        info!(
            fonts = config.fonts().len(),
            overrides = config.overrides().len();
            "Sketch created"
        );

        Ok(Self {
            defaults,
            fonts: config.font_book(metrics),
            document: config.document().clone(),
            ids: Box::new(RandomIdSource),
            elements: IndexMap::new(),
        })
    }

    /// Returns the sketch drawing ids and seeds from `ids`.
    pub fn with_id_source(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// The resolved default table of `kind`.
    pub fn defaults(&self, kind: ElementKind) -> &Attributes {
        self.defaults.get(kind)
    }

    pub fn document_config(&self) -> &DocumentConfig {
        &self.document
    }

    pub fn rectangle(
        &mut self,
        center: Point,
        size: Size,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        self.shape(ShapeKind::Rectangle, center, size, overrides)
    }

    pub fn ellipse(
        &mut self,
        center: Point,
        size: Size,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        self.shape(ShapeKind::Ellipse, center, size, overrides)
    }

    pub fn diamond(
        &mut self,
        center: Point,
        size: Size,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        self.shape(ShapeKind::Diamond, center, size, overrides)
    }

    /// Adds a shape of `kind` centered on `center`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrawlError::Element`] when `overrides` names a key the
    /// kind does not define.
    pub fn shape(
        &mut self,
        kind: ShapeKind,
        center: Point,
        size: Size,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        let shape = Shape::new(
            kind,
            self.defaults.get(kind.into()),
            self.ids.as_mut(),
            center,
            size,
            overrides,
        )?;
        Ok(self.insert(shape))
    }

    /// Adds a text element centered on `center`, sized by its measured extents.
    pub fn text(
        &mut self,
        content: impl Into<String>,
        center: Point,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        let text = Text::new(
            content,
            self.defaults.get(ElementKind::Text),
            self.ids.as_mut(),
            &self.fonts,
            center,
            overrides,
        )?;
        Ok(self.insert(text))
    }

    pub fn line(
        &mut self,
        start: Point,
        end: Point,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        self.connector(ConnectorKind::Line, start, end, overrides)
    }

    pub fn arrow(
        &mut self,
        start: Point,
        end: Point,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        self.connector(ConnectorKind::Arrow, start, end, overrides)
    }

    /// Adds an arrow with an arrowhead at both ends.
    ///
    /// An explicit `startArrowhead` in `overrides` wins.
    pub fn double_arrow(
        &mut self,
        start: Point,
        end: Point,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        let mut overrides = overrides.clone();
        if !overrides.contains_key("startArrowhead") {
            overrides.insert("startArrowhead", "arrow");
        }
        self.connector(ConnectorKind::Arrow, start, end, &overrides)
    }

    /// Adds a connector from `start` to `end`, both in absolute coordinates.
    pub fn connector(
        &mut self,
        kind: ConnectorKind,
        start: Point,
        end: Point,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        let connector = Connector::new(
            kind,
            self.defaults.get(kind.into()),
            self.ids.as_mut(),
            start,
            end,
            overrides,
        )?;
        Ok(self.insert(connector))
    }

    /// Adds `content` with a rectangle around it, grouped together.
    ///
    /// Returns the rectangle's id, the element other elements bind to.
    pub fn text_box(
        &mut self,
        content: impl Into<String>,
        center: Point,
        text_overrides: &Attributes,
        box_overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        let text = self.text(content, center, text_overrides)?;
        let rectangle =
            self.bounding_element(&text, ShapeKind::Rectangle, TEXT_BOX_PADDING, box_overrides)?;
        self.group(&[text, rectangle.clone()])?;
        Ok(rectangle)
    }

    /// Adds a header text stacked above a content text, both centered on
    /// `center` horizontally, inside one rectangle. The three are grouped.
    ///
    /// Returns the rectangle's id.
    pub fn header_content_box(
        &mut self,
        header: impl Into<String>,
        content: impl Into<String>,
        center: Point,
        header_overrides: &Attributes,
        content_overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        let header = self.text(header, center, header_overrides)?;
        let content = self.text(content, center, content_overrides)?;

        let header_size = self.get(&header)?.base().size();
        let content_size = self.get(&content)?.base().size();
        let total = header_size.height() + HEADER_GAP + content_size.height();
        let top = center.y() - total / 2.0;

        let header_center = Point::new(center.x(), top + header_size.height() / 2.0);
        let content_center = Point::new(
            center.x(),
            top + header_size.height() + HEADER_GAP + content_size.height() / 2.0,
        );
        self.recenter(&header, header_center)?;
        self.recenter(&content, content_center)?;

        let bounds = self
            .get(&header)?
            .base()
            .bounds()
            .merge(&self.get(&content)?.base().bounds());
        let rectangle = self.rectangle(
            bounds.center(),
            bounds.expand(TEXT_BOX_PADDING).to_size(),
            &Attributes::new(),
        )?;

        self.group(&[header, content, rectangle.clone()])?;
        Ok(rectangle)
    }

    /// Adds a shape of `kind` that encloses the bounding box of `inner`
    /// plus `padding` on every side.
    ///
    /// Ellipses and diamonds are scaled so that the padded box fits inside
    /// them, not only touches them.
    pub fn bounding_element(
        &mut self,
        inner: &ElementId,
        kind: ShapeKind,
        padding: f64,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        let bounds = self.get(inner)?.base().bounds().expand(padding);
        let size = enclosing_size(kind, bounds);
        let id = self.shape(kind, bounds.center(), size, overrides)?;
        debug!(inner:%, id:%, kind:?; "Added bounding element");
        Ok(id)
    }

    /// Binds the start of `connector` to `target`.
    pub fn bind_start(
        &mut self,
        connector: &ElementId,
        target: &ElementId,
        gap: f64,
    ) -> Result<(), ScrawlError> {
        self.bind(connector, BindingEnd::Start, target, gap)
    }

    /// Binds the end of `connector` to `target`.
    pub fn bind_end(
        &mut self,
        connector: &ElementId,
        target: &ElementId,
        gap: f64,
    ) -> Result<(), ScrawlError> {
        self.bind(connector, BindingEnd::End, target, gap)
    }

    /// Binds `end` of `connector` to `target`, recording the binding on both
    /// elements.
    ///
    /// # Errors
    ///
    /// - [`ScrawlError::UnknownElement`] if either id is not in the sketch.
    /// - [`ScrawlError::NotAConnector`] if `connector` is not a line or arrow.
    pub fn bind(
        &mut self,
        connector: &ElementId,
        end: BindingEnd,
        target: &ElementId,
        gap: f64,
    ) -> Result<(), ScrawlError> {
        let connector_kind = self
            .get(connector)?
            .as_connector()
            .map(Primitive::kind)
            .ok_or_else(|| ScrawlError::NotAConnector(connector.clone()))?;
        self.get(target)?;

        let target_base = self.get_mut(target)?.base_mut();
        target_base.push_bound_element(connector, connector_kind);

        let binding = Binding::new(target.clone(), gap);
        if let Some(line) = self.get_mut(connector)?.as_connector_mut() {
            line.attach(end, &binding);
        }
        debug!(connector:%, target:%, end:?, gap; "Bound connector");
        Ok(())
    }

    /// Adds a connector between two elements and binds both of its ends.
    ///
    /// Each end is anchored on the edge of its element that faces the other
    /// element's center.
    pub fn binding_arrow(
        &mut self,
        from: &ElementId,
        to: &ElementId,
        style: ConnectorStyle,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        let from_element = self.get(from)?;
        let to_element = self.get(to)?;

        let from_center = from_element.center();
        let to_center = to_element.center();
        let start = from_element.edge_midpoint(from_center.angle_to(to_center), DEFAULT_EDGE_PADDING);
        let end = to_element.edge_midpoint(to_center.angle_to(from_center), DEFAULT_EDGE_PADDING);
        trace!(from:%, to:%, start:?, end:?; "Anchored binding arrow");

        let id = match style {
            ConnectorStyle::Line => self.line(start, end, overrides)?,
            ConnectorStyle::Arrow => self.arrow(start, end, overrides)?,
            ConnectorStyle::DoubleArrow => self.double_arrow(start, end, overrides)?,
        };

        self.bind_start(&id, from, DEFAULT_BINDING_GAP)?;
        self.bind_end(&id, to, DEFAULT_BINDING_GAP)?;
        Ok(id)
    }

    /// Puts every element of `ids` into a fresh group.
    ///
    /// The group id is appended to each element's group list, so earlier
    /// (inner) groups come first.
    ///
    /// # Errors
    ///
    /// Returns [`ScrawlError::UnknownElement`] before changing anything if an
    /// id is not in the sketch.
    pub fn group(&mut self, ids: &[ElementId]) -> Result<GroupId, ScrawlError> {
        for id in ids {
            self.get(id)?;
        }

        let group = self.ids.next_group_id();
        for id in ids {
            self.get_mut(id)?.base_mut().push_group(group.clone());
        }
        debug!(group:%, members = ids.len(); "Grouped elements");
        Ok(group)
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Every element, in creation order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Builds the drawing document of every element, in creation order.
    pub fn to_document(&self) -> Document {
        Document::new(&self.document, self.elements().map(Primitive::export))
    }

    /// The drawing document as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ScrawlError> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Writes the drawing document to `path`.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<(), ScrawlError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?)?;
        info!(path = path.display().to_string(), elements = self.len(); "Sketch written");
        Ok(())
    }

    fn insert(&mut self, element: impl Into<Element>) -> ElementId {
        let element = element.into();
        let id = element.id().clone();
        debug!(id:%, kind:% = element.kind(); "Added element");
        self.elements.insert(id.clone(), element);
        id
    }

    fn get(&self, id: &ElementId) -> Result<&Element, ScrawlError> {
        self.elements
            .get(id)
            .ok_or_else(|| ScrawlError::UnknownElement(id.clone()))
    }

    fn get_mut(&mut self, id: &ElementId) -> Result<&mut Element, ScrawlError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| ScrawlError::UnknownElement(id.clone()))
    }

    /// Moves an element so that its center is `center`.
    fn recenter(&mut self, id: &ElementId, center: Point) -> Result<(), ScrawlError> {
        let base = self.get_mut(id)?.base_mut();
        let position = center.sub_point(base.size().half());
        base.set_position(position);
        Ok(())
    }
}

/// The size of a `kind` shape centered on `bounds` whose outline passes
/// through (or around) its corners.
fn enclosing_size(kind: ShapeKind, bounds: Bounds) -> Size {
    let size = bounds.to_size();
    let scale = match kind {
        ShapeKind::Rectangle => 1.0,
        ShapeKind::Ellipse => SQRT_2,
        ShapeKind::Diamond => 2.0,
    };
    Size::new(size.width() * scale, size.height() * scale)
}


#[cfg(test)]
mod proptest_tests {
    use std::path::Path;

    use proptest::prelude::*;
    use serde_json::{Value, json};

    use scrawl_core::font::{FontError, TextExtents};

    use super::*;

    struct HalfEm;

    impl FontMetrics for HalfEm {
        fn measure(&self, _: &Path, size: f64, text: &str) -> Result<TextExtents, FontError> {
            let width = text.chars().count() as f64 * size / 2.0;
            Ok(TextExtents::new(0.0, 0.0, width, size))
        }
    }

    fn override_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            (1i64..1000).prop_map(Value::from),
            "[a-z#0-9]{1,12}".prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
        ]
    }

    fn add(
        sketch: &mut Sketch,
        kind: ElementKind,
        overrides: &Attributes,
    ) -> Result<ElementId, ScrawlError> {
        let center = Point::new(10.0, -20.0);
        let size = Size::new(40.0, 30.0);
        let end = Point::default();
        match kind {
            ElementKind::Rectangle => sketch.shape(ShapeKind::Rectangle, center, size, overrides),
            ElementKind::Ellipse => sketch.shape(ShapeKind::Ellipse, center, size, overrides),
            ElementKind::Diamond => sketch.shape(ShapeKind::Diamond, center, size, overrides),
            ElementKind::Text => sketch.text("label", center, overrides),
            ElementKind::Line => sketch.connector(ConnectorKind::Line, center, end, overrides),
            ElementKind::Arrow => sketch.connector(ConnectorKind::Arrow, center, end, overrides),
        }
    }

    /// Any key of a kind's built-in table, once overridden, is written as given.
    fn check_schema_override_is_exported(
        kind: ElementKind,
        key_index: usize,
        value: Value,
    ) -> Result<(), TestCaseError> {
        let defaults = DefaultsTable::builtin();
        let keys: Vec<&str> = defaults.get(kind).keys().collect();
        let key = keys[key_index % keys.len()];

        // Text is measured, so its font must stay resolvable.
        let value = match key {
            "fontFamily" => json!(1),
            "fontSize" => json!(value.as_i64().unwrap_or(20)),
            _ => value,
        };

        let config = SketchConfig::default().with_font("1", "Virgil.woff2");
        let mut sketch = Sketch::with_metrics(&config, HalfEm)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let overrides = Attributes::new().with(key, value.clone());
        let id = add(&mut sketch, kind, &overrides)
            .map_err(|err| TestCaseError::fail(err.to_string()))?;

        let record = sketch
            .element(&id)
            .ok_or_else(|| TestCaseError::fail("element was not stored"))?
            .export();
        prop_assert_eq!(record.get(key), Some(&value));
        prop_assert_eq!(defaults.get(kind), sketch.defaults(kind));
        Ok(())
    }

    proptest! {
        #[test]
        fn schema_override_is_exported(
            kind in proptest::sample::select(ElementKind::ALL.to_vec()),
            key_index in 0usize..64,
            value in override_strategy(),
        ) {
            check_schema_override_is_exported(kind, key_index, value)?;
        }
    }
}
