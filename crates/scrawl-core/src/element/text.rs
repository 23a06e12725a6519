use log::debug;
use serde_json::Value;

use crate::{
    attributes::Attributes,
    element::{DEFAULT_SIZE, ElementBase, ElementKind, Primitive},
    error::ElementError,
    export::ExportRecord,
    font::{FontBook, FontError, family_key},
    geometry::{Point, Size},
    identifier::IdSource,
};

/// Attribute selecting the font family of a text element.
pub const FONT_FAMILY: &str = "fontFamily";

/// Attribute holding the font size, in pixels, of a text element.
pub const FONT_SIZE: &str = "fontSize";

/// A text label sized by its rendered extents.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    base: ElementBase,
    content: String,
}

impl Text {
    /// Creates a text element centered on `center`.
    ///
    /// The width and height are measured once, here, from `content` rendered
    /// in the resolved `fontFamily` at the resolved `fontSize`. Changing those
    /// attributes afterwards does not resize the element.
    ///
    /// # Errors
    ///
    /// - [`ElementError::UnrecognizedAttribute`] for override keys missing from `defaults`.
    /// - [`ElementError::UnmeasurableText`] if the family has no font file in
    ///   `fonts`, the file cannot be loaded, or the size attributes are missing.
    pub fn new(
        content: impl Into<String>,
        defaults: &Attributes,
        ids: &mut dyn IdSource,
        fonts: &FontBook,
        center: Point,
        overrides: &Attributes,
    ) -> Result<Self, ElementError> {
        let content = content.into();
        let mut base = ElementBase::new(
            ElementKind::Text,
            defaults,
            ids,
            center,
            Size::new(DEFAULT_SIZE, DEFAULT_SIZE),
            overrides,
        )?;

        let family = base
            .attributes()
            .get(FONT_FAMILY)
            .cloned()
            .unwrap_or(Value::Null);
        let unmeasurable = |source: FontError| ElementError::UnmeasurableText {
            family: family_key(&family),
            source,
        };
        let font_size = base
            .attributes()
            .get(FONT_SIZE)
            .and_then(Value::as_f64)
            .ok_or_else(|| unmeasurable(FontError::MissingSize))?;
        let extents = fonts
            .measure(&family, font_size, &content)
            .map_err(unmeasurable)?;

        let size = Size::new(extents.width(), extents.height());
        base.set_size(size);
        base.set_position(center.sub_point(size.half()));
        debug!(id:% = base.id(), width = size.width(), height = size.height(); "Measured text");

        Ok(Self { base, content })
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Primitive for Text {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }

    fn export(&self) -> ExportRecord {
        let mut record = self.base.export();
        record.insert("text", self.content.as_str());
        record
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use super::*;
    use crate::{
        font::{FontMetrics, TextExtents},
        identifier::SequentialIdSource,
    };

    /// Every character is `size / 2` wide; the box is offset to exercise left/top.
    struct HalfEm;

    impl FontMetrics for HalfEm {
        fn measure(&self, _: &Path, size: f64, text: &str) -> Result<TextExtents, FontError> {
            let width = text.chars().count() as f64 * size / 2.0;
            Ok(TextExtents::new(2.0, 3.0, 2.0 + width, 3.0 + size))
        }
    }

    fn defaults() -> Attributes {
        Attributes::new()
            .with(FONT_SIZE, 20)
            .with(FONT_FAMILY, 1)
            .with("strokeColor", "#1e1e1e")
    }

    fn fonts() -> FontBook {
        FontBook::new(HalfEm).with_family("1", "Virgil.woff2")
    }

    #[test]
    fn test_text_is_sized_from_extents_and_centered() {
        let text = Text::new(
            "Start Here",
            &defaults(),
            &mut SequentialIdSource::new("t", 0),
            &fonts(),
            Point::new(0.0, 150.0),
            &Attributes::new(),
        )
        .unwrap();

        assert_eq!(text.base().size(), Size::new(100.0, 20.0));
        assert_eq!(text.base().position(), Point::new(-50.0, 140.0));
        assert_eq!(text.center(), Point::new(0.0, 150.0));
    }

    #[test]
    fn test_text_size_follows_font_size_override() {
        let text = Text::new(
            "abcd",
            &defaults(),
            &mut SequentialIdSource::new("t", 0),
            &fonts(),
            Point::new(0.0, 0.0),
            &Attributes::new().with(FONT_SIZE, 40),
        )
        .unwrap();
        assert_eq!(text.base().size(), Size::new(80.0, 40.0));
    }

    #[test]
    fn test_text_size_is_deterministic() {
        let fonts = fonts();
        let mut ids = SequentialIdSource::new("t", 0);
        let mut build = || {
            Text::new(
                "Repeat",
                &defaults(),
                &mut ids,
                &fonts,
                Point::new(10.0, 10.0),
                &Attributes::new(),
            )
            .unwrap()
        };
        let first = build();
        let second = build();
        assert_eq!(first.base().size(), second.base().size());
        assert_eq!(first.base().position(), second.base().position());
    }

    #[test]
    fn test_text_export_adds_text_field() {
        let text = Text::new(
            "Header",
            &defaults(),
            &mut SequentialIdSource::new("t", 0),
            &fonts(),
            Point::default(),
            &Attributes::new(),
        )
        .unwrap();
        let record = text.export();
        assert_eq!(record.get("type"), Some(&json!("text")));
        assert_eq!(record.get("text"), Some(&json!("Header")));
        assert_eq!(record.get(FONT_FAMILY), Some(&json!(1)));
    }

    #[test]
    fn test_later_font_change_does_not_resize() {
        let mut text = Text::new(
            "abc",
            &defaults(),
            &mut SequentialIdSource::new("t", 0),
            &fonts(),
            Point::default(),
            &Attributes::new(),
        )
        .unwrap();
        let before = text.base().size();
        text.base_mut().attributes_mut().insert(FONT_SIZE, 100);
        assert_eq!(text.base().size(), before);
    }

    #[test]
    fn test_unmapped_family_is_unmeasurable() {
        let err = Text::new(
            "abc",
            &defaults(),
            &mut SequentialIdSource::new("t", 0),
            &fonts(),
            Point::default(),
            &Attributes::new().with(FONT_FAMILY, 3),
        )
        .unwrap_err();

        match err {
            ElementError::UnmeasurableText { family, source } => {
                assert_eq!(family, "3");
                assert!(matches!(source, FontError::UnmappedFamily(_)));
            }
            other => panic!("Expected UnmeasurableText, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_key_is_reported_before_measuring() {
        let err = Text::new(
            "abc",
            &defaults(),
            &mut SequentialIdSource::new("t", 0),
            &FontBook::new(HalfEm),
            Point::default(),
            &Attributes::new().with("points", json!([])),
        )
        .unwrap_err();
        assert!(matches!(err, ElementError::UnrecognizedAttribute { .. }));
    }

    #[test]
    fn test_unreadable_font_file_is_unmeasurable() {
        let fonts = FontBook::new(crate::font::CosmicTextMetrics::new())
            .with_family("1", "/no/such/font.ttf");
        let err = Text::new(
            "abc",
            &defaults(),
            &mut SequentialIdSource::new("t", 0),
            &fonts,
            Point::default(),
            &Attributes::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ElementError::UnmeasurableText {
                source: FontError::Read { .. },
                ..
            }
        ));
    }
}
