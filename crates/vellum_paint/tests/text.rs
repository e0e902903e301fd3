//! Integration tests for text drawing and measurement
//!
//! These tests verify that:
//! - Measurement and outline geometry require a text shaper
//! - Measurement follows the device DPI and the layout constraint
//! - Stroked text fills before it strokes and restores the transform

use vellum_core::{
    Affine2D, Color, Dpi, FontDescriptor, OutlineSink, ParagraphAlignment, Point, Rect,
    ShapingError, Size, TextAlignment, TextShaper,
};
use vellum_paint::{
    DrawCommand, Fill, Outline, PaintError, RecordingBackend, ResourceDevice, Stroke,
};

/// Every character is a box half as wide as the font size with a one-unit gap
struct BoxShaper;

impl BoxShaper {
    fn advance(font: &FontDescriptor) -> f32 {
        font.size * 0.5 + 1.0
    }
}

impl TextShaper for BoxShaper {
    fn measure(
        &self,
        text: &str,
        font: &FontDescriptor,
        constraint: Size,
        dpi: Dpi,
    ) -> Result<Size, ShapingError> {
        if text.is_empty() {
            return Ok(Size::ZERO);
        }
        let (sx, sy) = dpi.scale_factor();
        let width = text.chars().count() as f32 * Self::advance(font) * sx;
        Ok(Size::new(
            width.min(constraint.width),
            (font.size * sy).min(constraint.height),
        ))
    }

    fn outline(
        &self,
        text: &str,
        font: &FontDescriptor,
        sink: &mut dyn OutlineSink,
    ) -> Result<(), ShapingError> {
        if text.contains('\u{fffd}') {
            return Err(ShapingError("no glyph".into()));
        }
        let glyph_width = font.size * 0.5;
        for (i, _) in text.chars().enumerate() {
            let x = i as f32 * Self::advance(font);
            sink.move_to(Point::new(x, 0.0));
            sink.line_to(Point::new(x + glyph_width, 0.0));
            sink.line_to(Point::new(x + glyph_width, font.size));
            sink.line_to(Point::new(x, font.size));
            sink.close();
        }
        Ok(())
    }
}

fn shaped_device() -> (ResourceDevice, vellum_paint::CallLog) {
    let backend = RecordingBackend::new();
    let log = backend.log();
    let device = ResourceDevice::builder(backend)
        .text_shaper(BoxShaper)
        .build()
        .unwrap();
    (device, log)
}

fn font() -> FontDescriptor {
    FontDescriptor::new("Box", 10.0)
}

#[test]
fn test_measure_without_shaper_fails() {
    let device = ResourceDevice::new(RecordingBackend::new());
    let session = device.session();

    assert!(!device.has_text_shaper());
    assert_eq!(
        session.measure_text("hi", &font(), Size::new(100.0, 100.0)),
        Err(PaintError::MissingTextShaper)
    );
    assert_eq!(
        device.create_text_path_geometry("hi", &font()).err(),
        Some(PaintError::MissingTextShaper)
    );
}

#[test]
fn test_measure_text_variants_agree() {
    let (device, _log) = shaped_device();
    let session = device.session();
    let constraint = Size::new(1000.0, 1000.0);

    let format = device
        .create_text_format(font(), TextAlignment::Leading, ParagraphAlignment::Near)
        .unwrap();
    let layout = device.create_text_layout("abc", &format, constraint).unwrap();

    let plain = session.measure_text("abc", &font(), constraint).unwrap();
    assert_eq!(plain, Size::new(18.0, 10.0));
    assert_eq!(
        session.measure_text_with_format("abc", &format, constraint),
        Ok(plain)
    );
    assert_eq!(session.measure_text_layout(&layout), Ok(plain));

    // Measuring needs no open bracket
    assert!(!session.is_open());
}

#[test]
fn test_measure_empty_text_is_zero() {
    let (device, _log) = shaped_device();
    let session = device.session();

    assert_eq!(
        session.measure_text("", &font(), Size::new(50.0, 50.0)),
        Ok(Size::ZERO)
    );
}

#[test]
fn test_measure_follows_device_dpi() {
    let (device, _log) = shaped_device();
    let session = device.session();
    let constraint = Size::new(1000.0, 1000.0);

    device.set_dpi(Dpi::new(192.0, 192.0)).unwrap();
    assert_eq!(
        session.measure_text("ab", &font(), constraint),
        Ok(Size::new(24.0, 20.0))
    );

    // The constraint caps the result
    assert_eq!(
        session.measure_text("ab", &font(), Size::new(10.0, 5.0)),
        Ok(Size::new(10.0, 5.0))
    );
}

#[test]
fn test_text_path_geometry_outlines_each_glyph() {
    let (device, _log) = shaped_device();
    let path = device.create_text_path_geometry("ab", &font()).unwrap();

    assert!(path.is_closed());
    assert_eq!(path.data().unwrap().figures().len(), 2);
    assert_eq!(path.fill_contains_point(Point::new(2.5, 5.0)), Ok(true));
    assert_eq!(path.fill_contains_point(Point::new(5.5, 5.0)), Ok(false));
    assert_eq!(path.fill_contains_point(Point::new(8.5, 5.0)), Ok(true));
}

#[test]
fn test_shaping_errors_propagate() {
    let (device, _log) = shaped_device();

    assert_eq!(
        device.create_text_path_geometry("\u{fffd}", &font()).err(),
        Some(PaintError::Shaping(ShapingError("no glyph".into())))
    );
    assert_eq!(device.resource_count(), 0);
}

#[test]
fn test_stroked_text_fills_then_strokes() {
    let (device, log) = shaped_device();
    let mut session = device.session();

    session.begin_render().unwrap();
    session
        .draw_stroked_text(
            "a",
            Point::new(10.0, 20.0),
            Color::BLACK,
            2.0,
            Color::WHITE,
            &font(),
        )
        .unwrap();
    assert!(session.transform().is_identity());
    session.end_render().unwrap();

    let commands = log.commands();
    assert_eq!(commands.len(), 4);

    match &commands[0] {
        DrawCommand::SetTransform(t) => {
            assert!(t.approx_eq(&Affine2D::translation(10.0, 20.0), 1e-5))
        }
        other => panic!("expected set_transform, got {:?}", other),
    }
    match &commands[1] {
        DrawCommand::Path {
            fill: Some(Fill::Color(color)),
            stroke: None,
            ..
        } => assert_eq!(*color, Color::WHITE),
        other => panic!("expected a filled path, got {:?}", other),
    }
    match &commands[2] {
        DrawCommand::Path {
            fill: None,
            stroke: Some(Stroke {
                paint: Outline::Color(color),
                options,
                ..
            }),
            ..
        } => {
            assert_eq!(*color, Color::BLACK);
            assert_eq!(options.width, 2.0);
        }
        other => panic!("expected a stroked path, got {:?}", other),
    }
    assert_eq!(commands[3], DrawCommand::SetTransform(Affine2D::IDENTITY));
}

#[test]
fn test_stroked_text_keeps_existing_transform() {
    let (device, log) = shaped_device();
    let mut session = device.session();

    session.begin_render().unwrap();
    session.scale_transform(2.0, 2.0).unwrap();
    let before = session.transform();
    session
        .draw_stroked_text("a", Point::ZERO, Color::BLACK, 1.0, Color::WHITE, &font())
        .unwrap();

    assert_eq!(session.transform(), before);
    assert_eq!(
        log.commands().last(),
        Some(&DrawCommand::SetTransform(before))
    );
    session.end_render().unwrap();
}

#[test]
fn test_text_commands_carry_font_and_rect() {
    let (device, log) = shaped_device();
    let mut session = device.session();
    let rect = Rect::new(0.0, 0.0, 200.0, 40.0);

    session.begin_render().unwrap();
    session.draw_text_centered("title", Color::BLACK, &font(), rect).unwrap();
    session.end_render().unwrap();

    match &log.commands()[0] {
        DrawCommand::Text {
            text,
            font: used,
            rect: drawn,
            options,
            ..
        } => {
            assert_eq!(text, "title");
            assert_eq!(used, &font());
            assert_eq!(*drawn, rect);
            assert_eq!(options.alignment, TextAlignment::Center);
            assert_eq!(options.paragraph, ParagraphAlignment::Center);
        }
        other => panic!("expected text, got {:?}", other),
    }
}
