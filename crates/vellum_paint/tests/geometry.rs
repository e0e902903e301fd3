//! Integration tests for path geometry
//!
//! These tests verify that:
//! - The Empty → Building → Closed state machine rejects misuse
//! - Fill hit-testing follows the even-odd rule over all figures
//! - Stroke hit-testing honors width, caps, dashes and open figures

use vellum_core::{
    ArcSegment, ArcSize, BezierSegment, CapStyle, DashStyle, Ellipse, Point, Rect, Size,
    SweepDirection,
};
use vellum_paint::{
    DeviceResource, GeometryState, GeometryStateError, InvalidReason, PaintError, PathGeometry,
    PathSegment, RecordingBackend, ResourceDevice, StrokeOptions,
};

fn device() -> ResourceDevice {
    ResourceDevice::new(RecordingBackend::new())
}

fn unit_square(device: &ResourceDevice) -> PathGeometry {
    let mut path = device.create_path_geometry().unwrap();
    path.set_start_point(Point::new(0.0, 0.0)).unwrap();
    path.add_lines(&[
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ])
    .unwrap();
    path.close_path().unwrap();
    path
}

#[test]
fn test_state_transitions() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();
    assert_eq!(path.state(), GeometryState::Empty);

    path.set_start_point(Point::new(0.0, 0.0)).unwrap();
    assert_eq!(path.state(), GeometryState::Building);

    path.add_line(Point::new(1.0, 0.0)).unwrap();
    path.close_path().unwrap();
    assert_eq!(path.state(), GeometryState::Closed);
    assert!(path.is_closed());
}

#[test]
fn test_segments_before_start_point_fail() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();

    assert_eq!(
        path.add_line(Point::new(1.0, 1.0)),
        Err(PaintError::Geometry(GeometryStateError::NotStarted))
    );
    assert_eq!(
        path.add_beziers(&[BezierSegment::default()]),
        Err(PaintError::Geometry(GeometryStateError::NotStarted))
    );
}

#[test]
fn test_appends_after_close_fail() {
    let device = device();
    let mut path = unit_square(&device);
    let closed = Err(PaintError::Geometry(GeometryStateError::Closed));

    assert_eq!(path.add_lines(&[Point::new(2.0, 2.0)]), closed);
    assert_eq!(
        path.add_beziers(&[BezierSegment::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        )]),
        closed
    );
    assert_eq!(
        path.add_arc(ArcSegment::new(Point::new(3.0, 3.0), Size::new(1.0, 1.0), 0.0)),
        closed
    );
    assert_eq!(path.set_start_point(Point::new(5.0, 5.0)), closed);
}

#[test]
fn test_close_twice_fails() {
    let device = device();
    let mut path = unit_square(&device);

    assert_eq!(
        path.close_path(),
        Err(PaintError::Geometry(GeometryStateError::AlreadyClosed))
    );
    assert_eq!(
        path.close_path_open(),
        Err(PaintError::Geometry(GeometryStateError::AlreadyClosed))
    );
}

#[test]
fn test_queries_require_closed_geometry() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();
    path.set_start_point(Point::new(0.0, 0.0)).unwrap();
    path.add_line(Point::new(1.0, 0.0)).unwrap();

    let not_closed = Err(PaintError::Geometry(GeometryStateError::NotClosed));
    assert_eq!(path.fill_contains_point(Point::new(0.5, 0.0)), not_closed);
    assert_eq!(
        path.stroke_contains_point(Point::new(0.5, 0.0), 1.0, DashStyle::Solid),
        not_closed
    );
}

#[test]
fn test_unit_square_fill_contains() {
    let device = device();
    let path = unit_square(&device);

    assert_eq!(path.fill_contains_point(Point::new(0.5, 0.5)), Ok(true));
    assert_eq!(path.fill_contains_point(Point::new(50.0, 50.0)), Ok(false));
    assert_eq!(path.fill_contains_point(Point::new(-0.5, 0.5)), Ok(false));
}

#[test]
fn test_start_point_redefined_before_segments() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();
    path.set_start_point(Point::new(0.0, 0.0)).unwrap();
    path.set_start_point(Point::new(5.0, 5.0)).unwrap();
    path.add_line(Point::new(6.0, 5.0)).unwrap();
    path.close_path_open().unwrap();

    let data = path.data().unwrap();
    assert_eq!(data.figures().len(), 1);
    assert_eq!(data.figures()[0].start, Point::new(5.0, 5.0));
    assert!(!data.figures()[0].closed);
}

#[test]
fn test_quadratic_is_elevated_to_cubic() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();
    path.set_start_point(Point::new(0.0, 0.0)).unwrap();
    path.add_quadratic(Point::new(3.0, 3.0), Point::new(6.0, 0.0))
        .unwrap();
    path.close_path().unwrap();

    let data = path.data().unwrap();
    match data.figures()[0].segments[0] {
        PathSegment::Bezier(b) => {
            assert_eq!(b.end, Point::new(6.0, 0.0));
            assert!((b.control1.x - 2.0).abs() < 1e-5);
            assert!((b.control1.y - 2.0).abs() < 1e-5);
            assert!((b.control2.x - 4.0).abs() < 1e-5);
        }
        other => panic!("expected a cubic, got {:?}", other),
    }
}

#[test]
fn test_even_odd_hole() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();

    path.set_start_point(Point::new(0.0, 0.0)).unwrap();
    path.add_lines(&[
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ])
    .unwrap();
    path.close_figure().unwrap();

    // Segments after close_figure need a fresh start point
    assert_eq!(
        path.add_line(Point::new(1.0, 1.0)),
        Err(PaintError::Geometry(GeometryStateError::NotStarted))
    );

    path.set_start_point(Point::new(3.0, 3.0)).unwrap();
    path.add_lines(&[
        Point::new(7.0, 3.0),
        Point::new(7.0, 7.0),
        Point::new(3.0, 7.0),
    ])
    .unwrap();
    path.close_path().unwrap();

    assert_eq!(path.data().unwrap().figures().len(), 2);
    assert_eq!(path.fill_contains_point(Point::new(1.0, 1.0)), Ok(true));
    assert_eq!(path.fill_contains_point(Point::new(5.0, 5.0)), Ok(false));
}

#[test]
fn test_stroke_width_and_flat_caps() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();
    path.set_start_point(Point::new(0.0, 0.0)).unwrap();
    path.add_line(Point::new(10.0, 0.0)).unwrap();
    path.close_path_open().unwrap();

    assert_eq!(
        path.stroke_contains_point(Point::new(5.0, 0.4), 1.0, DashStyle::Solid),
        Ok(true)
    );
    assert_eq!(
        path.stroke_contains_point(Point::new(5.0, 2.0), 1.0, DashStyle::Solid),
        Ok(false)
    );
    assert_eq!(
        path.stroke_contains_point(Point::new(5.0, 2.0), 5.0, DashStyle::Solid),
        Ok(true)
    );
    // Flat caps end exactly at the end point
    assert_eq!(
        path.stroke_contains_point(Point::new(10.3, 0.0), 1.0, DashStyle::Solid),
        Ok(false)
    );

    let round = StrokeOptions::new(1.0).with_caps(CapStyle::Round, CapStyle::Round);
    assert_eq!(
        path.stroke_contains_point_with(Point::new(10.3, 0.0), &round),
        Ok(true)
    );
    let square = StrokeOptions::new(1.0).with_caps(CapStyle::Square, CapStyle::Square);
    assert_eq!(
        path.stroke_contains_point_with(Point::new(-0.45, 0.45), &square),
        Ok(true)
    );
}

#[test]
fn test_open_figure_does_not_stroke_closing_edge() {
    let device = device();
    let build = |open: bool| {
        let mut path = device.create_path_geometry().unwrap();
        path.set_start_point(Point::new(0.0, 0.0)).unwrap();
        path.add_lines(&[Point::new(10.0, 0.0), Point::new(10.0, 10.0)])
            .unwrap();
        if open {
            path.close_path_open().unwrap();
        } else {
            path.close_path().unwrap();
        }
        path
    };

    let open = build(true);
    let closed = build(false);
    let on_hypotenuse = Point::new(5.0, 5.0);

    assert_eq!(
        open.stroke_contains_point(on_hypotenuse, 1.0, DashStyle::Solid),
        Ok(false)
    );
    assert_eq!(
        closed.stroke_contains_point(on_hypotenuse, 1.0, DashStyle::Solid),
        Ok(true)
    );

    // Filling treats both as closed
    assert_eq!(open.fill_contains_point(Point::new(8.0, 2.0)), Ok(true));
    assert_eq!(closed.fill_contains_point(Point::new(8.0, 2.0)), Ok(true));
}

#[test]
fn test_dashed_stroke_gaps() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();
    path.set_start_point(Point::new(0.0, 0.0)).unwrap();
    path.add_line(Point::new(100.0, 0.0)).unwrap();
    path.close_path_open().unwrap();

    // Dash is [2, 2] times the width; round dash caps reach half a width past each dash
    assert_eq!(
        path.stroke_contains_point(Point::new(1.0, 0.0), 1.0, DashStyle::Dash),
        Ok(true)
    );
    assert_eq!(
        path.stroke_contains_point(Point::new(3.0, 0.0), 1.0, DashStyle::Dash),
        Ok(false)
    );
    assert_eq!(
        path.stroke_contains_point(Point::new(5.0, 0.0), 1.0, DashStyle::Dash),
        Ok(true)
    );
    assert_eq!(
        path.stroke_contains_point(Point::new(3.0, 0.0), 1.0, DashStyle::Solid),
        Ok(true)
    );
}

#[test]
fn test_stroke_style_dashes() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();
    path.set_start_point(Point::new(0.0, 0.0)).unwrap();
    path.add_line(Point::new(100.0, 0.0)).unwrap();
    path.close_path_open().unwrap();

    // 4 on, 6 off at width 1
    let style = device
        .create_stroke_style(Some(&[4.0, 6.0]), 0.0, CapStyle::Flat, CapStyle::Flat)
        .unwrap();
    assert_eq!(
        path.stroke_contains_point_styled(Point::new(2.0, 0.0), 1.0, &style),
        Ok(true)
    );
    assert_eq!(
        path.stroke_contains_point_styled(Point::new(7.0, 0.0), 1.0, &style),
        Ok(false)
    );
    assert_eq!(
        path.stroke_contains_point_styled(Point::new(12.0, 0.0), 1.0, &style),
        Ok(true)
    );
}

#[test]
fn test_zero_width_dashed_stroke_is_solid() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();
    path.set_start_point(Point::new(0.0, 0.0)).unwrap();
    path.add_line(Point::new(100.0, 0.0)).unwrap();
    path.close_path_open().unwrap();

    let style = device
        .create_stroke_style(Some(&[4.0, 6.0]), 0.0, CapStyle::Flat, CapStyle::Flat)
        .unwrap();
    // 7 falls in a gap at width 1; with no width there is no gap
    assert_eq!(
        path.stroke_contains_point_styled(Point::new(7.0, 0.0), 0.0, &style),
        Ok(true)
    );
    assert_eq!(
        path.stroke_contains_point_styled(Point::new(7.0, 0.5), 0.0, &style),
        Ok(false)
    );
}

#[test]
fn test_arc_figure_hit_testing() {
    let device = device();
    let mut path = device.create_path_geometry().unwrap();
    path.set_start_point(Point::new(0.0, 10.0)).unwrap();
    path.add_arc(
        ArcSegment::new(Point::new(20.0, 10.0), Size::new(10.0, 10.0), 0.0)
            .with_arc_size(ArcSize::Small)
            .with_sweep(SweepDirection::Clockwise),
    )
    .unwrap();
    path.close_path().unwrap();

    // Clockwise in y-down coordinates bulges upward from left to right
    assert_eq!(path.fill_contains_point(Point::new(10.0, 5.0)), Ok(true));
    assert_eq!(path.fill_contains_point(Point::new(10.0, 15.0)), Ok(false));
    assert_eq!(
        path.stroke_contains_point(Point::new(10.0, 0.0), 1.0, DashStyle::Solid),
        Ok(true)
    );
}

#[test]
fn test_prebuilt_geometries() {
    let device = device();
    let rect = device
        .create_rectangle_geometry(Rect::new(10.0, 10.0, 20.0, 10.0))
        .unwrap();
    let circle = device
        .create_ellipse_geometry(Ellipse::circle(Point::new(50.0, 50.0), 10.0))
        .unwrap();

    assert!(rect.is_closed());
    assert_eq!(rect.fill_contains_point(Point::new(20.0, 15.0)), Ok(true));
    assert_eq!(rect.fill_contains_point(Point::new(35.0, 15.0)), Ok(false));

    assert!(circle.is_closed());
    assert_eq!(circle.fill_contains_point(Point::new(50.0, 50.0)), Ok(true));
    assert_eq!(circle.fill_contains_point(Point::new(58.0, 58.0)), Ok(false));
    assert_eq!(
        circle.stroke_contains_point(Point::new(60.0, 50.0), 1.0, DashStyle::Solid),
        Ok(true)
    );
    assert_eq!(
        circle.stroke_contains_point(Point::new(50.0, 50.0), 1.0, DashStyle::Solid),
        Ok(false)
    );
}

#[test]
fn test_released_geometry_is_invalid() {
    let device = device();
    let mut path = unit_square(&device);
    path.release();
    path.release();

    assert_eq!(
        path.fill_contains_point(Point::new(0.5, 0.5)),
        Err(PaintError::ResourceInvalid(InvalidReason::Released))
    );
    assert_eq!(
        path.data(),
        Err(PaintError::ResourceInvalid(InvalidReason::Released))
    );
}
