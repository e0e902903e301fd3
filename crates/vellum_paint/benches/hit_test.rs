//! Hit-testing throughput on closed path geometry
//!
//! Run with: cargo bench -p vellum_paint

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vellum_core::{BezierSegment, DashStyle, Ellipse, Point};
use vellum_paint::{PathGeometry, RecordingBackend, ResourceDevice};

fn wavy_path(device: &ResourceDevice, waves: usize) -> PathGeometry {
    let mut path = device.create_path_geometry().unwrap();
    path.set_start_point(Point::new(0.0, 50.0)).unwrap();
    for i in 0..waves {
        let x = i as f32 * 20.0;
        path.add_bezier(BezierSegment::new(
            Point::new(x + 5.0, 0.0),
            Point::new(x + 15.0, 100.0),
            Point::new(x + 20.0, 50.0),
        ))
        .unwrap();
    }
    path.add_line(Point::new(waves as f32 * 20.0, 120.0)).unwrap();
    path.add_line(Point::new(0.0, 120.0)).unwrap();
    path.close_path().unwrap();
    path
}

fn bench_fill(c: &mut Criterion) {
    let device = ResourceDevice::new(RecordingBackend::new());
    let mut group = c.benchmark_group("fill_contains_point");

    for waves in [4, 32, 256] {
        let path = wavy_path(&device, waves);
        group.bench_with_input(BenchmarkId::from_parameter(waves), &path, |b, path| {
            b.iter(|| path.fill_contains_point(black_box(Point::new(37.0, 80.0))));
        });
    }

    group.finish();
}

fn bench_stroke(c: &mut Criterion) {
    let device = ResourceDevice::new(RecordingBackend::new());
    let circle = device
        .create_ellipse_geometry(Ellipse::circle(Point::new(100.0, 100.0), 80.0))
        .unwrap();
    let wavy = wavy_path(&device, 32);

    c.bench_function("stroke_circle_solid", |b| {
        b.iter(|| {
            circle.stroke_contains_point(black_box(Point::new(180.0, 100.0)), 2.0, DashStyle::Solid)
        })
    });
    c.bench_function("stroke_wavy_dashed", |b| {
        b.iter(|| {
            wavy.stroke_contains_point(black_box(Point::new(300.0, 60.0)), 3.0, DashStyle::DashDot)
        })
    });
}

criterion_group!(benches, bench_fill, bench_stroke);
criterion_main!(benches);
