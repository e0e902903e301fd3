//! Record one frame against the recording backend and print its commands
//!
//! Run with: RUST_LOG=vellum_paint=trace cargo run -p vellum_paint --example record_frame [vellum.toml]

use std::path::Path;

use tracing_subscriber::EnvFilter;
use vellum_core::{Color, DashStyle, Ellipse, Point, Rect, RoundedRect};
use vellum_paint::{
    DeviceConfig, LayerParams, RecordingBackend, ResourceDevice, StrokeOptions,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => DeviceConfig::load(Path::new(&path))?,
        None => DeviceConfig::default(),
    };

    let backend = RecordingBackend::new();
    let log = backend.log();
    let device = ResourceDevice::builder(backend).config(config).build()?;

    let mut badge = device.create_path_geometry()?;
    badge.set_start_point(Point::new(0.0, 0.0))?;
    badge.add_lines(&[
        Point::new(40.0, 0.0),
        Point::new(40.0, 30.0),
        Point::new(20.0, 40.0),
        Point::new(0.0, 30.0),
    ])?;
    badge.close_path()?;
    let layer = device.create_layer()?;

    let mut session = device.session();
    session.begin_render_with_color(Color::WHITE)?;

    session.draw_rounded_rectangle(
        RoundedRect::uniform(Rect::new(10.0, 10.0, 200.0, 120.0), 8.0),
        Color::BLACK,
        Color::rgb(0.9, 0.9, 1.0),
        &StrokeOptions::new(2.0),
    )?;

    session.push_transform()?;
    session.translate_transform(30.0, 30.0)?;
    session.push_layer(&layer, &LayerParams::default().with_mask(&badge))?;
    session.fill_ellipse(Ellipse::circle(Point::new(20.0, 20.0), 25.0), Color::RED)?;
    session.pop_layer()?;
    session.pop_transform()?;

    session.draw_line_with(
        Point::new(10.0, 150.0),
        Point::new(210.0, 150.0),
        Color::BLUE,
        &StrokeOptions::new(1.5).with_dash_style(DashStyle::DashDot),
    )?;
    session.end_render()?;

    for (index, command) in log.commands().iter().enumerate() {
        println!("{:>3} {:<18} {:?}", index, command.name(), command);
    }
    Ok(())
}
