//! Integration tests for device configuration files
//!
//! These tests verify that:
//! - `vellum.toml` is found inside a directory or read from a file path
//! - Invalid files are reported with the right error
//! - A loaded configuration drives a new device and its sessions

use std::fs;

use vellum_core::{Dpi, TextAntialiasMode};
use vellum_paint::{ConfigError, DeviceConfig, RecordedCall, RecordingBackend, ResourceDevice};

#[test]
fn test_load_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("vellum.toml"),
        "antialias = false\ntext_antialias = \"aliased\"\n",
    )
    .unwrap();

    let config = DeviceConfig::load(dir.path()).unwrap();
    assert!(!config.antialias);
    assert_eq!(config.text_antialias, TextAntialiasMode::Aliased);
    assert_eq!(config.dpi, Dpi::DEFAULT);
}

#[test]
fn test_load_from_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.toml");
    fs::write(&path, "[dpi]\nx = 144.0\ny = 144.0\n").unwrap();

    let config = DeviceConfig::load(&path).unwrap();
    assert_eq!(config.dpi, Dpi::new(144.0, 144.0));
}

#[test]
fn test_load_reports_parse_and_validation_errors() {
    let dir = tempfile::tempdir().unwrap();

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "antialias = maybe").unwrap();
    assert!(matches!(
        DeviceConfig::load(&broken),
        Err(ConfigError::Parse(_))
    ));

    let invalid = dir.path().join("invalid.toml");
    fs::write(&invalid, "[dpi]\nx = 0.0\ny = 96.0\n").unwrap();
    assert!(matches!(
        DeviceConfig::load(&invalid),
        Err(ConfigError::Invalid(_))
    ));

    // A directory without vellum.toml
    assert!(matches!(
        DeviceConfig::load(dir.path()),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_saved_config_drives_device() {
    let dir = tempfile::tempdir().unwrap();
    let config = DeviceConfig {
        dpi: Dpi::new(120.0, 120.0),
        antialias: false,
        ..DeviceConfig::default()
    };
    fs::write(dir.path().join("vellum.toml"), config.to_toml().unwrap()).unwrap();

    let backend = RecordingBackend::new();
    let log = backend.log();
    let device = ResourceDevice::builder(backend)
        .config(DeviceConfig::load(dir.path()).unwrap())
        .build()
        .unwrap();

    assert_eq!(device.dpi(), Dpi::new(120.0, 120.0));
    assert_eq!(log.calls()[0], RecordedCall::SetDpi(Dpi::new(120.0, 120.0)));

    let session = device.session();
    assert!(!session.antialias());
}
