//! Tests for settings file selection and command-line overrides
use std::io::Write;

use clap::Parser;
use gcode_plot::config::{Args, Config};
use gcode_plot::{Color, MachineSettings};
use tempfile::NamedTempFile;

fn settings_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create settings file");
    file.write_all(content.as_bytes()).expect("write settings");
    file
}

#[test]
fn test_settings_flag_loads_file() {
    let file = settings_file(
        r##"
pen_up_angle = 120.0
pen_down_feed_rate = 45.0
pen_up_color = "#336699"
look_ahead_segments = 5
"##,
    );
    let path = file.path().to_str().expect("utf-8 path");

    let args = Args::parse_from(["gcode-plot", "drawing.ngc", "--settings", path]);
    let config = Config::from_args(args).expect("create config");

    assert_eq!(config.settings_path.as_deref(), Some(file.path()));
    assert_eq!(config.settings.pen_up_angle, 120.0);
    assert_eq!(config.settings.pen_down_feed_rate, 45.0);
    assert_eq!(config.settings.pen_up_color, Color::rgb(0x33, 0x66, 0x99));
    assert_eq!(config.settings.look_ahead_segments, 5);
    // untouched keys keep their defaults
    assert_eq!(config.settings.acceleration, MachineSettings::default().acceleration);
    assert_eq!(config.settings.pen_up_command(), "G00 Z120");
}

#[test]
fn test_flags_override_settings_file() {
    let file = settings_file("reverse_for_glass = false\nshow_pen_up = false\n");
    let path = file.path().to_str().expect("utf-8 path");

    let args = Args::parse_from([
        "gcode-plot",
        "drawing.ngc",
        "--settings",
        path,
        "--mirror",
        "--show-pen-up",
        "--json",
        "--nodes",
    ]);
    let config = Config::from_args(args).expect("create config");

    assert!(config.settings.reverse_for_glass);
    assert!(config.settings.show_pen_up);
    assert!(config.json);
    assert!(config.show_nodes);
    assert!(!config.watch);
}

#[test]
fn test_malformed_settings_file_is_an_error() {
    let file = settings_file("acceleration = \"fast\"\n");
    let path = file.path().to_str().expect("utf-8 path");

    let args = Args::parse_from(["gcode-plot", "drawing.ngc", "--settings", path]);
    let err = Config::from_args(args).expect_err("bad settings must fail");

    assert!(format!("{:#}", err).contains("Failed to load machine settings"));
}

#[test]
fn test_missing_settings_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("machine.toml");

    let args = Args::parse_from([
        "gcode-plot",
        "drawing.ngc",
        "--settings",
        path.to_str().expect("utf-8 path"),
    ]);

    assert!(Config::from_args(args).is_err());
}
