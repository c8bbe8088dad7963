//! Loading configuration files from disk.

use std::fs;
use std::path::PathBuf;

use hermes_config::{ConfigError, ConfigLoader};
use hermes_telemetry::LogFormat;
use tempfile::TempDir;

fn write_temp(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn loads_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_temp(
        &temp_dir,
        "hermes.toml",
        r#"
        [server]
        max_multipart_fields = 8
        request_id_header = "x-correlation-id"

        [logging]
        level = "debug"
        format = "pretty"
        "#,
    );

    let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();
    assert_eq!(config.server.max_multipart_fields(), 8);
    assert_eq!(config.server.request_id_header(), "x-correlation-id");
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn loads_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_temp(&temp_dir, "hermes.json", r#"{"client": {"errors": "first"}}"#);
    let config = ConfigLoader::new().with_file(&path).unwrap().load().unwrap();
    assert!(config.client.parse_options().stops_early());
}

#[test]
fn rejects_unknown_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_temp(&temp_dir, "hermes.ini", "server=1");
    let err = ConfigLoader::new().with_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
}

#[test]
fn invalid_file_values_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_temp(&temp_dir, "invalid.toml", "[server]\nmax_body_size = 0\n");
    let err = ConfigLoader::new().with_file(&path).unwrap().load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}
