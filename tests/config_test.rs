//! Integration tests for Settings loading from an explicit config file.
//!
//! These tests only write temp files; environment variables are left alone so
//! they can run in parallel.

use std::fs;

use tempfile::TempDir;

use treewalk::application::ApplicationError;
use treewalk::config::Settings;
use treewalk::domain::{TraversalMethod, TraversalOrder};

#[test]
fn given_config_file_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treewalk.toml");
    fs::write(
        &path,
        r#"
[traversal]
method = "recursive"
orders = ["reverse-postorder", "level_order_left_to_right"]

[display]
tree = false
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.traversal.method, TraversalMethod::Recursive);
    assert_eq!(
        settings.orders().unwrap(),
        vec![
            TraversalOrder::ReversePostorder,
            TraversalOrder::LevelOrderLeftToRight
        ]
    );
    assert!(!settings.display.tree);
}

#[test]
fn given_unknown_order_in_config_when_load_then_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treewalk.toml");
    fs::write(&path, "[traversal]\norders = [\"sideways\"]\n").unwrap();

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(err.to_string().contains("sideways"), "{err}");
}

#[test]
fn given_malformed_config_when_load_then_config_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[traversal\nmethod = ").unwrap();

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn given_missing_config_file_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_effective_settings_when_serialized_then_reloads_identically() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("treewalk.toml");
    fs::write(&path, "[display]\ncolor = false\n").unwrap();
    let settings = Settings::load(Some(&path)).unwrap();

    // Act
    let dumped = dir.path().join("dumped.toml");
    fs::write(&dumped, settings.to_toml().unwrap()).unwrap();
    let reloaded = Settings::load(Some(&dumped)).unwrap();

    // Assert
    assert_eq!(reloaded, settings);
    assert!(!reloaded.display.color);
}
