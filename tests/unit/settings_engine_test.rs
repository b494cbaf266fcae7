//! Unit tests for the settings engine, using temporary config files.

use markshelf::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use markshelf::types::drag::{EdgeMargin, ViewMode};
use markshelf::types::errors::SettingsError;
use markshelf::types::settings::{PopupSettings, MAX_SUPPORTED_TREE_DEPTH};
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

fn engine() -> (SettingsEngine, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("settings.json");
    (SettingsEngine::new(Some(path.to_string_lossy().to_string())), dir)
}

#[test]
fn test_missing_file_loads_defaults() {
    let (mut engine, _dir) = engine();
    let settings = engine.load().unwrap();

    assert_eq!(settings, PopupSettings::default());
    assert_eq!(settings.appearance.view_mode, ViewMode::Grid);
    assert_eq!(settings.drag.edge_margin, EdgeMargin::Pixels(20.0));
    assert_eq!(settings.drag.max_tree_depth, MAX_SUPPORTED_TREE_DEPTH);
    assert_eq!(settings.search.max_results, 100);
}

#[test]
fn test_set_value_persists_across_engines() {
    let (mut engine, _dir) = engine();
    engine.load().unwrap();
    engine.set_value("appearance.view_mode", json!("list")).unwrap();
    engine.set_value("search.max_results", json!(25)).unwrap();

    let mut reloaded = SettingsEngine::new(Some(engine.get_config_path().to_string()));
    let settings = reloaded.load().unwrap();
    assert_eq!(settings.appearance.view_mode, ViewMode::List);
    assert_eq!(settings.search.max_results, 25);
}

#[rstest]
#[case::empty_key("", json!(1))]
#[case::unknown_section("theme.mode", json!("dark"))]
#[case::unknown_leaf("drag.speed", json!(3))]
fn test_set_value_rejects_bad_keys(#[case] key: &str, #[case] value: serde_json::Value) {
    let (mut engine, _dir) = engine();
    assert!(matches!(engine.set_value(key, value), Err(SettingsError::InvalidKey(_))));
}

#[rstest]
#[case::view_mode("appearance.view_mode", json!("diagonal"))]
#[case::margin("drag.edge_margin", json!({"inches": 2}))]
#[case::depth("drag.max_tree_depth", json!(-1))]
#[case::zero_depth("drag.max_tree_depth", json!(0))]
#[case::depth_over_limit("drag.max_tree_depth", json!(MAX_SUPPORTED_TREE_DEPTH + 1))]
#[case::half_fraction("drag.edge_margin", json!({"fraction": 0.5}))]
#[case::zero_fraction("drag.edge_margin", json!({"fraction": 0.0}))]
#[case::negative_pixels("drag.edge_margin", json!({"pixels": -4.0}))]
#[case::no_results("search.max_results", json!(0))]
fn test_set_value_rejects_bad_values(#[case] key: &str, #[case] value: serde_json::Value) {
    let (mut engine, _dir) = engine();
    assert!(matches!(engine.set_value(key, value), Err(SettingsError::InvalidValue(_))));
    assert_eq!(engine.get_settings(), &PopupSettings::default());
}

#[test]
fn test_reset_restores_defaults() {
    let (mut engine, _dir) = engine();
    engine.set_value("drag.edge_margin", json!({"fraction": 0.3})).unwrap();
    engine.reset().unwrap();
    assert_eq!(engine.get_settings(), &PopupSettings::default());

    let mut reloaded = SettingsEngine::new(Some(engine.get_config_path().to_string()));
    assert_eq!(reloaded.load().unwrap(), PopupSettings::default());
}

#[test]
fn test_out_of_range_file_is_refused_on_load() {
    let (mut engine, _dir) = engine();
    engine.set_value("drag.max_tree_depth", json!(16)).unwrap();
    let path = engine.get_config_path().to_string();
    let tampered = std::fs::read_to_string(&path)
        .unwrap()
        .replace("\"max_tree_depth\": 16", "\"max_tree_depth\": 0");
    std::fs::write(&path, tampered).unwrap();

    let mut reloaded = SettingsEngine::new(Some(path));
    assert!(matches!(reloaded.load(), Err(SettingsError::InvalidValue(_))));
    assert_eq!(reloaded.get_settings(), &PopupSettings::default());
}
