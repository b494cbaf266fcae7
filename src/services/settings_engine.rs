// Markshelf Settings Engine
// Popup preferences (view mode, drag zones, ancestry depth, search limits)
// kept as one JSON file in the platform config directory.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::platform;
use crate::types::drag::EdgeMargin;
use crate::types::errors::SettingsError;
use crate::types::settings::{PopupSettings, MAX_SUPPORTED_TREE_DEPTH};

/// Upper bound for `search.max_results`.
pub const MAX_SEARCH_RESULTS: usize = 1000;

pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<PopupSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &PopupSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

pub struct SettingsEngine {
    config_path: String,
    settings: PopupSettings,
}

impl SettingsEngine {
    /// Uses `path_override`, or `settings.json` in the platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string()
        });
        Self {
            config_path,
            settings: PopupSettings::default(),
        }
    }
}

/// Range checks the drag core relies on: reorder zones must leave room for
/// an enter zone, and the ancestry walk needs a positive, bounded depth.
fn validate(settings: &PopupSettings) -> Result<(), SettingsError> {
    match settings.drag.edge_margin {
        EdgeMargin::Fraction(f) if !(f > 0.0 && f < 0.5) => {
            return Err(SettingsError::InvalidValue(format!(
                "drag.edge_margin fraction must be between 0 and 0.5, got {f}"
            )));
        }
        EdgeMargin::Pixels(px) if !(px.is_finite() && px > 0.0) => {
            return Err(SettingsError::InvalidValue(format!(
                "drag.edge_margin pixels must be positive, got {px}"
            )));
        }
        _ => {}
    }

    let depth = settings.drag.max_tree_depth;
    if depth == 0 || depth > MAX_SUPPORTED_TREE_DEPTH {
        return Err(SettingsError::InvalidValue(format!(
            "drag.max_tree_depth must be in 1..={MAX_SUPPORTED_TREE_DEPTH}, got {depth}"
        )));
    }

    let limit = settings.search.max_results;
    if limit == 0 || limit > MAX_SEARCH_RESULTS {
        return Err(SettingsError::InvalidValue(format!(
            "search.max_results must be in 1..={MAX_SEARCH_RESULTS}, got {limit}"
        )));
    }
    Ok(())
}

impl SettingsEngineTrait for SettingsEngine {
    /// A missing file yields the defaults; an unreadable or out-of-range one
    /// is an error and leaves the current settings in place.
    fn load(&mut self) -> Result<PopupSettings, SettingsError> {
        let path = Path::new(&self.config_path);
        if !path.exists() {
            debug!(path = %self.config_path, "no settings file, using defaults");
            self.settings = PopupSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
        let settings: PopupSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        validate(&settings)?;

        debug!(view_mode = ?settings.appearance.view_mode, "settings loaded");
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Writes to a sibling temp file first so a crash never leaves half a file.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, path))
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &PopupSettings {
        &self.settings
    }

    /// Sets one `section.field` value, validates the result, and saves.
    ///
    /// # Examples
    /// - `"appearance.view_mode"` → `"list"`
    /// - `"drag.edge_margin"` → `{"fraction": 0.25}`
    /// - `"drag.max_tree_depth"` → `64`
    /// - `"search.max_results"` → `50`
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let unknown = || SettingsError::InvalidKey(format!("Key '{}' not found in settings", key));
        let (section, field) = key.split_once('.').ok_or_else(unknown)?;
        if field.contains('.') {
            return Err(unknown());
        }

        let mut tree = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        let slot = tree
            .get_mut(section)
            .and_then(Value::as_object_mut)
            .and_then(|fields| fields.get_mut(field))
            .ok_or_else(unknown)?;
        *slot = value;

        let updated: PopupSettings = serde_json::from_value(tree).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        validate(&updated)?;

        self.settings = updated;
        self.save()?;
        info!(key, "setting updated");
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = PopupSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
