//! Viewer settings - persisted as a small JSON file.

use serde::{Deserialize, Serialize};
use std::fs;

/// Detection thresholds shared by both model slots. Adjusted live from the
/// control panel and applied to models loaded afterwards as well.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewerSettings {
    pub conf_threshold: f32,
    pub iou_threshold: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            conf_threshold: 0.25,
            iou_threshold: 0.45,
        }
    }
}

impl ViewerSettings {
    /// Load from JSON, falling back to (and creating) the defaults when the
    /// file is missing or unparsable.
    pub fn load(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("settings file {} unparsable ({}), using defaults", path, e);
                    Self::default()
                }
            },
            Err(_) => {
                let settings = Self::default();
                settings.save(path);
                settings
            }
        }
    }

    pub fn save(&self, path: &str) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::error!("failed to save settings to {}: {}", path, e);
                }
            }
            Err(e) => log::error!("failed to serialize settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.conf_threshold, 0.25);
        assert_eq!(settings.iou_threshold, 0.45);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let path = std::env::temp_dir().join("vigil_settings_roundtrip.json");
        let path = path.to_str().unwrap().to_string();

        let settings = ViewerSettings {
            conf_threshold: 0.5,
            iou_threshold: 0.6,
        };
        settings.save(&path);
        assert_eq!(ViewerSettings::load(&path), settings);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_creates_defaults() {
        let path = std::env::temp_dir().join("vigil_settings_missing.json");
        let _ = std::fs::remove_file(&path);
        let path_str = path.to_str().unwrap();

        let settings = ViewerSettings::load(path_str);
        assert_eq!(settings, ViewerSettings::default());
        assert!(path.exists());

        let _ = std::fs::remove_file(&path);
    }
}
