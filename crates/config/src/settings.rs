// Application settings
// Loaded from ~/.config/facetbar/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Suggestions
    #[serde(rename = "suggest.maxVisible")]
    pub max_visible: usize,  // per column group, display only

    #[serde(rename = "suggest.showCounts")]
    pub show_counts: bool,

    // Chips
    #[serde(rename = "chips.commitOnEnter")]
    pub commit_on_enter: bool,

    #[serde(rename = "chips.commitOnBlur")]
    pub commit_on_blur: bool,

    #[serde(rename = "chips.backspaceRemovesLast")]
    pub backspace_removes_last: bool,

    // Display
    #[serde(rename = "display.globalLabel")]
    pub global_label: String,

    // Input
    #[serde(rename = "input.inferTypes")]
    pub infer_types: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Suggestions
            max_visible: 50,
            show_counts: true,
            // Chips
            commit_on_enter: true,
            commit_on_blur: true,
            backspace_removes_last: true,
            // Display
            global_label: "global".to_string(),
            // Input
            infer_types: false,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Suggestions
    // maxVisible caps each column group in listings (the engine never truncates)
    "suggest.maxVisible": 50,
    "suggest.showCounts": true,

    // Chips
    // Unmatched text becomes a global chip on Enter / when the input loses focus
    "chips.commitOnEnter": true,
    "chips.commitOnBlur": true,
    "chips.backspaceRemovesLast": true,

    // Display
    "display.globalLabel": "global",

    // Input (parse numbers and booleans in CSV cells)
    "input.inferTypes": false
}
"#;

/// Drop `//` comment lines so the file can carry documentation.
fn strip_comments(contents: &str) -> String {
    contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("facetbar");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}", e);
                log::warn!("Using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file. Missing keys take defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&strip_comments(&contents)).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save current settings to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |e: std::io::Error| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        fs::write(path, json).map_err(io_error)
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Label shown for global chips and suggestions
    pub fn global_label(&self) -> &str {
        if self.global_label.is_empty() {
            "global"
        } else {
            &self.global_label
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_parses_to_defaults() {
        let parsed: Settings = serde_json::from_str(&strip_comments(DEFAULT_CONFIG)).unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            "{\n  // only one key\n  \"chips.commitOnBlur\": false\n}\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert!(!settings.commit_on_blur);
        assert!(settings.commit_on_enter);
        assert_eq!(settings.max_visible, 50);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.max_visible = 5;
        settings.global_label = "anywhere".to_string();
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(&path).unwrap();
        assert_eq!(reloaded, settings);
        assert_eq!(reloaded.global_label(), "anywhere");
    }

    #[test]
    fn test_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(Settings::load_from(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ \"suggest.maxVisible\": \"lots\" }").unwrap();
        let err = Settings::load_from(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("invalid settings"));
    }

    #[test]
    fn test_empty_global_label_falls_back() {
        let mut settings = Settings::default();
        settings.global_label.clear();
        assert_eq!(settings.global_label(), "global");
    }
}
