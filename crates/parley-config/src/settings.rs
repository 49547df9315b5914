use std::path::PathBuf;

use serde::Deserialize;

/// Where runtime-editable settings are persisted
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SettingsConfig {
    pub directory: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./config"),
        }
    }
}

impl SettingsConfig {
    pub fn tool_settings_path(&self) -> PathBuf {
        self.directory.join("tool-settings.json")
    }

    pub fn chat_timeout_path(&self) -> PathBuf {
        self.directory.join("chat-timeout-settings.json")
    }

    pub fn feeds_path(&self) -> PathBuf {
        self.directory.join("custom-feeds.json")
    }
}
