//! Picker configuration.
//!
//! Every field has a default matching the product form markup, so an empty
//! JSON object (or no configuration at all) binds to `#drag-drop-area`,
//! `#file` and `#image-container`.

use std::str::FromStr;

use log::Level;
use serde::{Deserialize, Serialize};

use crate::error::PickerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PickerConfig {
    pub drop_zone_id: String,
    pub input_id: String,
    pub preview_id: String,
    /// Class toggled on the drop zone while a drag hovers it.
    pub highlight_class: String,
    pub image_class: String,
    pub close_class: String,
    pub close_glyph: String,
    pub error_class: String,
    /// CSS `display` value that makes the drop zone visible again.
    pub drop_zone_display: String,
    pub log_level: String,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            drop_zone_id: "drag-drop-area".to_string(),
            input_id: "file".to_string(),
            preview_id: "image-container".to_string(),
            highlight_class: "highlight".to_string(),
            image_class: "img-fluid".to_string(),
            close_class: "close-button".to_string(),
            close_glyph: "\u{d7}".to_string(),
            error_class: "picker-error".to_string(),
            drop_zone_display: "flex".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl PickerConfig {
    pub fn from_json(json: &str) -> Result<Self, PickerError> {
        let config: PickerConfig = serde_json::from_str(json)?;
        config.level()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, PickerError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn level(&self) -> Result<Level, PickerError> {
        Level::from_str(&self.log_level).map_err(|_| PickerError::LogLevel(self.log_level.clone()))
    }
}
