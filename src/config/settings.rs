//! User settings for Tally
//!
//! Manages user preferences: the default report window, the report currency,
//! result messages and the per-target cloud upload toggles.

use serde::{Deserialize, Serialize};

use super::paths::TallyPaths;
use crate::error::TallyError;
use crate::logging::DEFAULT_FILTER;
use crate::models::CurrencyId;

/// Settings for one cloud upload target
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CloudTargetSettings {
    /// Whether exported files are uploaded to this target
    #[serde(default)]
    pub enabled: bool,

    /// Local sync folder the target mirrors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,

    /// Access token granted by the target; absent until authorized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Where the user goes to authorize the target again
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorize_url: Option<String>,
}

/// Upload preferences, one entry per supported target
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UploadSettings {
    #[serde(default)]
    pub dropbox: CloudTargetSettings,

    #[serde(default)]
    pub google_drive: CloudTargetSettings,
}

/// User settings for Tally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Number of months a new report covers
    #[serde(default = "default_period_length")]
    pub default_period_length: u32,

    /// Currency reports use when none is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<CurrencyId>,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Tracing filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Whether a finished data task prints its success message
    #[serde(default = "default_show_result_message")]
    pub show_result_message: bool,

    /// Cloud upload preferences
    #[serde(default)]
    pub upload: UploadSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_period_length() -> u32 {
    12
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_log_filter() -> String {
    DEFAULT_FILTER.to_string()
}

fn default_show_result_message() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_period_length: default_period_length(),
            default_currency: None,
            date_format: default_date_format(),
            log_filter: default_log_filter(),
            show_result_message: default_show_result_message(),
            upload: UploadSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &TallyPaths) -> Result<Self, TallyError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| TallyError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                TallyError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TallyPaths) -> Result<(), TallyError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TallyError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| TallyError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_period_length, 12);
        assert!(settings.default_currency.is_none());
        assert!(settings.show_result_message);
        assert!(!settings.upload.dropbox.enabled);
        assert!(!settings.upload.google_drive.enabled);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.default_period_length = 6;
        settings.default_currency = Some(CurrencyId::new(3));
        settings.upload.google_drive.enabled = true;
        settings.upload.google_drive.folder = Some("/tmp/drive".into());

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.default_period_length, 6);
        assert_eq!(loaded.default_currency, Some(CurrencyId::new(3)));
        assert_eq!(loaded.upload, settings.upload);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let loaded: Settings = serde_json::from_str(r#"{"default_period_length": 3}"#).unwrap();
        assert_eq!(loaded.default_period_length, 3);
        assert_eq!(loaded.log_filter, DEFAULT_FILTER);
        assert!(loaded.show_result_message);
    }
}
