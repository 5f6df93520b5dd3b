//! Read-only startup settings.
//!
//! Looked up once in `$XDG_CONFIG_HOME/bloom/settings.json`. Nothing here is
//! ever written back; a missing file simply means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use serde::Deserialize;

use crate::error::{BloomError, Result};

const SETTINGS_FILE_NAME: &str = "settings.json";
const MAX_PETALS: usize = 200;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub petal_count: usize,
    pub safe_padding: f64,
    pub deadline_weekday: Weekday,
    pub sound: bool,
    pub window_width: i32,
    pub window_height: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            petal_count: 28,
            safe_padding: 60.0,
            deadline_weekday: Weekday::Fri,
            sound: true,
            window_width: 860,
            window_height: 680,
        }
    }
}

impl Settings {
    fn sanitized(mut self) -> Self {
        self.petal_count = self.petal_count.clamp(1, MAX_PETALS);
        if !self.safe_padding.is_finite() || self.safe_padding < 0.0 {
            self.safe_padding = 0.0;
        }
        self.window_width = self.window_width.max(360);
        self.window_height = self.window_height.max(560);
        self
    }

    pub fn from_json(raw: &str, path: &Path) -> Result<Self> {
        let parsed: Settings =
            serde_json::from_str(raw).map_err(|source| BloomError::SettingsFormat {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(parsed.sanitized())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_json(&raw, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(BloomError::SettingsIo {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Never fails: problems are logged and defaults are used instead.
    pub fn load() -> Self {
        let path = settings_path();
        match Self::load_from(&path) {
            Ok(settings) => {
                log::debug!("settings: {:?}", settings);
                settings
            }
            Err(err) => {
                log::warn!("{err}; falling back to defaults");
                Self::default()
            }
        }
    }
}

fn settings_path() -> PathBuf {
    glib::user_config_dir().join("bloom").join(SETTINGS_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.petal_count, 28);
        assert_eq!(settings.deadline_weekday, Weekday::Fri);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "deadline_weekday": "Sat", "sound": false }}"#).unwrap();
        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.deadline_weekday, Weekday::Sat);
        assert!(!settings.sound);
        assert_eq!(settings.petal_count, 28);
        assert_eq!(settings.safe_padding, 60.0);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ petal_count: ").unwrap();
        let err = Settings::load_from(file.path()).unwrap_err();
        assert!(matches!(err, BloomError::SettingsFormat { .. }));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let raw = r#"{ "petal_count": 0, "safe_padding": -4.0, "window_width": 10 }"#;
        let settings = Settings::from_json(raw, Path::new("inline")).unwrap();
        assert_eq!(settings.petal_count, 1);
        assert_eq!(settings.safe_padding, 0.0);
        assert_eq!(settings.window_width, 360);

        let raw = r#"{ "petal_count": 5000 }"#;
        let settings = Settings::from_json(raw, Path::new("inline")).unwrap();
        assert_eq!(settings.petal_count, MAX_PETALS);
    }
}
