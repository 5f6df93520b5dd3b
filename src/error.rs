use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BloomError {
    #[error("could not read settings from {path}: {source}")]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings in {path}: {source}")]
    SettingsFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Local wall-clock time that falls into a DST gap.
    #[error("deadline {0} does not exist in the local timezone")]
    UnresolvableDeadline(NaiveDateTime),

    #[error("preview failed: {0}")]
    Preview(#[from] glib::Error),

    #[error("pop tone unavailable: {0}")]
    Tone(String),
}

pub type Result<T> = std::result::Result<T, BloomError>;
