//! Failures while reading, writing or checking a [`Config`](crate::Config).

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// No platform configuration directory is available.
    #[error("no configuration directory: {0}")]
    ConfigDirectory(String),

    #[error("cannot access configuration file: {0}")]
    Io(#[from] io::Error),

    #[error("malformed JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed TOML configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("cannot write TOML configuration: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// The file parsed but holds values the engine cannot run with.
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// A configuration that parsed but is not usable.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Only `.json` and `.toml` files are understood.
    #[error("unsupported configuration format '{0}'")]
    UnsupportedFormat(String),

    #[error("'{key}' cannot be {value}")]
    ValueOutOfRange { key: String, value: String },
}

impl ConfigError {
    pub(crate) fn out_of_range(key: &str, value: impl ToString) -> Self {
        ConfigError::ValueOutOfRange {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
