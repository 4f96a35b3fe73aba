use std::path::PathBuf;
use thiserror::Error;

/// Why a raw string is not a usable region code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("region code is empty")]
    Empty,
    #[error("region code must be 2 letters, got {0}")]
    InvalidLength(usize),
    #[error("region code must be alphabetic: {0:?}")]
    NonAlphabetic(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML")]
    Parse(#[from] toml::de::Error),
    #[error("invalid region override")]
    InvalidRegion(#[from] RegionError),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
