//! Errors raised at the library boundary. The simulation itself never fails.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("payload is neither a firework event nor an acceleration sample")]
    Unrecognized,
}
