//! Error types for the non-gameplay edges (storage, configuration).
//!
//! Gameplay refusals (not enough energy, not enough credits, duplicate
//! letters) are plain `bool`/no-op results on the state machine, never errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading or writing the save blob
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed save blob: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("backend rejected write of {key}")]
    WriteRejected { key: String },
}

/// Failure loading a tuning file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value out of range: {field} = {value}")]
    OutOfRange { field: &'static str, value: String },
}
