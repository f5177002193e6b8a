//! Setup and environment errors
//!
//! Programmer-invariant violations are `debug_assert!`s and never show up
//! here. Runtime content errors are logged and skipped at the call site.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a setup or init call
#[derive(Debug, Error)]
pub enum EngineError {
    /// A settings or content file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Settings JSON was malformed
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    /// Settings parsed but hold unusable values
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    /// Game init reported failure
    #[error("game init failed: {0}")]
    Init(String),
    /// The background loader thread panicked
    #[error("content loader panicked")]
    LoaderPanicked,
    /// The presentation collaborator failed
    #[error("presentation failed: {0}")]
    Presentation(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
