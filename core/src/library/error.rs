//! Library error types

use std::io;
use std::path::PathBuf;

use super::GameSource;

/// Errors produced by scanners, the launch dispatcher and the engine.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// Malformed or unreadable manifest/config file
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// Optional source's provider binary or service is missing
    #[error("{0} provider is not available")]
    ProviderUnavailable(GameSource),

    /// Spawn or URI handler invocation failed
    #[error("failed to launch {id}: {cause}")]
    LaunchFailure {
        id: String,
        #[source]
        cause: io::Error,
    },

    /// Operation referenced an unknown id
    #[error("game '{0}' not found")]
    NotFound(String),
}

impl LibraryError {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
