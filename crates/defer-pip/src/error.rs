//! Error types for the pip backend.

use std::path::PathBuf;

/// Result type for pip-backend configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from loading the pip backend configuration.
///
/// Invocation failures are reported through
/// [`defer_core::InstallError`]; this type only covers reading and
/// parsing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pip configuration at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
}
