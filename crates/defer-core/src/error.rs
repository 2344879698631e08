//! Error types for the resolution engine.

use std::path::PathBuf;

/// Result type for resolution-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the import machinery.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The name is locked in the module registry pending group resolution.
    /// Direct lookup must fail until the owning group resolves.
    #[error("import of '{name}' halted; the name is locked until its import group resolves")]
    Halted { name: String },

    /// No finder answered the name and the library has no definition for it.
    #[error("no module named '{name}'")]
    NotFound { name: String },

    /// A dotted import reached a loaded parent that is not a package.
    #[error("no module named '{name}'; '{parent}' is not a package")]
    ParentNotPackage { name: String, parent: String },

    /// Attribute lookup failed on a loaded (or resolved) module.
    #[error("module '{module}' has no attribute '{name}'")]
    AttributeNotFound { module: String, name: String },

    /// The attribute exists but is not a function.
    #[error("attribute '{name}' of module '{module}' is not callable (found {kind})")]
    NotCallable {
        module: String,
        name: String,
        kind: &'static str,
    },

    /// Requirement resource lookup failed.
    #[error(transparent)]
    Locate(#[from] LocateError),

    /// Package-manager invocation failed.
    #[error(transparent)]
    Install(#[from] InstallError),
}

/// Errors from the external package-manager invocation.
///
/// Both the dry-run and the real install surface failures through this
/// type; neither is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// The package-manager executable could not be launched.
    #[error("failed to launch package manager '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The package manager exited with a non-zero status.
    #[error("package manager '{program}' failed with exit code {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The dry-run report scratch file could not be created.
    #[error("failed to create installation report file: {source}")]
    ReportFile {
        #[source]
        source: std::io::Error,
    },

    /// The dry-run report was unreadable or malformed.
    #[error("invalid installation report at {path}: {message}")]
    Report { path: PathBuf, message: String },
}

/// Errors from resolving a requirement locator to a file.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// The locator string is not of the form `<package>:<resource>`.
    #[error("invalid requirement source '{value}': expected '<package>:<resource>'")]
    InvalidSource { value: String },

    /// No configured root contains the package directory.
    #[error("package '{package}' not found under any configured root")]
    PackageNotFound { package: String },

    /// The package directory exists but the resource file does not.
    #[error("resource '{resource}' not found in package '{package}'")]
    ResourceNotFound { package: String, resource: String },
}
