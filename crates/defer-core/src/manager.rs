//! Service traits for the external collaborators of the engine.
//!
//! The engine never talks to a package manager or the filesystem directly;
//! it goes through these injected traits so the whole resolution flow can
//! run against test doubles. `defer-pip` provides the production
//! implementations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InstallError, LocateError};
use crate::source::RequirementSource;

/// External package-manager invocation.
///
/// `dry_run` must not change the environment; `install` performs the real
/// installation from the same requirement file. Constraint strings inside
/// the file are forwarded verbatim; no solving happens on this side.
pub trait PackageManager: Send + Sync {
    /// Query which packages an install from `requirements` would add.
    fn dry_run(&self, requirements: &Path) -> Result<InstallReport, InstallError>;

    /// Install from `requirements`.
    fn install(&self, requirements: &Path) -> Result<(), InstallError>;
}

/// Maps a [`RequirementSource`] to the requirement file it names, without
/// executing any code belonging to the package.
pub trait RequirementLocator: Send + Sync {
    fn locate(&self, source: &RequirementSource) -> Result<PathBuf, LocateError>;
}

/// Outcome of a dry-run query: the packages an install would add.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    pub pending: Vec<PackageChange>,
}

impl InstallReport {
    /// A report with nothing pending (the environment is already satisfied).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// One package an installation would add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageChange {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub summary: String,
}

impl PackageChange {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            summary: summary.into(),
        }
    }

    /// The one-line announcement printed before installation.
    pub fn describe(&self) -> String {
        format!("installing {}=={} ({})", self.name, self.version, self.summary)
    }
}
