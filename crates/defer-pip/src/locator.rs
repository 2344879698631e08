//! Filesystem-based requirement locator.

use std::path::PathBuf;

use defer_core::{LocateError, RequirementLocator, RequirementSource};

/// Locates requirement files inside package directories.
///
/// A source `pak.sub:requirements.txt` maps to `<root>/pak/sub/requirements.txt`
/// for each configured root in order. A package may be split across
/// several roots; every root that contains the package directory is
/// searched before giving up on the resource.
///
/// Only the directory layout is consulted. No code belonging to the
/// package runs, so resources can be located before the package's own
/// dependencies are installed.
pub struct PackageDirLocator {
    roots: Vec<PathBuf>,
}

impl PackageDirLocator {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// A locator over a single root directory.
    pub fn single(root: impl Into<PathBuf>) -> Self {
        Self::new(vec![root.into()])
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl RequirementLocator for PackageDirLocator {
    fn locate(&self, source: &RequirementSource) -> Result<PathBuf, LocateError> {
        let relative: PathBuf = source.package().split('.').collect();
        let mut package_found = false;

        for root in &self.roots {
            let dir = root.join(&relative);
            if !dir.is_dir() {
                continue;
            }
            package_found = true;
            let candidate = dir.join(source.resource());
            if candidate.is_file() {
                tracing::debug!(
                    source = %source,
                    path = %candidate.display(),
                    "located requirement file"
                );
                return Ok(candidate);
            }
        }

        if package_found {
            Err(LocateError::ResourceNotFound {
                package: source.package().to_string(),
                resource: source.resource().to_string(),
            })
        } else {
            Err(LocateError::PackageNotFound {
                package: source.package().to_string(),
            })
        }
    }
}
