//! On-disk package tree fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory of package directories with requirement files.
///
/// # Example
///
/// ```rust,no_run
/// use defer_test_utils::packages::PackageRoot;
///
/// let root = PackageRoot::new();
/// root.write_requirements("pak", "requirements.txt", "msgpack==1.0.8\n");
/// ```
pub struct PackageRoot {
    temp_dir: TempDir,
}

impl Default for PackageRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageRoot {
    /// Create an empty temporary package root.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("PackageRoot::new: failed to create temp dir"),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create the directory for a dotted package name and return it.
    pub fn add_package(&self, name: &str) -> PathBuf {
        let mut dir = self.root().to_path_buf();
        for segment in name.split('.') {
            dir.push(segment);
        }
        fs::create_dir_all(&dir).expect("PackageRoot::add_package: failed to create package dir");
        dir
    }

    /// Write a requirement resource into a package directory and return
    /// its path. The package directory is created if needed.
    pub fn write_requirements(&self, package: &str, resource: &str, content: &str) -> PathBuf {
        let dir = self.add_package(package);
        let path = dir.join(resource);
        fs::write(&path, content).expect("PackageRoot::write_requirements: failed to write file");
        path
    }
}
