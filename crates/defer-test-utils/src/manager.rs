//! Stub implementations of the engine's service traits.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use defer_core::{
    InstallError, InstallReport, LocateError, PackageManager, RequirementLocator,
    RequirementSource,
};

/// A [`PackageManager`] double that counts invocations.
///
/// `dry_run` answers with a configurable report; `install` succeeds or
/// fails on demand. Counters make install-once assertions direct.
pub struct CountingManager {
    report: Mutex<InstallReport>,
    dry_runs: AtomicUsize,
    installs: AtomicUsize,
    fail_install: AtomicBool,
}

impl CountingManager {
    /// A manager whose dry-run reports the given pending changes.
    pub fn new(report: InstallReport) -> Self {
        Self {
            report: Mutex::new(report),
            dry_runs: AtomicUsize::new(0),
            installs: AtomicUsize::new(0),
            fail_install: AtomicBool::new(false),
        }
    }

    /// A manager reporting nothing pending (environment already satisfied).
    pub fn satisfied() -> Self {
        Self::new(InstallReport::empty())
    }

    /// Replace the report returned by future dry-runs.
    pub fn set_report(&self, report: InstallReport) {
        *self.report.lock().unwrap() = report;
    }

    /// Make future installs fail (or succeed again).
    pub fn set_fail_install(&self, fail: bool) {
        self.fail_install.store(fail, Ordering::SeqCst);
    }

    /// Number of dry-run invocations so far.
    pub fn dry_runs(&self) -> usize {
        self.dry_runs.load(Ordering::SeqCst)
    }

    /// Number of install invocations so far.
    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }
}

impl PackageManager for CountingManager {
    fn dry_run(&self, _requirements: &Path) -> Result<InstallReport, InstallError> {
        self.dry_runs.fetch_add(1, Ordering::SeqCst);
        Ok(self.report.lock().unwrap().clone())
    }

    fn install(&self, _requirements: &Path) -> Result<(), InstallError> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        if self.fail_install.load(Ordering::SeqCst) {
            return Err(InstallError::Failed {
                program: "stub".to_string(),
                code: Some(1),
                stderr: "synthetic install failure".to_string(),
            });
        }
        Ok(())
    }
}

/// A [`RequirementLocator`] double that resolves every source to one path.
pub struct FixedLocator {
    path: PathBuf,
}

impl FixedLocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RequirementLocator for FixedLocator {
    fn locate(&self, _source: &RequirementSource) -> Result<PathBuf, LocateError> {
        Ok(self.path.clone())
    }
}
