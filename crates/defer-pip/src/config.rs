//! pip invocation configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How to invoke pip.
///
/// Every invocation runs `<program> install <extra_args...>` plus the
/// per-call arguments, so constraints like an index URL or a proxy can
/// be threaded through `extra_args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipConfig {
    /// Executable to run. Defaults to `pip` from `PATH`.
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments inserted after `install` on every invocation.
    #[serde(default = "default_extra_args")]
    pub extra_args: Vec<String>,
}

fn default_program() -> String {
    "pip".to_string()
}

fn default_extra_args() -> Vec<String> {
    vec!["--quiet".to_string()]
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            extra_args: default_extra_args(),
        }
    }
}

impl PipConfig {
    /// Load the configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
