//! pip backend for the deferred-import engine.
//!
//! This crate provides the production implementations of the engine's
//! service traits: [`PipManager`] runs pip dry-runs and installs as
//! subprocesses, and [`PackageDirLocator`] maps `<package>:<resource>`
//! sources to requirement files on disk.

pub mod client;
pub mod config;
pub mod error;
pub mod locator;
pub mod report;

pub use client::PipManager;
pub use config::PipConfig;
pub use error::{Error, Result};
pub use locator::PackageDirLocator;
pub use report::parse_report;
