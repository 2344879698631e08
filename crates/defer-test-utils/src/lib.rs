//! Shared test utilities for the defer workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only — never published.
//!
//! # Modules
//!
//! - [`logging`] — tracing subscriber setup for test output
//! - [`manager`] — counting/stub implementations of the engine's service traits
//! - [`packages`] — on-disk package tree fixtures with requirement files

pub mod logging;
pub mod manager;
pub mod packages;

pub use manager::{CountingManager, FixedLocator};
pub use packages::PackageRoot;
