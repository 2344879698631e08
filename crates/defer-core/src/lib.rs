//! Deferred import groups for module loading.
//!
//! This crate provides the resolution engine: import groups that batch
//! dependency installation, activation scopes that turn imports into
//! deferred proxies, the module registry with halt semantics, and the
//! finder chain the engine walks on every import.

pub mod engine;
pub mod error;
pub mod finder;
pub mod group;
pub mod library;
pub mod manager;
pub mod module;
pub mod registry;
pub mod scope;
pub mod source;
pub mod symbol;

pub use engine::Engine;
pub use error::{Error, InstallError, LocateError, Result};
pub use finder::{DeferredFinder, FinderChain, LibraryFinder, ModuleFinder, ModuleLoader, ModuleSpec};
pub use group::ImportGroup;
pub use library::{InitContext, InitFn, ModuleDef, ModuleLibrary};
pub use manager::{InstallReport, PackageChange, PackageManager, RequirementLocator};
pub use module::{Module, real_module};
pub use registry::{ModuleRegistry, RegistryEntry};
pub use scope::ActivationScope;
pub use source::RequirementSource;
pub use symbol::{NativeFn, Symbol};
