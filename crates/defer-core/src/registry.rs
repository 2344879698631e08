//! Shared module registry.
//!
//! The registry is the single process-wide mapping from qualified name to
//! loaded module. It is always injected (owned by an
//! [`Engine`](crate::engine::Engine)), never ambient global state, so the
//! whole locking discipline can be exercised against a fresh instance in
//! tests.
//!
//! A name can be mapped to the *halted* sentinel instead of a module:
//! halted names must not resolve via direct lookup until their import
//! group clears them. Halted is distinct from absent — an absent name
//! proceeds to normal resolution, a halted one fails deterministically.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};
use crate::module::Module;

/// A registry slot for a qualified name.
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    /// A loaded module object (possibly an unresolved proxy).
    Loaded(Module),
    /// Direct lookup of this name is locked pending group resolution.
    Halted,
}

/// Process-wide mapping from qualified name to module, with the halted
/// sentinel used by import-group locking.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    entries: Mutex<HashMap<String, RegistryEntry>>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, RegistryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a name for import.
    ///
    /// Returns the loaded module if present, `None` if the name is absent
    /// (normal resolution should proceed), or [`Error::Halted`] if the
    /// name is locked.
    pub fn lookup(&self, name: &str) -> Result<Option<Module>> {
        match self.entries().get(name) {
            Some(RegistryEntry::Loaded(module)) => Ok(Some(module.clone())),
            Some(RegistryEntry::Halted) => Err(Error::Halted {
                name: name.to_string(),
            }),
            None => Ok(None),
        }
    }

    /// Record a loaded module under its qualified name.
    pub fn insert(&self, name: &str, module: Module) {
        self.entries()
            .insert(name.to_string(), RegistryEntry::Loaded(module));
    }

    /// Drop an entry entirely (used when a load fails after insertion).
    pub fn remove(&self, name: &str) {
        self.entries().remove(name);
    }

    /// Replace the entry for `name` with the halted sentinel, but only if
    /// it currently holds exactly `module`. Returns whether the entry was
    /// halted.
    ///
    /// The identity guard means a name that some other mechanism already
    /// replaced with a genuinely-loaded module is left untouched.
    pub fn halt_if_is(&self, name: &str, module: &Module) -> bool {
        let mut entries = self.entries();
        match entries.get(name) {
            Some(RegistryEntry::Loaded(current)) if Module::same(current, module) => {
                entries.insert(name.to_string(), RegistryEntry::Halted);
                true
            }
            _ => false,
        }
    }

    /// Remove a halted entry for `name`, restoring normal resolvability.
    /// Entries that are not halted are left untouched. Returns whether an
    /// entry was removed.
    pub fn clear_halt(&self, name: &str) -> bool {
        let mut entries = self.entries();
        match entries.get(name) {
            Some(RegistryEntry::Halted) => {
                entries.remove(name);
                true
            }
            _ => false,
        }
    }

    /// Whether `name` is currently mapped to the halted sentinel.
    pub fn is_halted(&self, name: &str) -> bool {
        matches!(self.entries().get(name), Some(RegistryEntry::Halted))
    }

    /// Whether `name` has any entry (loaded or halted).
    pub fn contains(&self, name: &str) -> bool {
        self.entries().contains_key(name)
    }

    /// Sorted names of all loaded (non-halted) entries.
    pub fn loaded_names(&self) -> Vec<String> {
        let entries = self.entries();
        let mut names: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| matches!(entry, RegistryEntry::Loaded(_)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Number of entries, halted included.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().len() == 0
    }
}
