//! Finder protocol: an ordered chain of hooks consulted on every
//! import, each producing a spec that says how to materialize the
//! module.

use std::sync::{Arc, PoisonError, RwLock};

use crate::engine::Engine;
use crate::error::Result;
use crate::group::ImportGroup;
use crate::library::ModuleDef;
use crate::module::Module;

/// Recipe for materializing one module.
pub struct ModuleSpec {
    /// Qualified name the spec answers for.
    pub name: String,
    /// Whether the module may contain submodules.
    pub is_package: bool,
    /// Populates the module after it is registered.
    pub loader: Arc<dyn ModuleLoader>,
    /// Group the module joins when it is created deferred.
    pub group: Option<Arc<ImportGroup>>,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, is_package: bool, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            name: name.into(),
            is_package,
            loader,
            group: None,
        }
    }

    pub fn deferred(name: impl Into<String>, group: Arc<ImportGroup>) -> Self {
        Self {
            name: name.into(),
            is_package: true,
            loader: Arc::new(DeferredLoader),
            group: Some(group),
        }
    }
}

/// Answers import requests by name.
///
/// Finders are consulted in chain order; the first `Some` wins.
pub trait ModuleFinder: Send + Sync {
    fn find(&self, name: &str) -> Option<ModuleSpec>;
}

/// Fills a freshly registered module's namespace.
pub trait ModuleLoader: Send + Sync {
    fn exec(&self, module: &Module, engine: &Engine) -> Result<()>;
}

/// Ordered, editable list of finders.
///
/// Lookups iterate a snapshot, so a finder (or the loader it produces)
/// may edit the chain mid-import without deadlocking.
pub struct FinderChain {
    finders: RwLock<Vec<Arc<dyn ModuleFinder>>>,
}

impl FinderChain {
    pub fn new() -> Self {
        Self {
            finders: RwLock::new(Vec::new()),
        }
    }

    /// Insert a finder at the front of the chain, ahead of all others.
    pub fn prepend(&self, finder: Arc<dyn ModuleFinder>) {
        self.write().insert(0, finder);
    }

    /// Append a finder at the back of the chain.
    pub fn append(&self, finder: Arc<dyn ModuleFinder>) {
        self.write().push(finder);
    }

    /// Remove a finder by identity. Returns whether it was present.
    pub fn remove(&self, finder: &Arc<dyn ModuleFinder>) -> bool {
        let target = Arc::as_ptr(finder) as *const ();
        let mut finders = self.write();
        let before = finders.len();
        finders.retain(|f| Arc::as_ptr(f) as *const () != target);
        finders.len() != before
    }

    /// Ask each finder in order; the first spec wins.
    pub fn find(&self, name: &str) -> Option<ModuleSpec> {
        let snapshot: Vec<Arc<dyn ModuleFinder>> = self.read().clone();
        snapshot.iter().find_map(|finder| finder.find(name))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<dyn ModuleFinder>>> {
        self.finders.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<dyn ModuleFinder>>> {
        self.finders.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FinderChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Finder installed by an activation scope.
///
/// Sits at the front of the chain and claims every name, so each import
/// made while the scope is open becomes a deferred member of its group.
pub struct DeferredFinder {
    group: Arc<ImportGroup>,
}

impl DeferredFinder {
    pub(crate) fn new(group: Arc<ImportGroup>) -> Self {
        Self { group }
    }
}

impl ModuleFinder for DeferredFinder {
    fn find(&self, name: &str) -> Option<ModuleSpec> {
        Some(ModuleSpec::deferred(name, self.group.clone()))
    }
}

/// Loader for deferred modules: records group membership and leaves the
/// namespace empty until first use triggers resolution.
pub struct DeferredLoader;

impl ModuleLoader for DeferredLoader {
    fn exec(&self, module: &Module, _engine: &Engine) -> Result<()> {
        if let Some(group) = module.deferred_group() {
            group.register(module);
        }
        Ok(())
    }
}

/// Finder backed by the engine's module library.
pub struct LibraryFinder {
    library: Arc<crate::library::ModuleLibrary>,
}

impl LibraryFinder {
    pub fn new(library: Arc<crate::library::ModuleLibrary>) -> Self {
        Self { library }
    }
}

impl ModuleFinder for LibraryFinder {
    fn find(&self, name: &str) -> Option<ModuleSpec> {
        let def = self.library.get(name)?;
        Some(ModuleSpec::new(
            name,
            def.is_package(),
            Arc::new(LibraryLoader { def }),
        ))
    }
}

/// Loader that runs a library definition's init function.
pub struct LibraryLoader {
    def: Arc<ModuleDef>,
}

impl ModuleLoader for LibraryLoader {
    fn exec(&self, module: &Module, engine: &Engine) -> Result<()> {
        self.def.init(module, engine)
    }
}
