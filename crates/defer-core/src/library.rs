//! Module library: named definitions that the default finder serves.
//!
//! A definition pairs a qualified name with an init function. When the
//! engine imports the name, the init function runs against the fresh
//! module and populates its namespace through [`InitContext`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::engine::Engine;
use crate::error::Result;
use crate::module::Module;
use crate::symbol::Symbol;

/// Init function run when a defined module is first imported.
pub type InitFn = Arc<dyn Fn(&InitContext<'_>) -> Result<()> + Send + Sync>;

/// A single loadable module definition.
pub struct ModuleDef {
    name: String,
    is_package: bool,
    init: InitFn,
}

impl ModuleDef {
    /// Define a plain module.
    pub fn module<F>(name: impl Into<String>, init: F) -> Arc<Self>
    where
        F: Fn(&InitContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            is_package: false,
            init: Arc::new(init),
        })
    }

    /// Define a package, able to hold submodules.
    pub fn package<F>(name: impl Into<String>, init: F) -> Arc<Self>
    where
        F: Fn(&InitContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Arc::new(Self {
            name: name.into(),
            is_package: true,
            init: Arc::new(init),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_package(&self) -> bool {
        self.is_package
    }

    /// Run the init function against a freshly created module.
    pub(crate) fn init(&self, module: &Module, engine: &Engine) -> Result<()> {
        let ctx = InitContext { engine, module };
        (self.init)(&ctx)
    }
}

/// Collection of module definitions, keyed by qualified name.
pub struct ModuleLibrary {
    defs: RwLock<HashMap<String, Arc<ModuleDef>>>,
}

impl ModuleLibrary {
    pub fn new() -> Self {
        Self {
            defs: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a prepared definition, replacing any previous one.
    pub fn insert(&self, def: Arc<ModuleDef>) {
        self.write().insert(def.name().to_string(), def);
    }

    /// Define a plain module in place.
    pub fn define<F>(&self, name: impl Into<String>, init: F)
    where
        F: Fn(&InitContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.insert(ModuleDef::module(name, init));
    }

    /// Define a package in place.
    pub fn define_package<F>(&self, name: impl Into<String>, init: F)
    where
        F: Fn(&InitContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.insert(ModuleDef::package(name, init));
    }

    pub fn get(&self, name: &str) -> Option<Arc<ModuleDef>> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Sorted names of all definitions.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<ModuleDef>>> {
        self.defs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<ModuleDef>>> {
        self.defs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ModuleLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle given to init functions while their module loads.
pub struct InitContext<'a> {
    engine: &'a Engine,
    module: &'a Module,
}

impl InitContext<'_> {
    /// Bind a name in the loading module's namespace.
    pub fn export(&self, name: impl Into<String>, value: Symbol) {
        self.module.bind(name, value);
    }

    /// Import another module while this one loads.
    pub fn import(&self, name: &str) -> Result<Module> {
        self.engine.import_module(name)
    }

    /// Qualified name of the module being initialized.
    pub fn module_name(&self) -> &str {
        self.module.name()
    }

    pub fn engine(&self) -> &Engine {
        self.engine
    }
}
