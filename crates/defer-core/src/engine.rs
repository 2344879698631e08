//! Import engine: owns the registry, the finder chain, and the module
//! library, and drives the dotted-name import walk.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::finder::{FinderChain, LibraryFinder};
use crate::group::ImportGroup;
use crate::library::ModuleLibrary;
use crate::manager::{PackageManager, RequirementLocator};
use crate::module::Module;
use crate::registry::ModuleRegistry;
use crate::symbol::Symbol;

struct EngineState {
    registry: ModuleRegistry,
    chain: FinderChain,
    library: Arc<ModuleLibrary>,
    manager: Arc<dyn PackageManager>,
    locator: Arc<dyn RequirementLocator>,
}

/// Shared import state: one registry, one finder chain, one library.
///
/// Cheap to clone; every clone works on the same state. Groups, scopes,
/// and proxies all carry a handle back to the engine they were created
/// under, so nothing goes through ambient globals.
#[derive(Clone)]
pub struct Engine {
    state: Arc<EngineState>,
}

impl Engine {
    /// Build an engine over a package manager and a requirement locator.
    ///
    /// The finder chain starts with a single library finder; activation
    /// scopes prepend theirs in front of it.
    pub fn new(manager: Arc<dyn PackageManager>, locator: Arc<dyn RequirementLocator>) -> Self {
        let library = Arc::new(ModuleLibrary::new());
        let chain = FinderChain::new();
        chain.append(Arc::new(LibraryFinder::new(library.clone())));
        Self {
            state: Arc::new(EngineState {
                registry: ModuleRegistry::new(),
                chain,
                library,
                manager,
                locator,
            }),
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.state.registry
    }

    pub fn chain(&self) -> &FinderChain {
        &self.state.chain
    }

    pub fn library(&self) -> &Arc<ModuleLibrary> {
        &self.state.library
    }

    pub fn package_manager(&self) -> &Arc<dyn PackageManager> {
        &self.state.manager
    }

    pub fn locator(&self) -> &Arc<dyn RequirementLocator> {
        &self.state.locator
    }

    /// Declare an import group over a `<package>:<resource>` source.
    pub fn group(&self, requires: &str) -> Result<Arc<ImportGroup>> {
        ImportGroup::new(self, requires)
    }

    /// Declare a labeled import group.
    pub fn named_group(&self, requires: &str, name: impl Into<String>) -> Result<Arc<ImportGroup>> {
        ImportGroup::named(self, requires, name)
    }

    /// Import a module by qualified name.
    ///
    /// The registry is consulted before the finder chain, so a loaded
    /// module is returned as-is and a halted name fails no matter which
    /// finders are active. On a miss, each dotted prefix is imported in
    /// order and every freshly loaded child is bound into its parent's
    /// namespace.
    pub fn import_module(&self, name: &str) -> Result<Module> {
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return Err(Error::NotFound {
                name: name.to_string(),
            });
        }

        if let Some(hit) = self.state.registry.lookup(name)? {
            return Ok(hit);
        }

        let mut parent: Option<Module> = None;
        let mut qualified = String::new();
        for segment in name.split('.') {
            if !qualified.is_empty() {
                qualified.push('.');
            }
            qualified.push_str(segment);

            let module = match self.state.registry.lookup(&qualified)? {
                Some(hit) => hit,
                None => {
                    let module = self.import_single(&qualified, parent.as_ref())?;
                    if let Some(parent) = &parent {
                        parent.bind(segment, Symbol::Module(module.clone()));
                    }
                    module
                }
            };
            parent = Some(module);
        }

        parent.ok_or_else(|| Error::NotFound {
            name: name.to_string(),
        })
    }

    /// Import one qualified name, without walking prefixes.
    ///
    /// The module is registered before its loader runs, so loads may
    /// import each other cyclically; a failed load is unregistered
    /// again.
    fn import_single(&self, name: &str, parent: Option<&Module>) -> Result<Module> {
        if let Some(parent) = parent {
            if !parent.is_package() {
                return Err(Error::ParentNotPackage {
                    name: name.to_string(),
                    parent: parent.name().to_string(),
                });
            }
        }

        let spec = self.state.chain.find(name).ok_or_else(|| Error::NotFound {
            name: name.to_string(),
        })?;

        let module = match spec.group.clone() {
            Some(group) => Module::new_deferred(name, group),
            None => Module::new_ready(name, spec.is_package),
        };

        self.state.registry.insert(name, module.clone());
        if let Err(err) = spec.loader.exec(&module, self) {
            self.state.registry.remove(name);
            return Err(err);
        }

        tracing::debug!(module = %name, deferred = module.is_deferred(), "module imported");
        Ok(module)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.state.registry.len())
            .field("finders", &self.state.chain.len())
            .field("library", &self.state.library.len())
            .finish()
    }
}
