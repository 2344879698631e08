//! Import groups: batches of deferred names sharing one dependency
//! installation and one resolution event.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::engine::Engine;
use crate::error::Result;
use crate::module::{Module, ModuleInner};
use crate::scope::ActivationScope;
use crate::source::RequirementSource;

/// A declared dependency bundle.
///
/// Every module imported while the group's activation scope is open
/// becomes a member. The group owns the requirement source, the registry
/// lock/unlock fan-out over its members, and the install-exactly-once
/// resolution step. Proxies keep a strong reference to their group, so a
/// group stays alive as long as any of its members does; locked members
/// may be reactivated at any future time.
pub struct ImportGroup {
    requires: RequirementSource,
    name: Option<String>,
    engine: Engine,
    members: Mutex<HashMap<String, Weak<ModuleInner>>>,
    installed: Mutex<bool>,
}

impl ImportGroup {
    /// Declare a group over a `<package>:<resource>` requirement source.
    pub fn new(engine: &Engine, requires: &str) -> Result<Arc<Self>> {
        Self::build(engine, requires, None)
    }

    /// Declare a labeled group.
    pub fn named(engine: &Engine, requires: &str, name: impl Into<String>) -> Result<Arc<Self>> {
        Self::build(engine, requires, Some(name.into()))
    }

    fn build(engine: &Engine, requires: &str, name: Option<String>) -> Result<Arc<Self>> {
        let requires = RequirementSource::parse(requires)?;
        Ok(Arc::new(Self {
            requires,
            name,
            engine: engine.clone(),
            members: Mutex::new(HashMap::new()),
            installed: Mutex::new(false),
        }))
    }

    /// The group's requirement source.
    pub fn requires(&self) -> &RequirementSource {
        &self.requires
    }

    /// Optional label given at declaration.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the dependency set has been installed.
    pub fn resolved(&self) -> bool {
        *self.installed()
    }

    /// Sorted qualified names of the registered members.
    pub fn member_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members().keys().cloned().collect();
        names.sort();
        names
    }

    /// Open an activation scope for this group.
    ///
    /// While the returned guard lives, every import is answered with a
    /// proxy bound to this group; dropping it locks the members.
    pub fn activate(self: &Arc<Self>) -> ActivationScope {
        ActivationScope::enter(self)
    }

    /// Record a proxy as a member of this group.
    pub(crate) fn register(&self, module: &Module) {
        tracing::debug!(group = %self.label(), module = %module.name(), "registered deferred member");
        self.members()
            .insert(module.name().to_string(), module.downgrade());
    }

    /// Halt every member's registry entry that is still proxy-owned.
    ///
    /// An entry some other mechanism already replaced with a
    /// genuinely-loaded module is left untouched (identity check in the
    /// registry).
    pub fn lock(&self) {
        let members = self.members();
        let registry = self.engine.registry();
        for (name, weak) in members.iter() {
            if let Some(module) = Module::upgrade(weak) {
                if registry.halt_if_is(name, &module) {
                    tracing::debug!(group = %self.label(), module = %name, "halted member");
                }
            }
        }
    }

    /// Remove every member's halted registry entry, restoring normal
    /// resolvability. Entries in any other state are left untouched.
    pub fn unlock(&self) {
        let members = self.members();
        let registry = self.engine.registry();
        for name in members.keys() {
            if registry.clear_halt(name) {
                tracing::debug!(group = %self.label(), module = %name, "unlocked member");
            }
        }
    }

    /// Install the group's dependency set, at most once.
    ///
    /// Locates the requirement file, queries the package manager for the
    /// pending changes, announces each one, and — only when something is
    /// pending — performs the real installation. A failure leaves the
    /// group unresolved so a later access retries; concurrent callers are
    /// serialized on the install flag's mutex.
    pub fn resolve(&self) -> Result<()> {
        let mut installed = self.installed();
        if *installed {
            return Ok(());
        }

        let requirements = self.engine.locator().locate(&self.requires)?;
        tracing::debug!(
            group = %self.label(),
            requirements = ?requirements,
            "querying pending dependency changes"
        );

        let report = self.engine.package_manager().dry_run(&requirements)?;
        for change in &report.pending {
            println!("{}", change.describe());
        }

        if !report.is_empty() {
            self.engine.package_manager().install(&requirements)?;
        }

        *installed = true;
        tracing::info!(group = %self.label(), "dependency set resolved");
        Ok(())
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.requires.to_string())
    }

    fn members(&self) -> MutexGuard<'_, HashMap<String, Weak<ModuleInner>>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn installed(&self) -> MutexGuard<'_, bool> {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ImportGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportGroup")
            .field("requires", &self.requires.to_string())
            .field("name", &self.name)
            .field("resolved", &self.resolved())
            .field("members", &self.member_names())
            .finish()
    }
}
