//! Module objects and the deferred-resolution protocol.
//!
//! A [`Module`] is a cheap cloneable handle with stable identity: every
//! clone points at the same module object. Loaded modules carry their
//! exports in a namespace; deferred modules (proxies created while an
//! activation scope was intercepting imports) carry their owning group
//! instead, and transform themselves on first use.
//!
//! The transformation is a tagged-state dispatch rather than an in-place
//! type rewrite: a namespace miss on a `Deferred` module unlocks and
//! resolves the group, loads the real module through the ordinary path,
//! merges the real exports into the proxy's namespace (shared handles, so
//! per-attribute identity is preserved) and records the real module. The
//! proxy stays a distinct object; [`real_module`] recovers the backing
//! module. All bookkeeping lives in struct fields, so a real attribute can
//! never collide with it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use crate::error::{Error, Result};
use crate::group::ImportGroup;
use crate::symbol::Symbol;

pub(crate) struct ModuleInner {
    name: String,
    is_package: bool,
    namespace: RwLock<BTreeMap<String, Symbol>>,
    state: Mutex<ModuleState>,
}

enum ModuleState {
    /// Loaded (or resolved proxy). `real` is the backing module when this
    /// object started life as a proxy, `None` for genuine modules.
    Ready { real: Option<Module> },
    /// Proxy awaiting first use.
    Deferred { group: Arc<ImportGroup> },
    /// First use in progress; observers see plain namespace behavior.
    Resolving,
}

/// Shared handle to a module object.
#[derive(Clone)]
pub struct Module {
    inner: Arc<ModuleInner>,
}

impl Module {
    pub(crate) fn new_ready(name: &str, is_package: bool) -> Self {
        Self::with_state(name, is_package, ModuleState::Ready { real: None })
    }

    /// Deferred modules are always treated as packages so that sub-name
    /// imports are interceptable too.
    pub(crate) fn new_deferred(name: &str, group: Arc<ImportGroup>) -> Self {
        Self::with_state(name, true, ModuleState::Deferred { group })
    }

    fn with_state(name: &str, is_package: bool, state: ModuleState) -> Self {
        Self {
            inner: Arc::new(ModuleInner {
                name: name.to_string(),
                is_package,
                namespace: RwLock::new(BTreeMap::new()),
                state: Mutex::new(state),
            }),
        }
    }

    /// Qualified name of the module.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether the module may contain submodules.
    pub fn is_package(&self) -> bool {
        self.inner.is_package
    }

    /// Whether two handles refer to the same module object.
    pub fn same(a: &Module, b: &Module) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Whether this module is an unresolved proxy.
    pub fn is_deferred(&self) -> bool {
        matches!(*self.state(), ModuleState::Deferred { .. })
    }

    /// Attribute access with deferred-resolution dispatch.
    ///
    /// A hit in the namespace is returned as-is. A miss on a deferred
    /// module triggers resolution — unlock the group, install its
    /// dependency set, load the real module, merge — and is then retried.
    /// A miss anywhere else is [`Error::AttributeNotFound`].
    pub fn attr(&self, name: &str) -> Result<Symbol> {
        if let Some(symbol) = self.get(name) {
            return Ok(symbol);
        }

        if let Some(group) = self.begin_resolution() {
            if let Err(err) = self.resolve_via(&group) {
                // Leave the proxy deferred so a later access retries.
                tracing::warn!(module = %self.name(), error = %err, "deferred resolution failed");
                *self.state() = ModuleState::Deferred { group };
                return Err(err);
            }
            if let Some(symbol) = self.get(name) {
                return Ok(symbol);
            }
        }

        Err(Error::AttributeNotFound {
            module: self.name().to_string(),
            name: name.to_string(),
        })
    }

    /// Call the function exported under `name`.
    pub fn call_attr(&self, name: &str, args: &[Symbol]) -> Result<Symbol> {
        match self.attr(name)? {
            Symbol::Func(f) => f(args),
            other => Err(Error::NotCallable {
                module: self.name().to_string(),
                name: name.to_string(),
                kind: other.kind(),
            }),
        }
    }

    /// Raw namespace read. Never triggers resolution.
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.namespace_read().get(name).cloned()
    }

    /// Sorted names of the current namespace entries.
    pub fn exports(&self) -> Vec<String> {
        self.namespace_read().keys().cloned().collect()
    }

    /// Insert a symbol directly into the namespace.
    ///
    /// Used by module init contexts and by the import machinery when it
    /// binds a loaded child into its parent; deliberately bypasses the
    /// deferred dispatch.
    pub(crate) fn bind(&self, name: impl Into<String>, value: Symbol) {
        self.namespace_write().insert(name.into(), value);
    }

    pub(crate) fn downgrade(&self) -> Weak<ModuleInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<ModuleInner>) -> Option<Module> {
        weak.upgrade().map(|inner| Module { inner })
    }

    pub(crate) fn deferred_group(&self) -> Option<Arc<ImportGroup>> {
        match &*self.state() {
            ModuleState::Deferred { group } => Some(group.clone()),
            _ => None,
        }
    }

    /// Flip `Deferred` to `Resolving`, handing back the owning group.
    /// Any other state returns `None` and leaves the tag alone, so the
    /// trigger runs at most once per proxy at a time.
    fn begin_resolution(&self) -> Option<Arc<ImportGroup>> {
        let mut state = self.state();
        match &*state {
            ModuleState::Deferred { group } => {
                let group = group.clone();
                *state = ModuleState::Resolving;
                Some(group)
            }
            _ => None,
        }
    }

    fn resolve_via(&self, group: &Arc<ImportGroup>) -> Result<()> {
        tracing::debug!(module = %self.name(), "first use of deferred module");
        group.unlock();
        group.resolve()?;

        let real = group.engine().import_module(self.name())?;
        let recorded = if Module::same(&real, self) {
            // The ordinary load found this very proxy (the scope is still
            // active); there is nothing to merge and no backing module.
            None
        } else {
            self.merge_from(&real);
            Some(real)
        };
        *self.state() = ModuleState::Ready { real: recorded };
        Ok(())
    }

    /// Copy the other module's exports into this namespace. Entries are
    /// cloned handles, so identity is shared with the source.
    fn merge_from(&self, other: &Module) {
        let entries: Vec<(String, Symbol)> = other
            .namespace_read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut namespace = self.namespace_write();
        for (name, value) in entries {
            namespace.insert(name, value);
        }
    }

    fn state(&self) -> MutexGuard<'_, ModuleState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn namespace_read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Symbol>> {
        self.inner
            .namespace
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn namespace_write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Symbol>> {
        self.inner
            .namespace
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn state_label(&self) -> &'static str {
        match &*self.state() {
            ModuleState::Ready { real: Some(_) } => "resolved",
            ModuleState::Ready { real: None } => "loaded",
            ModuleState::Deferred { .. } => "deferred",
            ModuleState::Resolving => "resolving",
        }
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.inner.name)
            .field("state", &self.state_label())
            .finish()
    }
}

/// The real module behind a resolved proxy, or the module itself.
///
/// Pure: never triggers resolution, never fails.
pub fn real_module(module: &Module) -> Module {
    match &*module.state() {
        ModuleState::Ready { real: Some(real) } => real.clone(),
        _ => module.clone(),
    }
}
