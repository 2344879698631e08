//! Activation scopes: the window during which imports become deferred
//! members of a group.

use std::fmt;
use std::sync::Arc;

use crate::finder::{DeferredFinder, ModuleFinder};
use crate::group::ImportGroup;

/// Guard holding a group's finder at the front of the chain.
///
/// While the guard lives, every import resolves to a deferred proxy in
/// the group. Dropping it removes the finder and halts the members'
/// registry entries until the group resolves.
#[must_use = "imports are only deferred while the scope is held"]
pub struct ActivationScope {
    group: Arc<ImportGroup>,
    finder: Arc<dyn ModuleFinder>,
}

impl ActivationScope {
    pub(crate) fn enter(group: &Arc<ImportGroup>) -> Self {
        let finder: Arc<dyn ModuleFinder> = Arc::new(DeferredFinder::new(group.clone()));
        group.engine().chain().prepend(finder.clone());
        tracing::debug!(
            group = %group.name().unwrap_or("unnamed"),
            requires = %group.requires(),
            "activation scope opened"
        );
        Self {
            group: group.clone(),
            finder,
        }
    }

    /// The group this scope feeds.
    pub fn group(&self) -> &Arc<ImportGroup> {
        &self.group
    }
}

impl Drop for ActivationScope {
    fn drop(&mut self) {
        self.group.engine().chain().remove(&self.finder);
        self.group.lock();
        tracing::debug!(
            group = %self.group.name().unwrap_or("unnamed"),
            "activation scope closed"
        );
    }
}

impl fmt::Debug for ActivationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationScope")
            .field("group", &self.group)
            .finish()
    }
}
