use crate::bootstrap::error::{BootstrapError, UnitResult};
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, trace};

/// Stable identifier of a lifecycle hook; registering an id twice is a no-op.
pub type HookId = Cow<'static, str>;

type Hook<C> = Box<dyn FnMut(&mut C) -> UnitResult>;

/// Which side of unit configuration a hook list runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum HookPhase {
    PreInitialization,
    PostInitialization,
}

/// Ordered, id-deduplicated list of callbacks over a container.
pub struct LifecycleHooks<C> {
    phase: HookPhase,
    entries: Vec<(HookId, Hook<C>)>,
}

impl<C> LifecycleHooks<C> {
    #[must_use]
    pub const fn new(phase: HookPhase) -> Self {
        Self { phase, entries: Vec::new() }
    }

    /// Appends `hook` unless `id` is already present. Returns whether it was added.
    pub fn add<F>(&mut self, id: impl Into<HookId>, hook: F) -> bool
    where
        F: FnMut(&mut C) -> UnitResult + 'static,
    {
        let id = id.into();
        if self.contains(&id) {
            debug!(phase = %self.phase, hook = %id, "Hook already registered, ignoring");
            return false;
        }
        self.entries.push((id, Box::new(hook)));
        true
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_ref())
    }

    /// Runs every hook in registration order; the first failure stops the run.
    pub(crate) fn run(&mut self, container: &mut C) -> Result<(), BootstrapError> {
        let phase = self.phase;
        for (id, hook) in &mut self.entries {
            trace!(phase = %phase, hook = %id, "Running hook");
            hook(container).map_err(|source| BootstrapError::Hook {
                source,
                context: Some(format!("{phase} hook '{id}'").into()),
            })?;
        }
        Ok(())
    }
}

impl<C> fmt::Debug for LifecycleHooks<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("phase", &self.phase)
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}
