use crate::bootstrap::configuration::BootstrapConfiguration;
use crate::bootstrap::error::{BootstrapError, BootstrapErrorExt, UnitResult};
use crate::bootstrap::hooks::{HookId, HookPhase, LifecycleHooks};
use crate::bootstrap::unit::BoxedContainerUnit;
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, info, instrument};

type ContainerFactory<C> = Box<dyn FnOnce() -> C>;
type UnitDiscovery<C, S> = Box<dyn FnMut() -> Vec<BoxedContainerUnit<C, S>>>;

/// Lifecycle position of a bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum BootstrapState {
    Constructed,
    Initialized,
    /// A hook or unit failed; the container may be partially configured.
    Failed,
}

/// Populates a container from discovered configuration units.
///
/// The container is created when the bootstrap is built. [`ContainerBootstrap::initialize`]
/// then runs the pre-initialization hooks, every non-excluded unit in discovery order, and
/// the post-initialization hooks, exactly once.
pub struct ContainerBootstrap<C, S> {
    container: C,
    configuration: BootstrapConfiguration<S>,
    discovery: UnitDiscovery<C, S>,
    pre_hooks: LifecycleHooks<C>,
    post_hooks: LifecycleHooks<C>,
    state: BootstrapState,
}

impl<C, S> ContainerBootstrap<C, S> {
    #[must_use]
    pub fn builder() -> ContainerBootstrapBuilder<C, S> {
        ContainerBootstrapBuilder::default()
    }

    /// Registers a hook to run before any unit; a repeated `id` is ignored.
    pub fn add_pre_initialization_action<F>(&mut self, id: impl Into<HookId>, hook: F) -> &mut Self
    where
        F: FnMut(&mut C) -> UnitResult + 'static,
    {
        self.pre_hooks.add(id, hook);
        self
    }

    /// Registers a hook to run after every unit; a repeated `id` is ignored.
    pub fn add_post_initialization_action<F>(&mut self, id: impl Into<HookId>, hook: F) -> &mut Self
    where
        F: FnMut(&mut C) -> UnitResult + 'static,
    {
        self.post_hooks.add(id, hook);
        self
    }

    /// Runs the lifecycle.
    ///
    /// # Errors
    /// * [`BootstrapError::AlreadyInitialized`] on any call after the first.
    /// * [`BootstrapError::Hook`] / [`BootstrapError::Unit`] for the first failing step;
    ///   the remaining steps are not run.
    #[instrument(name = "bootstrap.initialize", skip_all)]
    pub fn initialize(&mut self) -> Result<(), BootstrapError> {
        if self.state != BootstrapState::Constructed {
            return Err(BootstrapError::AlreadyInitialized {
                bootstrap: Cow::Borrowed(std::any::type_name::<Self>()),
                context: Some(format!("state: {}", self.state).into()),
            });
        }

        let result = self.run();
        self.state =
            if result.is_ok() { BootstrapState::Initialized } else { BootstrapState::Failed };
        result
    }

    fn run(&mut self) -> Result<(), BootstrapError> {
        info!(
            pre_hooks = self.pre_hooks.len(),
            post_hooks = self.post_hooks.len(),
            excluded = self.configuration.excluded().len(),
            "Initializing container"
        );

        self.pre_hooks.run(&mut self.container)?;

        let units = (self.discovery)();
        let (mut configured, mut skipped) = (0_usize, 0_usize);
        for unit in units {
            let name = unit.name();
            if name.trim().is_empty() || self.configuration.excluded().contains(&name) {
                debug!(unit = %name, "Skipping unit");
                skipped += 1;
                continue;
            }

            debug!(unit = %name, "Configuring unit");
            unit.configure(&mut self.container, self.configuration.settings()).context(name)?;
            configured += 1;
        }

        self.post_hooks.run(&mut self.container)?;

        info!(configured, skipped, "Container initialized");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> BootstrapState {
        self.state
    }

    #[must_use]
    pub const fn container(&self) -> &C {
        &self.container
    }

    pub const fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    #[must_use]
    pub const fn configuration(&self) -> &BootstrapConfiguration<S> {
        &self.configuration
    }

    #[must_use]
    pub fn into_container(self) -> C {
        self.container
    }
}

impl<C, S: fmt::Debug> fmt::Debug for ContainerBootstrap<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBootstrap")
            .field("state", &self.state)
            .field("configuration", &self.configuration)
            .field("pre_hooks", &self.pre_hooks)
            .field("post_hooks", &self.post_hooks)
            .finish_non_exhaustive()
    }
}

/// Validating builder for [`ContainerBootstrap`]; every part is required.
pub struct ContainerBootstrapBuilder<C, S> {
    configuration: Option<BootstrapConfiguration<S>>,
    container_factory: Option<ContainerFactory<C>>,
    discovery: Option<UnitDiscovery<C, S>>,
}

impl<C, S> Default for ContainerBootstrapBuilder<C, S> {
    fn default() -> Self {
        Self { configuration: None, container_factory: None, discovery: None }
    }
}

impl<C, S> ContainerBootstrapBuilder<C, S> {
    #[must_use]
    pub fn configuration(mut self, configuration: BootstrapConfiguration<S>) -> Self {
        self.configuration = Some(configuration);
        self
    }

    #[must_use]
    pub fn container_factory<F>(mut self, factory: F) -> Self
    where
        F: FnOnce() -> C + 'static,
    {
        self.container_factory = Some(Box::new(factory));
        self
    }

    /// Source of configuration units, called once by `initialize`.
    #[must_use]
    pub fn discovery<F>(mut self, discovery: F) -> Self
    where
        F: FnMut() -> Vec<BoxedContainerUnit<C, S>> + 'static,
    {
        self.discovery = Some(Box::new(discovery));
        self
    }

    /// Validates the parts and creates the container.
    ///
    /// # Errors
    /// [`BootstrapError::MissingArgument`] naming the first absent part.
    pub fn build(self) -> Result<ContainerBootstrap<C, S>, BootstrapError> {
        let configuration = self.configuration.ok_or_else(|| BootstrapError::missing("configuration"))?;
        let container_factory =
            self.container_factory.ok_or_else(|| BootstrapError::missing("container_factory"))?;
        let discovery = self.discovery.ok_or_else(|| BootstrapError::missing("discovery"))?;

        Ok(ContainerBootstrap {
            container: container_factory(),
            configuration,
            discovery,
            pre_hooks: LifecycleHooks::new(HookPhase::PreInitialization),
            post_hooks: LifecycleHooks::new(HookPhase::PostInitialization),
            state: BootstrapState::Constructed,
        })
    }
}

impl<C, S: fmt::Debug> fmt::Debug for ContainerBootstrapBuilder<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBootstrapBuilder")
            .field("configuration", &self.configuration)
            .field("container_factory", &self.container_factory.is_some())
            .field("discovery", &self.discovery.is_some())
            .finish()
    }
}
