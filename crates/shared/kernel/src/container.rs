//! A small type-keyed service container.
//!
//! Services are registered per type as a ready instance or as a factory with a
//! [`Lifetime`]. Scoped services resolve only through a [`Scope`], which caches one
//! instance per type for its own lifetime.

use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&Resolver<'_>) -> Result<Instance, ContainerError> + Send + Sync>;
type InstanceCache = Mutex<FxHashMap<TypeId, Instance>>;

#[bootkit_derive::bootkit_error]
pub enum ContainerError {
    #[error("Service not registered{}: {service}", format_context(.context))]
    NotRegistered { service: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Scoped service resolved outside a scope{}: {service}", format_context(.context))]
    ScopeRequired { service: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Service construction failed{}: {message}", format_context(.context))]
    Construction { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal container error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// How long a factory-built service lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Lifetime {
    /// Built once, shared by every resolution.
    Singleton,
    /// Built on every resolution.
    Transient,
    /// Built once per [`Scope`].
    Scoped,
}

enum Registration {
    Instance(Instance),
    Factory { lifetime: Lifetime, factory: Factory },
}

struct Entry {
    service: &'static str,
    registration: Registration,
}

#[derive(Default)]
pub struct ServiceContainer {
    entries: FxHashMap<TypeId, Entry>,
    singletons: InstanceCache,
}

impl ServiceContainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ready instance; replaces any previous registration of `T`.
    pub fn register_instance<T>(&mut self, value: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.insert::<T>(Registration::Instance(Arc::new(value)))
    }

    pub fn register_singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.register_factory(Lifetime::Singleton, factory)
    }

    pub fn register_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.register_factory(Lifetime::Transient, factory)
    }

    pub fn register_scoped<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.register_factory(Lifetime::Scoped, factory)
    }

    pub fn register_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |resolver| factory(resolver).map(|v| Arc::new(v) as Instance));
        self.insert::<T>(Registration::Factory { lifetime, factory })
    }

    #[must_use]
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Lifetime of the registration for `T`; instances report [`Lifetime::Singleton`].
    #[must_use]
    pub fn lifetime<T: 'static>(&self) -> Option<Lifetime> {
        self.entries.get(&TypeId::of::<T>()).map(|e| match e.registration {
            Registration::Instance(_) => Lifetime::Singleton,
            Registration::Factory { lifetime, .. } => lifetime,
        })
    }

    /// Resolves a singleton or transient service.
    ///
    /// # Errors
    /// [`ContainerError::NotRegistered`], [`ContainerError::ScopeRequired`] for scoped
    /// services, or whatever the factory returns.
    pub fn resolve<T>(&self) -> Result<Arc<T>, ContainerError>
    where
        T: Send + Sync + 'static,
    {
        Resolver { container: self, scoped: None }.resolve()
    }

    /// Opens a scope for scoped services.
    #[must_use]
    pub fn begin_scope(&self) -> Scope<'_> {
        Scope { container: self, cache: Mutex::default() }
    }

    fn insert<T: 'static>(&mut self, registration: Registration) -> &mut Self {
        let service = type_name::<T>();
        trace!(service, "Registering service");
        self.entries.insert(TypeId::of::<T>(), Entry { service, registration });
        self
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut services: Vec<_> = self.entries.values().map(|e| e.service).collect();
        services.sort_unstable();
        f.debug_struct("ServiceContainer").field("services", &services).finish_non_exhaustive()
    }
}

/// A resolution scope; scoped services are built once per scope.
pub struct Scope<'a> {
    container: &'a ServiceContainer,
    cache: InstanceCache,
}

impl Scope<'_> {
    /// Resolves any registered service, caching scoped ones in this scope.
    ///
    /// # Errors
    /// [`ContainerError::NotRegistered`] or whatever the factory returns.
    pub fn resolve<T>(&self) -> Result<Arc<T>, ContainerError>
    where
        T: Send + Sync + 'static,
    {
        Resolver { container: self.container, scoped: Some(&self.cache) }.resolve()
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope").field("cached", &self.cache.lock().len()).finish_non_exhaustive()
    }
}

/// Handed to factories so they can resolve their own dependencies.
pub struct Resolver<'a> {
    container: &'a ServiceContainer,
    scoped: Option<&'a InstanceCache>,
}

impl Resolver<'_> {
    /// # Errors
    /// See [`ServiceContainer::resolve`] and [`Scope::resolve`].
    pub fn resolve<T>(&self) -> Result<Arc<T>, ContainerError>
    where
        T: Send + Sync + 'static,
    {
        let id = TypeId::of::<T>();
        let entry = self.container.entries.get(&id).ok_or_else(|| ContainerError::NotRegistered {
            service: type_name::<T>().into(),
            context: None,
        })?;

        let instance = match &entry.registration {
            Registration::Instance(instance) => Arc::clone(instance),
            Registration::Factory { lifetime: Lifetime::Transient, factory } => factory(self)?,
            Registration::Factory { lifetime: Lifetime::Singleton, factory } => {
                // Singletons outlive scopes, so they never see scoped instances.
                let root = Resolver { container: self.container, scoped: None };
                root.cached(&self.container.singletons, id, factory)?
            },
            Registration::Factory { lifetime: Lifetime::Scoped, factory } => {
                let cache = self.scoped.ok_or_else(|| ContainerError::ScopeRequired {
                    service: entry.service.into(),
                    context: None,
                })?;
                self.cached(cache, id, factory)?
            },
        };

        instance.downcast::<T>().map_err(|_| ContainerError::Internal {
            message: format!("registration for {} holds another type", entry.service).into(),
            context: None,
        })
    }

    fn cached(&self, cache: &InstanceCache, id: TypeId, factory: &Factory) -> Result<Instance, ContainerError> {
        if let Some(instance) = cache.lock().get(&id) {
            return Ok(Arc::clone(instance));
        }
        // Built without holding the lock so the factory may resolve its own dependencies.
        let built = factory(self)?;
        Ok(Arc::clone(cache.lock().entry(id).or_insert(built)))
    }
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").field("scoped", &self.scoped.is_some()).finish_non_exhaustive()
    }
}
