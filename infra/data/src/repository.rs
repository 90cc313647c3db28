//! Container registration for executor-backed repositories.

use crate::config::DatabaseConfigProvider;
use crate::error::DataError;
use crate::executor::DatabaseExecutor;
use crate::factory::DatabaseExecutorFactory;
use bootkit_kernel::container::{ContainerError, Resolver, ServiceContainer};
use std::any::type_name;
use std::sync::Arc;

/// A repository built from the executor configured for its own type.
pub trait Repository: Send + Sync + 'static {
    fn new(executor: DatabaseExecutor) -> Self
    where
        Self: Sized;
}

/// Registers a [`DatabaseExecutorFactory`] over `provider`.
pub fn register_executor_factory(
    container: &mut ServiceContainer,
    provider: DatabaseConfigProvider,
) -> &mut ServiceContainer {
    container.register_instance(DatabaseExecutorFactory::new(provider))
}

/// Registers `R` as a scoped service built from an executor created for `R`.
///
/// # Errors
/// [`DataError::Container`] when no [`DatabaseExecutorFactory`] is registered yet.
pub fn register_repository<R: Repository>(container: &mut ServiceContainer) -> Result<(), DataError> {
    ensure_factory::<R>(container)?;
    container.register_scoped(build::<R>);
    Ok(())
}

/// Registers `R` like [`register_repository`] and exposes it as `Arc<I>` too.
///
/// Resolve the interface with `scope.resolve::<Arc<I>>()`; both registrations share the
/// scope's `R` instance.
///
/// # Errors
/// See [`register_repository`].
pub fn register_repository_as<I, R>(
    container: &mut ServiceContainer,
    upcast: fn(Arc<R>) -> Arc<I>,
) -> Result<(), DataError>
where
    I: ?Sized + Send + Sync + 'static,
    R: Repository,
{
    register_repository::<R>(container)?;
    container.register_scoped(move |resolver| resolver.resolve::<R>().map(upcast));
    Ok(())
}

fn ensure_factory<R>(container: &ServiceContainer) -> Result<(), DataError> {
    if container.is_registered::<DatabaseExecutorFactory>() {
        return Ok(());
    }
    Err(DataError::Container {
        source: ContainerError::NotRegistered {
            service: type_name::<DatabaseExecutorFactory>().into(),
            context: None,
        },
        context: Some(format!("Failed to register repository {}", type_name::<R>()).into()),
    })
}

fn build<R: Repository>(resolver: &Resolver<'_>) -> Result<R, ContainerError> {
    let factory = resolver.resolve::<DatabaseExecutorFactory>()?;
    let executor = factory.create::<R>().map_err(|err| ContainerError::Construction {
        message: err.to_string().into(),
        context: Some(type_name::<R>().into()),
    })?;
    Ok(R::new(executor))
}
