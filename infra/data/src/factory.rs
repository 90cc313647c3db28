use crate::config::{ConsumerKey, DatabaseConfigProvider};
use crate::error::DataError;
use crate::executor::DatabaseExecutor;
use std::sync::Arc;
use tracing::debug;

/// Builds executors configured for a consumer type.
#[derive(Debug, Clone)]
pub struct DatabaseExecutorFactory {
    provider: Arc<DatabaseConfigProvider>,
}

impl DatabaseExecutorFactory {
    #[must_use]
    pub fn new(provider: impl Into<Arc<DatabaseConfigProvider>>) -> Self {
        Self { provider: provider.into() }
    }

    #[must_use]
    pub fn provider(&self) -> &DatabaseConfigProvider {
        &self.provider
    }

    /// # Errors
    /// Fails when no connection string is configured for `C`.
    pub fn create<C: ?Sized + 'static>(&self) -> Result<DatabaseExecutor, DataError> {
        self.create_for(ConsumerKey::of::<C>())
    }

    /// # Errors
    /// See [`DatabaseExecutorFactory::create`].
    pub fn create_for(&self, consumer: ConsumerKey) -> Result<DatabaseExecutor, DataError> {
        let connection_string = self.provider.connection_string_for(consumer)?;
        let kind = self.provider.executor_kind_for(consumer);
        debug!(consumer = consumer.name(), connection = self.provider.connection_name_for(consumer), %kind, "Creating executor");
        DatabaseExecutor::new(connection_string, self.provider.connection_factory_for(consumer), kind)
    }
}
