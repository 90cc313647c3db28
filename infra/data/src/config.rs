//! Per-consumer database configuration.
//!
//! Every consumer type (typically a repository) can override the connection name, the
//! connection factory and the executor kind; anything not overridden falls back to the
//! defaults set on the builder.

use crate::connection::ConnectionFactory;
use crate::error::DataError;
use bootkit_domain::ExecutorKind;
use bootkit_domain::config::DatabaseConfig;
use bootkit_kernel::Settings;
use fxhash::FxHashMap;
use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// Settings provider shared by the data layer.
pub type SharedSettings = Arc<dyn Settings + Send + Sync>;

/// Identifies the type a mapping applies to.
#[derive(Clone, Copy)]
pub struct ConsumerKey {
    id: TypeId,
    name: &'static str,
}

impl ConsumerKey {
    #[must_use]
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self { id: TypeId::of::<C>(), name: type_name::<C>() }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ConsumerKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConsumerKey {}

impl Hash for ConsumerKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ConsumerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Builder for [`DatabaseConfigProvider`].
#[derive(Default)]
pub struct DatabaseConfigProviderBuilder {
    default_connection_name: Option<String>,
    default_connection_factory: Option<ConnectionFactory>,
    default_executor_kind: ExecutorKind,
    executor_kinds: FxHashMap<ConsumerKey, ExecutorKind>,
    connection_names: FxHashMap<ConsumerKey, String>,
    connection_factories: FxHashMap<ConsumerKey, ConnectionFactory>,
}

impl DatabaseConfigProviderBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the defaults from the `[database]` config section.
    #[must_use]
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new()
            .default_connection_name(config.default_connection.clone())
            .default_executor_kind(config.executor_kind)
    }

    #[must_use]
    pub fn default_connection_name(mut self, name: impl Into<String>) -> Self {
        self.default_connection_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn default_connection_factory(mut self, factory: ConnectionFactory) -> Self {
        self.default_connection_factory = Some(factory);
        self
    }

    #[must_use]
    pub const fn default_executor_kind(mut self, kind: ExecutorKind) -> Self {
        self.default_executor_kind = kind;
        self
    }

    #[must_use]
    pub fn executor_mappings(mut self, mappings: impl IntoIterator<Item = (ConsumerKey, ExecutorKind)>) -> Self {
        self.executor_kinds.extend(mappings);
        self
    }

    #[must_use]
    pub fn connection_name_mappings<N>(mut self, mappings: impl IntoIterator<Item = (ConsumerKey, N)>) -> Self
    where
        N: Into<String>,
    {
        self.connection_names.extend(mappings.into_iter().map(|(k, n)| (k, n.into())));
        self
    }

    #[must_use]
    pub fn connection_factory_mappings(
        mut self,
        mappings: impl IntoIterator<Item = (ConsumerKey, ConnectionFactory)>,
    ) -> Self {
        self.connection_factories.extend(mappings);
        self
    }

    #[must_use]
    pub fn map_executor<C: ?Sized + 'static>(self, kind: ExecutorKind) -> Self {
        self.executor_mappings([(ConsumerKey::of::<C>(), kind)])
    }

    #[must_use]
    pub fn map_connection_name<C: ?Sized + 'static>(self, name: impl Into<String>) -> Self {
        self.connection_name_mappings([(ConsumerKey::of::<C>(), name.into())])
    }

    #[must_use]
    pub fn map_connection_factory<C: ?Sized + 'static>(self, factory: ConnectionFactory) -> Self {
        self.connection_factory_mappings([(ConsumerKey::of::<C>(), factory)])
    }

    /// # Errors
    /// [`DataError::Configuration`] when the default connection name is blank or the
    /// default connection factory is missing.
    pub fn build(self, settings: SharedSettings) -> Result<DatabaseConfigProvider, DataError> {
        let default_connection_name = self
            .default_connection_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| DataError::Configuration {
                message: "default connection name must be set before building".into(),
                context: None,
            })?;
        let default_connection_factory = self.default_connection_factory.ok_or_else(|| DataError::Configuration {
            message: "default connection factory must be set before building".into(),
            context: None,
        })?;

        debug!(
            default_connection = %default_connection_name,
            default_kind = %self.default_executor_kind,
            name_mappings = self.connection_names.len(),
            factory_mappings = self.connection_factories.len(),
            executor_mappings = self.executor_kinds.len(),
            "Database configuration built"
        );

        Ok(DatabaseConfigProvider {
            settings,
            default_connection_name,
            default_connection_factory,
            default_executor_kind: self.default_executor_kind,
            executor_kinds: self.executor_kinds,
            connection_names: self.connection_names,
            connection_factories: self.connection_factories,
        })
    }
}

impl fmt::Debug for DatabaseConfigProviderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfigProviderBuilder")
            .field("default_connection_name", &self.default_connection_name)
            .field("default_connection_factory", &self.default_connection_factory.is_some())
            .field("default_executor_kind", &self.default_executor_kind)
            .field("connection_names", &self.connection_names)
            .finish_non_exhaustive()
    }
}

/// Resolved database configuration for each consumer type.
pub struct DatabaseConfigProvider {
    settings: SharedSettings,
    default_connection_name: String,
    default_connection_factory: ConnectionFactory,
    default_executor_kind: ExecutorKind,
    executor_kinds: FxHashMap<ConsumerKey, ExecutorKind>,
    connection_names: FxHashMap<ConsumerKey, String>,
    connection_factories: FxHashMap<ConsumerKey, ConnectionFactory>,
}

impl DatabaseConfigProvider {
    #[must_use]
    pub fn builder() -> DatabaseConfigProviderBuilder {
        DatabaseConfigProviderBuilder::new()
    }

    #[must_use]
    pub fn connection_name_for(&self, consumer: ConsumerKey) -> &str {
        self.connection_names.get(&consumer).unwrap_or(&self.default_connection_name)
    }

    /// Connection string of the connection mapped to `consumer`.
    ///
    /// # Errors
    /// [`DataError::Settings`] or [`DataError::Configuration`] when the settings hold no
    /// non-blank value for the connection name.
    pub fn connection_string_for(&self, consumer: ConsumerKey) -> Result<String, DataError> {
        let name = self.connection_name_for(consumer);
        let missing = || format!("No connection string found for '{name}'");
        let value = self
            .settings
            .connection_string(name)
            .map_err(|source| DataError::Settings { source, context: Some(missing().into()) })?;
        if value.trim().is_empty() {
            return Err(DataError::Configuration { message: missing().into(), context: None });
        }
        Ok(value)
    }

    #[must_use]
    pub fn connection_factory_for(&self, consumer: ConsumerKey) -> ConnectionFactory {
        Arc::clone(self.connection_factories.get(&consumer).unwrap_or(&self.default_connection_factory))
    }

    #[must_use]
    pub fn executor_kind_for(&self, consumer: ConsumerKey) -> ExecutorKind {
        self.executor_kinds.get(&consumer).copied().unwrap_or(self.default_executor_kind)
    }

    /// # Errors
    /// See [`DatabaseConfigProvider::connection_string_for`].
    pub fn connection_string<C: ?Sized + 'static>(&self) -> Result<String, DataError> {
        self.connection_string_for(ConsumerKey::of::<C>())
    }

    #[must_use]
    pub fn connection_factory<C: ?Sized + 'static>(&self) -> ConnectionFactory {
        self.connection_factory_for(ConsumerKey::of::<C>())
    }

    #[must_use]
    pub fn executor_kind<C: ?Sized + 'static>(&self) -> ExecutorKind {
        self.executor_kind_for(ConsumerKey::of::<C>())
    }
}

impl fmt::Debug for DatabaseConfigProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfigProvider")
            .field("default_connection_name", &self.default_connection_name)
            .field("default_executor_kind", &self.default_executor_kind)
            .field("connection_names", &self.connection_names)
            .field("executor_kinds", &self.executor_kinds)
            .finish_non_exhaustive()
    }
}
