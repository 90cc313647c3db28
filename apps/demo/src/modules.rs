//! Startup units of the demo.

use crate::orders::{CustomerOrder, OrdersRepository};
use bootkit::data::{
    DatabaseConfigProviderBuilder, SharedSettings, SqliteConnection, register_executor_factory, register_repository,
};
use bootkit::domain::config::DatabaseConfig;
use bootkit::kernel::bootstrap::{
    ContainerConfigurer, MapperConfigurer, MapperUnitRegistry, ModuleCatalog, UnitRegistry, UnitResult,
};
use bootkit::kernel::container::ServiceContainer;
use bootkit::kernel::mapping::MappingExpression;
use bootkit::{AppSettings, MappingModule, Module, ServiceModule, Settings};
use std::sync::Arc;
use tracing::debug;

pub type DemoSettings = Arc<AppSettings>;

/// Registers the executor factory and the repositories.
#[derive(Debug, Default)]
pub struct DatabaseUnit;

impl ContainerConfigurer<ServiceContainer, DemoSettings> for DatabaseUnit {
    fn configure(&self, container: &mut ServiceContainer, settings: &DemoSettings) -> UnitResult {
        let database: DatabaseConfig = settings.get("database")?;
        let shared: SharedSettings = Arc::clone(settings) as SharedSettings;
        let provider = DatabaseConfigProviderBuilder::from_config(&database)
            .default_connection_factory(SqliteConnection::factory())
            .build(shared)?;

        register_executor_factory(container, provider);
        register_repository::<OrdersRepository>(container)?;
        debug!(default_connection = %database.default_connection, "Database services registered");
        Ok(())
    }
}

/// Shares the settings themselves through the container.
#[derive(Debug, Default)]
pub struct SettingsUnit;

impl ContainerConfigurer<ServiceContainer, DemoSettings> for SettingsUnit {
    fn configure(&self, container: &mut ServiceContainer, settings: &DemoSettings) -> UnitResult {
        container.register_instance(Arc::clone(settings));
        Ok(())
    }
}

/// Display line for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine(pub String);

#[derive(Debug)]
pub struct OrderLineMaps {
    verbose: bool,
}

impl MapperConfigurer<MappingExpression> for OrderLineMaps {
    fn configure(&self, expression: &mut MappingExpression) -> UnitResult {
        let verbose = self.verbose;
        expression.create_map(move |row: &CustomerOrder| {
            if verbose {
                OrderLine(format!("#{} {} (customer {}) {:.2}", row.order.id, row.customer.name, row.customer.id, row.order.total))
            } else {
                OrderLine(format!("#{} {} {:.2}", row.order.id, row.customer.name, row.order.total))
            }
        });
        Ok(())
    }
}

fn register_core(registry: &mut UnitRegistry<ServiceContainer, DemoSettings>) {
    registry.register::<SettingsUnit>();
}

fn register_database(registry: &mut UnitRegistry<ServiceContainer, DemoSettings>) {
    registry.register::<DatabaseUnit>();
}

fn register_maps(registry: &mut MapperUnitRegistry<MappingExpression, DemoSettings>) {
    registry
        .register_with(|| Ok(OrderLineMaps { verbose: false }))
        .register_with_settings(|settings: &DemoSettings| Ok(OrderLineMaps { verbose: settings.is_development() }));
}

/// Every container module the demo knows about.
#[must_use]
pub fn service_catalog() -> ModuleCatalog<UnitRegistry<ServiceContainer, DemoSettings>> {
    ModuleCatalog::new().with(Module::new("core", register_core)).with(Module::new("database", register_database))
}

/// Container modules whose names contain one of `fragments`; all modules when empty.
#[must_use]
pub fn service_modules(fragments: &[String]) -> Vec<ServiceModule<DemoSettings>> {
    service_catalog().select(fragments)
}

#[must_use]
pub fn mapping_modules() -> Vec<MappingModule<DemoSettings>> {
    vec![Module::new("order-lines", register_maps)]
}
