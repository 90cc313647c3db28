//! # Bootkit Demo
//!
//! Startup wiring for a small orders service: layered configuration (optionally with Vault
//! secrets), logging, the service bootstrap, the mapper bootstrap and a SQLite executor.
//!
//! ## Example
//! ```no_run
//! use bootkit_demo::App;
//!
//! fn main() -> anyhow::Result<()> {
//!     let app = App::builder().config_path("apps/demo/app").build()?;
//!     tokio::runtime::Builder::new_current_thread().enable_all().build()?.block_on(app.run())
//! }
//! ```

pub mod modules;
pub mod orders;

use crate::modules::{DemoSettings, OrderLine, mapping_modules, service_modules};
use crate::orders::{CustomerOrder, OrdersRepository};
use anyhow::{Context, Result};
use bootkit::data::CancellationToken;
use bootkit::domain::config::AppConfig;
use bootkit::kernel::bootstrap::MapperBootstrap;
use bootkit::kernel::config::builder as config_builder;
use bootkit::kernel::container::ServiceContainer;
use bootkit::kernel::mapping::{Mapper, MappingExpression};
use bootkit::logger::Logger;
use bootkit::{AppSettings, ExclusionSet, ServiceBootstrap, ServiceBootstrapFactory, Settings, mapper_bootstrap};
use config::ConfigBuilder;
use config::builder::DefaultState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// A fluent builder for configuring and initializing the [`App`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct AppBuilder {
    config_path: Option<PathBuf>,
    log: bool,
}

impl AppBuilder {
    /// Settings file; the `app` file in the working directory when unset.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Installs the global logger from the `[logging]` section.
    pub const fn with_logging(mut self) -> Self {
        self.log = true;
        self
    }

    /// Loads configuration, starts logging and runs both bootstraps.
    ///
    /// Must run outside an async runtime when a `[vault]` section is configured.
    ///
    /// # Errors
    /// Configuration, logging and bootstrap failures.
    pub fn build(self) -> Result<App> {
        let base = config_builder(self.config_path.as_ref());
        let app_config: AppConfig =
            base.build_cloned().context("Critical: Configuration is malformed")?.try_deserialize()?;
        let config = with_secrets(base, &app_config)?.build().context("Failed to build layered configuration")?;
        let settings: DemoSettings = Arc::new(AppSettings::new(config)?);

        let logger = if self.log {
            Some(Logger::from_config(env!("CARGO_PKG_NAME"), &app_config.logging, app_config.environment)?)
        } else {
            None
        };
        info!(environment = %app_config.environment, "Configuration loaded");

        let excluded: ExclusionSet = app_config.bootstrap.excluded_units.iter().cloned().collect();
        let mut bootstrap = ServiceBootstrapFactory::create(
            Some(service_modules(&app_config.bootstrap.modules)),
            Arc::clone(&settings),
            Some(excluded),
        )?;
        let shared_config = app_config.clone();
        bootstrap
            .add_pre_initialization_action("app-config", move |container: &mut ServiceContainer| {
                container.register_instance(shared_config.clone());
                Ok(())
            })
            .add_post_initialization_action("report", |container: &mut ServiceContainer| {
                info!(services = container.len(), "Service container ready");
                Ok(())
            });
        bootstrap.initialize().context("Service bootstrap failed")?;

        let mut mapper = mapper_bootstrap(mapping_modules(), Some(Arc::clone(&settings)))?;
        mapper.initialize().context("Mapper bootstrap failed")?;

        Ok(App { settings, bootstrap, mapper, _logger: logger })
    }
}

#[cfg(feature = "vault")]
fn with_secrets(
    builder: ConfigBuilder<DefaultState>,
    config: &AppConfig,
) -> Result<ConfigBuilder<DefaultState>> {
    use bootkit::secrets::{VaultConfigExt, VaultOptions, VaultSource};

    match &config.vault {
        Some(vault) => {
            info!(address = %vault.address, path = %vault.path, "Adding Vault secrets");
            Ok(builder.add_vault_source(VaultSource::new(VaultOptions::from(vault))?))
        },
        None => Ok(builder),
    }
}

#[cfg(not(feature = "vault"))]
fn with_secrets(
    builder: ConfigBuilder<DefaultState>,
    config: &AppConfig,
) -> Result<ConfigBuilder<DefaultState>> {
    if config.vault.is_some() {
        warn!("A [vault] section is configured but the `vault` feature is disabled; ignoring it");
    }
    Ok(builder)
}

/// A fully bootstrapped demo application.
pub struct App {
    settings: DemoSettings,
    bootstrap: ServiceBootstrap<DemoSettings>,
    mapper: MapperBootstrap<Mapper, MappingExpression>,
    _logger: Option<Logger>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    #[must_use]
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    #[must_use]
    pub fn container(&self) -> &ServiceContainer {
        self.bootstrap.container()
    }

    /// Runs until the sample work is done or Ctrl-C is pressed.
    ///
    /// # Errors
    /// Database, container and mapping failures.
    pub async fn run(self) -> Result<()> {
        let token = CancellationToken::new();
        let on_signal = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Shutdown requested");
                on_signal.cancel();
            }
        });

        let lines = self.order_lines(&token).await?;
        for line in &lines {
            info!(line = %line.0, "Order");
        }
        Ok(())
    }

    /// Seeds sample data and returns every order mapped to a display line.
    ///
    /// # Errors
    /// Database, container and mapping failures.
    pub async fn order_lines(&self, cancel: &CancellationToken) -> Result<Vec<OrderLine>> {
        let scope = self.bootstrap.container().begin_scope();
        let orders = scope.resolve::<OrdersRepository>()?;

        orders.migrate(cancel).await?;
        let ada = orders.add_customer("Ada", cancel).await?;
        orders.add_order(ada, 12.5, cancel).await?;
        orders.add_order(ada, 3.0, cancel).await?;

        let rows: Vec<CustomerOrder> = orders.with_customers(cancel).await?;
        let lines: Vec<OrderLine> = self.mapper.mapper()?.map_all(&rows)?;
        Ok(lines)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("environment", &self.settings.environment())
            .field("services", &self.bootstrap.container().len())
            .finish_non_exhaustive()
    }
}
