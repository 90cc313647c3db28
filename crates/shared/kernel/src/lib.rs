//! Kernel utilities shared by every bootkit crate.
//!
//! * [`config`]: layered file + environment loading.
//! * [`settings`]: the [`Settings`](settings::Settings) contract and its `config`-backed implementation.
//! * [`bootstrap`]: container and mapper bootstraps driven by explicit modules.
//! * [`container`]: a type-keyed service container with singleton, transient and scoped lifetimes.
//! * [`mapping`]: object-to-object maps built by mapper units.
//!
//! ## Bootstrapping a container
//! ```rust
//! use bootkit_kernel::bootstrap::{
//!     BootstrapConfiguration, ContainerBootstrap, ContainerConfigurer, Module, UnitRegistry,
//!     UnitResult, discover_container_units,
//! };
//!
//! #[derive(Default)]
//! struct Seed;
//!
//! impl ContainerConfigurer<Vec<u32>, ()> for Seed {
//!     fn configure(&self, container: &mut Vec<u32>, _: &()) -> UnitResult {
//!         container.push(1);
//!         Ok(())
//!     }
//! }
//!
//! fn register(registry: &mut UnitRegistry<Vec<u32>, ()>) {
//!     registry.register::<Seed>();
//! }
//!
//! let modules = vec![Module::new("seed", register)];
//! let mut bootstrap = ContainerBootstrap::builder()
//!     .configuration(BootstrapConfiguration::new(()))
//!     .container_factory(Vec::new)
//!     .discovery(move || discover_container_units(&modules, None))
//!     .build()
//!     .unwrap();
//!
//! bootstrap.add_pre_initialization_action("zero", |c: &mut Vec<u32>| {
//!     c.push(0);
//!     Ok(())
//! });
//! bootstrap.initialize().unwrap();
//! assert_eq!(bootstrap.container(), &[0, 1]);
//! ```

pub mod bootstrap;
pub mod config;
pub mod container;
pub mod mapping;
pub mod settings;

pub use bootkit_domain as domain;
pub use settings::{AppSettings, Settings, SettingsError};
