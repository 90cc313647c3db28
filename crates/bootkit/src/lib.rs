//! Facade crate for bootkit.
//! Re-exports the shared and infrastructure crates and wires the ready-made bootstraps.
//! Keep this crate thin: it composes other crates and holds no logic of its own.
//!
//! ## Usage
//! - Add `bootkit` with the desired feature flags (`data`, `logger`, `secrets`, `sqlite`).
//! - Describe startup work as [`ServiceModule`]s and [`MappingModule`]s, then call
//!   [`ServiceBootstrapFactory::create`] and [`mapper_bootstrap`].
//!
//! ```rust
//! use bootkit::kernel::bootstrap::{ContainerConfigurer, UnitRegistry, UnitResult};
//! use bootkit::kernel::container::ServiceContainer;
//! use bootkit::{Module, ServiceBootstrapFactory};
//!
//! #[derive(Default)]
//! struct Greeting;
//!
//! impl ContainerConfigurer<ServiceContainer, String> for Greeting {
//!     fn configure(&self, container: &mut ServiceContainer, settings: &String) -> UnitResult {
//!         container.register_instance(format!("hello, {settings}"));
//!         Ok(())
//!     }
//! }
//!
//! fn register(registry: &mut UnitRegistry<ServiceContainer, String>) {
//!     registry.register::<Greeting>();
//! }
//!
//! let mut bootstrap =
//!     ServiceBootstrapFactory::create(Some(vec![Module::new("greeting", register)]), "world".to_owned(), None)
//!         .unwrap();
//! bootstrap.initialize().unwrap();
//! assert_eq!(*bootstrap.container().resolve::<String>().unwrap(), "hello, world");
//! ```

mod factory;

pub use factory::{MappingModule, ServiceBootstrap, ServiceBootstrapFactory, ServiceModule, mapper_bootstrap};

pub use bootkit_domain as domain;
pub use bootkit_kernel as kernel;
pub use bootkit_kernel::bootstrap::{BootstrapError, ExclusionSet, Module};
pub use bootkit_kernel::{AppSettings, Settings, SettingsError};

#[cfg(feature = "data")]
pub use bootkit_data as data;
#[cfg(feature = "logger")]
pub use bootkit_logger as logger;
#[cfg(feature = "secrets")]
pub use bootkit_secrets as secrets;

/// Build-time enabled features (by Cargo feature).
pub mod features {
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "data")]
        "data",
        #[cfg(feature = "logger")]
        "logger",
        #[cfg(feature = "secrets")]
        "secrets",
        #[cfg(feature = "sqlite")]
        "sqlite",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}
