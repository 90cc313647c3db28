//! Startup orchestration.
//!
//! Two bootstraps share one shape. [`ContainerBootstrap`] runs pre-initialization hooks,
//! then every discovered [`ContainerConfigurer`] that is not excluded, then
//! post-initialization hooks. [`MapperBootstrap`] applies every [`MapperConfigurer`] to a
//! shared expression and turns it into a mapper, or does nothing when no unit exists.
//!
//! Units are contributed by explicit [`Module`]s through [`discovery`].

pub mod configuration;
pub mod container;
pub mod discovery;
pub mod error;
pub mod hooks;
pub mod mapper;
pub mod unit;

pub use configuration::{BootstrapConfiguration, BootstrapConfigurationBuilder, ExclusionSet};
pub use container::{BootstrapState, ContainerBootstrap, ContainerBootstrapBuilder};
pub use discovery::{
    ContainerModule, MapperModule, MapperUnitRegistry, Module, ModuleCatalog, UnitRegistry,
    discover_container_units, discover_mapper_units,
};
pub use error::{BootstrapError, BootstrapErrorExt, UnitError, UnitResult};
pub use hooks::{HookId, HookPhase, LifecycleHooks};
pub use mapper::{MapperBootstrap, MapperBootstrapBuilder};
pub use unit::{BoxedContainerUnit, BoxedMapperUnit, ContainerConfigurer, MapperConfigurer, UnitName};
