use bootkit_kernel::bootstrap::{
    BootstrapConfiguration, BootstrapError, ContainerBootstrap, ContainerModule, ExclusionSet,
    MapperBootstrap, MapperModule, discover_container_units, discover_mapper_units,
};
use bootkit_kernel::container::ServiceContainer;
use bootkit_kernel::mapping::{Mapper, MappingExpression};
use tracing::info;

/// Container bootstrap over the built-in [`ServiceContainer`].
pub type ServiceBootstrap<S> = ContainerBootstrap<ServiceContainer, S>;

/// Module contributing units to a [`ServiceBootstrap`].
pub type ServiceModule<S> = ContainerModule<ServiceContainer, S>;

/// Module contributing mapper units to [`mapper_bootstrap`].
pub type MappingModule<S> = MapperModule<MappingExpression, S>;

/// Creates ready-to-initialize bootstraps over the built-in container.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceBootstrapFactory;

impl ServiceBootstrapFactory {
    /// Bootstrap discovering units from `modules`; units named in `excluded` are neither
    /// built nor configured.
    ///
    /// # Errors
    /// [`BootstrapError::MissingArgument`] named `modules` when `modules` is `None`.
    pub fn create<S: 'static>(
        modules: Option<Vec<ServiceModule<S>>>,
        settings: S,
        excluded: Option<ExclusionSet>,
    ) -> Result<ServiceBootstrap<S>, BootstrapError> {
        let modules =
            modules.ok_or_else(|| BootstrapError::MissingArgument { name: "modules".into(), context: None })?;
        let configuration = BootstrapConfiguration::builder().settings(settings).exclusion_set(excluded).build()?;
        let exclusions = configuration.excluded().clone();

        info!(modules = modules.len(), excluded = exclusions.len(), "Creating service bootstrap");
        ContainerBootstrap::builder()
            .configuration(configuration)
            .container_factory(ServiceContainer::new)
            .discovery(move || discover_container_units(&modules, Some(&exclusions)))
            .build()
    }
}

/// Mapper bootstrap discovering units from `modules`, building a [`Mapper`] from one shared
/// [`MappingExpression`].
///
/// # Errors
/// Only if a factory is missing, which cannot happen here; kept fallible like the builder.
pub fn mapper_bootstrap<S: 'static>(
    modules: Vec<MappingModule<S>>,
    settings: Option<S>,
) -> Result<MapperBootstrap<Mapper, MappingExpression>, BootstrapError> {
    info!(modules = modules.len(), with_settings = settings.is_some(), "Creating mapper bootstrap");
    MapperBootstrap::builder()
        .expression_factory(MappingExpression::new)
        .mapper_factory(Mapper::from)
        .units(move || discover_mapper_units(&modules, settings.as_ref()))
        .build()
}
