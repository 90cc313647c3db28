use crate::bootstrap::error::{BootstrapError, BootstrapErrorExt};
use crate::bootstrap::unit::BoxedMapperUnit;
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, info, instrument};

type ExpressionFactory<E> = Box<dyn FnMut() -> E>;
type MapperFactory<E, M> = Box<dyn FnMut(E) -> M>;
type UnitsFactory<E> = Box<dyn FnMut() -> Vec<BoxedMapperUnit<E>>>;

/// Builds a mapper `M` from configuration units applied to a shared expression `E`.
///
/// When no unit is found nothing is built: neither factory runs and the mapper stays unset.
pub struct MapperBootstrap<M, E> {
    expression_factory: ExpressionFactory<E>,
    mapper_factory: MapperFactory<E, M>,
    units: UnitsFactory<E>,
    mapper: Option<M>,
}

impl<M, E> MapperBootstrap<M, E> {
    #[must_use]
    pub fn builder() -> MapperBootstrapBuilder<M, E> {
        MapperBootstrapBuilder::default()
    }

    /// Applies every unit to a fresh expression and stores the resulting mapper.
    ///
    /// # Errors
    /// [`BootstrapError::Unit`] for the first failing unit; no mapper is stored then.
    #[instrument(name = "mapper.initialize", skip_all)]
    pub fn initialize(&mut self) -> Result<(), BootstrapError> {
        let units = (self.units)();
        if units.is_empty() {
            debug!("No mapper units found, mapper left unset");
            return Ok(());
        }

        let mut expression = (self.expression_factory)();
        for unit in &units {
            let name = unit.name();
            debug!(unit = %name, "Configuring mapper unit");
            unit.configure(&mut expression).context(name)?;
        }

        self.mapper = Some((self.mapper_factory)(expression));
        info!(units = units.len(), "Mapper initialized");
        Ok(())
    }

    /// The mapper built by [`MapperBootstrap::initialize`].
    ///
    /// # Errors
    /// [`BootstrapError::NotInitialized`] when no mapper has been produced.
    pub fn mapper(&self) -> Result<&M, BootstrapError> {
        self.mapper.as_ref().ok_or_else(Self::not_initialized)
    }

    #[must_use]
    pub const fn try_mapper(&self) -> Option<&M> {
        self.mapper.as_ref()
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.mapper.is_some()
    }

    /// Consumes the bootstrap, yielding the mapper.
    ///
    /// # Errors
    /// [`BootstrapError::NotInitialized`] when no mapper has been produced.
    pub fn into_mapper(self) -> Result<M, BootstrapError> {
        self.mapper.ok_or_else(Self::not_initialized)
    }

    fn not_initialized() -> BootstrapError {
        BootstrapError::NotInitialized {
            bootstrap: Cow::Borrowed(std::any::type_name::<Self>()),
            context: None,
        }
    }
}

impl<M: fmt::Debug, E> fmt::Debug for MapperBootstrap<M, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperBootstrap").field("mapper", &self.mapper).finish_non_exhaustive()
    }
}

/// Validating builder for [`MapperBootstrap`]; all three factories are required.
pub struct MapperBootstrapBuilder<M, E> {
    expression_factory: Option<ExpressionFactory<E>>,
    mapper_factory: Option<MapperFactory<E, M>>,
    units: Option<UnitsFactory<E>>,
}

impl<M, E> Default for MapperBootstrapBuilder<M, E> {
    fn default() -> Self {
        Self { expression_factory: None, mapper_factory: None, units: None }
    }
}

impl<M, E> MapperBootstrapBuilder<M, E> {
    #[must_use]
    pub fn expression_factory<F>(mut self, factory: F) -> Self
    where
        F: FnMut() -> E + 'static,
    {
        self.expression_factory = Some(Box::new(factory));
        self
    }

    #[must_use]
    pub fn mapper_factory<F>(mut self, factory: F) -> Self
    where
        F: FnMut(E) -> M + 'static,
    {
        self.mapper_factory = Some(Box::new(factory));
        self
    }

    #[must_use]
    pub fn units<F>(mut self, units: F) -> Self
    where
        F: FnMut() -> Vec<BoxedMapperUnit<E>> + 'static,
    {
        self.units = Some(Box::new(units));
        self
    }

    /// # Errors
    /// [`BootstrapError::MissingArgument`] naming the first absent factory.
    pub fn build(self) -> Result<MapperBootstrap<M, E>, BootstrapError> {
        Ok(MapperBootstrap {
            expression_factory: self
                .expression_factory
                .ok_or_else(|| BootstrapError::missing("expression_factory"))?,
            mapper_factory: self.mapper_factory.ok_or_else(|| BootstrapError::missing("mapper_factory"))?,
            units: self.units.ok_or_else(|| BootstrapError::missing("units"))?,
            mapper: None,
        })
    }
}

impl<M, E> fmt::Debug for MapperBootstrapBuilder<M, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperBootstrapBuilder")
            .field("expression_factory", &self.expression_factory.is_some())
            .field("mapper_factory", &self.mapper_factory.is_some())
            .field("units", &self.units.is_some())
            .finish()
    }
}
