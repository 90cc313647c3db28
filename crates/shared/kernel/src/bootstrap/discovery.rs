//! Explicit unit discovery.
//!
//! Every [`Module`] carries a registration function that appends its configuration units
//! to a registry. Discovery runs those functions, drops excluded entries before they are
//! built, and skips entries whose constructor fails so one broken unit never hides the
//! rest of its module.

use crate::bootstrap::configuration::ExclusionSet;
use crate::bootstrap::error::UnitResult;
use crate::bootstrap::unit::{
    BoxedContainerUnit, BoxedMapperUnit, ContainerConfigurer, MapperConfigurer, UnitName,
};
use fxhash::FxHashSet;
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, trace, warn};

/// A named group of configuration units, registered into `R`.
pub struct Module<R> {
    name: Cow<'static, str>,
    register: fn(&mut R),
}

/// Module contributing container units.
pub type ContainerModule<C, S> = Module<UnitRegistry<C, S>>;

/// Module contributing mapper units.
pub type MapperModule<E, S> = Module<MapperUnitRegistry<E, S>>;

impl<R> Module<R> {
    pub fn new(name: impl Into<Cow<'static, str>>, register: fn(&mut R)) -> Self {
        Self { name: name.into(), register }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the registration function against `registry`.
    pub fn register_into(&self, registry: &mut R) {
        (self.register)(registry);
    }
}

impl<R> Clone for Module<R> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), register: self.register }
    }
}

impl<R> fmt::Debug for Module<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module").field("name", &self.name).finish_non_exhaustive()
    }
}

/// All modules an application knows about, selectable by name.
pub struct ModuleCatalog<R> {
    modules: Vec<Module<R>>,
}

impl<R> Default for ModuleCatalog<R> {
    fn default() -> Self {
        Self { modules: Vec::new() }
    }
}

impl<R> ModuleCatalog<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, module: Module<R>) -> Self {
        self.modules.push(module);
        self
    }

    pub fn push(&mut self, module: Module<R>) {
        self.modules.push(module);
    }

    #[must_use]
    pub fn modules(&self) -> &[Module<R>] {
        &self.modules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Modules whose name contains any of `fragments`, ignoring ASCII case.
    ///
    /// No fragments selects every module. The result holds each module name once, in
    /// catalog order.
    pub fn select<I, T>(&self, fragments: I) -> Vec<Module<R>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let fragments: Vec<String> =
            fragments.into_iter().map(|f| f.as_ref().trim().to_ascii_lowercase()).collect();

        let mut seen = FxHashSet::default();
        self.modules
            .iter()
            .filter(|m| {
                let name = m.name.to_ascii_lowercase();
                fragments.is_empty() || fragments.iter().any(|f| name.contains(f.as_str()))
            })
            .filter(|m| seen.insert(m.name.clone()))
            .cloned()
            .collect()
    }
}

impl<R> FromIterator<Module<R>> for ModuleCatalog<R> {
    fn from_iter<I: IntoIterator<Item = Module<R>>>(iter: I) -> Self {
        Self { modules: iter.into_iter().collect() }
    }
}

impl<R> fmt::Debug for ModuleCatalog<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.modules.iter().map(Module::name)).finish()
    }
}

type ContainerConstructor<C, S> = Box<dyn Fn() -> UnitResult<BoxedContainerUnit<C, S>>>;

struct ContainerEntry<C, S> {
    module: Cow<'static, str>,
    name: UnitName,
    construct: ContainerConstructor<C, S>,
}

/// Collects container units while modules register.
pub struct UnitRegistry<C, S> {
    module: Cow<'static, str>,
    entries: Vec<ContainerEntry<C, S>>,
}

impl<C, S> Default for UnitRegistry<C, S> {
    fn default() -> Self {
        Self { module: Cow::Borrowed(""), entries: Vec::new() }
    }
}

impl<C, S> UnitRegistry<C, S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a unit built with `Default`, named after its type.
    pub fn register<U>(&mut self) -> &mut Self
    where
        U: ContainerConfigurer<C, S> + Default + 'static,
    {
        self.register_with(|| Ok(U::default()))
    }

    /// Registers a unit with a fallible constructor, named after its type.
    pub fn register_with<U, F>(&mut self, construct: F) -> &mut Self
    where
        U: ContainerConfigurer<C, S> + 'static,
        F: Fn() -> UnitResult<U> + 'static,
    {
        self.register_named(std::any::type_name::<U>(), construct)
    }

    /// Registers a unit under an explicit canonical name.
    pub fn register_named<U, F>(&mut self, name: impl Into<UnitName>, construct: F) -> &mut Self
    where
        U: ContainerConfigurer<C, S> + 'static,
        F: Fn() -> UnitResult<U> + 'static,
    {
        let name = name.into();
        if self.entries.iter().any(|e| e.name == name) {
            debug!(unit = %name, module = %self.module, "Unit already registered, ignoring");
            return self;
        }
        self.entries.push(ContainerEntry {
            module: self.module.clone(),
            name,
            construct: Box::new(move || construct().map(|u| Box::new(u) as BoxedContainerUnit<C, S>)),
        });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Registered unit names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_ref())
    }

    fn into_units(self, excluded: Option<&ExclusionSet>) -> Vec<BoxedContainerUnit<C, S>> {
        let mut units = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            if excluded.is_some_and(|set| set.contains(&entry.name)) {
                debug!(unit = %entry.name, module = %entry.module, "Unit excluded");
                continue;
            }
            match (entry.construct)() {
                Ok(unit) => units.push(unit),
                Err(error) => {
                    warn!(unit = %entry.name, module = %entry.module, %error, "Unit failed to load, skipping");
                },
            }
        }
        units
    }
}

impl<C, S> fmt::Debug for UnitRegistry<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

type MapperConstructor<E> = Box<dyn Fn() -> UnitResult<BoxedMapperUnit<E>>>;
type MapperSettingsConstructor<E, S> = Box<dyn Fn(&S) -> UnitResult<BoxedMapperUnit<E>>>;

struct MapperEntry<E, S> {
    module: Cow<'static, str>,
    name: UnitName,
    default: Option<MapperConstructor<E>>,
    with_settings: Option<MapperSettingsConstructor<E, S>>,
}

/// Collects mapper units while modules register.
///
/// A unit may offer a zero-argument constructor, a settings-accepting one, or both;
/// registering both under the same type merges them into one entry.
pub struct MapperUnitRegistry<E, S> {
    module: Cow<'static, str>,
    entries: Vec<MapperEntry<E, S>>,
}

impl<E, S> Default for MapperUnitRegistry<E, S> {
    fn default() -> Self {
        Self { module: Cow::Borrowed(""), entries: Vec::new() }
    }
}

impl<E, S> MapperUnitRegistry<E, S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<U>(&mut self) -> &mut Self
    where
        U: MapperConfigurer<E> + Default + 'static,
    {
        self.register_with(|| Ok(U::default()))
    }

    pub fn register_with<U, F>(&mut self, construct: F) -> &mut Self
    where
        U: MapperConfigurer<E> + 'static,
        F: Fn() -> UnitResult<U> + 'static,
    {
        let entry = self.entry(std::any::type_name::<U>());
        if entry.default.is_none() {
            entry.default =
                Some(Box::new(move || construct().map(|u| Box::new(u) as BoxedMapperUnit<E>)));
        }
        self
    }

    pub fn register_with_settings<U, F>(&mut self, construct: F) -> &mut Self
    where
        U: MapperConfigurer<E> + 'static,
        F: Fn(&S) -> UnitResult<U> + 'static,
    {
        let entry = self.entry(std::any::type_name::<U>());
        if entry.with_settings.is_none() {
            entry.with_settings = Some(Box::new(move |settings: &S| {
                construct(settings).map(|u| Box::new(u) as BoxedMapperUnit<E>)
            }));
        }
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_ref())
    }

    fn entry(&mut self, name: &'static str) -> &mut MapperEntry<E, S> {
        let index = match self.entries.iter().position(|e| e.name == name) {
            Some(index) => index,
            None => {
                self.entries.push(MapperEntry {
                    module: self.module.clone(),
                    name: Cow::Borrowed(name),
                    default: None,
                    with_settings: None,
                });
                self.entries.len() - 1
            },
        };
        &mut self.entries[index]
    }

    fn into_units(self, settings: Option<&S>) -> Vec<BoxedMapperUnit<E>> {
        let mut units = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            let built = match (settings, &entry.with_settings, &entry.default) {
                (Some(settings), Some(construct), _) => construct(settings),
                (_, _, Some(construct)) => construct(),
                (None, Some(_), None) => {
                    debug!(unit = %entry.name, module = %entry.module, "Unit needs settings, skipping");
                    continue;
                },
                (_, None, None) => continue,
            };
            match built {
                Ok(unit) => units.push(unit),
                Err(error) => {
                    warn!(unit = %entry.name, module = %entry.module, %error, "Unit failed to load, skipping");
                },
            }
        }
        units
    }
}

impl<E, S> fmt::Debug for MapperUnitRegistry<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Builds the container units contributed by `modules`, leaving out excluded names.
///
/// Units come back in module order, then registration order within each module.
pub fn discover_container_units<C, S>(
    modules: &[ContainerModule<C, S>],
    excluded: Option<&ExclusionSet>,
) -> Vec<BoxedContainerUnit<C, S>> {
    let mut registry = UnitRegistry::new();
    for module in modules {
        trace!(module = module.name(), "Registering container units");
        registry.module = module.name.clone();
        module.register_into(&mut registry);
    }
    registry.into_units(excluded)
}

/// Builds the mapper units contributed by `modules`.
///
/// With `settings`, the settings-accepting constructor wins over the zero-argument one.
/// Without, only units offering a zero-argument constructor are built.
pub fn discover_mapper_units<E, S>(
    modules: &[MapperModule<E, S>],
    settings: Option<&S>,
) -> Vec<BoxedMapperUnit<E>> {
    let mut registry = MapperUnitRegistry::new();
    for module in modules {
        trace!(module = module.name(), "Registering mapper units");
        registry.module = module.name.clone();
        module.register_into(&mut registry);
    }
    registry.into_units(settings)
}
