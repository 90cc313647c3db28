//! Object-to-object mapping.
//!
//! Mapper units register conversions on a [`MappingExpression`]; the finished expression
//! becomes an immutable, cheaply cloned [`Mapper`].

use fxhash::FxHashMap;
use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type MapFn = Box<dyn Fn(&dyn Any) -> Option<Box<dyn Any>> + Send + Sync>;
type MapKey = (TypeId, TypeId);

#[bootkit_derive::bootkit_error]
pub enum MappingError {
    #[error("No map registered{}: {source_type} -> {destination_type}", format_context(.context))]
    MissingMap {
        source_type: Cow<'static, str>,
        destination_type: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },
}

struct MapEntry {
    source: &'static str,
    destination: &'static str,
    map: MapFn,
}

/// Collects maps while mapper units configure it.
#[derive(Default)]
pub struct MappingExpression {
    maps: FxHashMap<MapKey, MapEntry>,
}

impl MappingExpression {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the conversion from `S` to `D`; a later registration for the same pair wins.
    pub fn create_map<S, D, F>(&mut self, map: F) -> &mut Self
    where
        S: 'static,
        D: 'static,
        F: Fn(&S) -> D + Send + Sync + 'static,
    {
        let entry = MapEntry {
            source: type_name::<S>(),
            destination: type_name::<D>(),
            map: Box::new(move |value: &dyn Any| {
                value.downcast_ref::<S>().map(|s| Box::new(map(s)) as Box<dyn Any>)
            }),
        };
        if self.maps.insert((TypeId::of::<S>(), TypeId::of::<D>()), entry).is_some() {
            debug!(source = type_name::<S>(), destination = type_name::<D>(), "Map replaced");
        }
        self
    }

    #[must_use]
    pub fn contains<S: 'static, D: 'static>(&self) -> bool {
        self.maps.contains_key(&(TypeId::of::<S>(), TypeId::of::<D>()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl fmt::Debug for MappingExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(pairs(&self.maps)).finish()
    }
}

/// Applies registered maps.
#[derive(Clone)]
pub struct Mapper {
    maps: Arc<FxHashMap<MapKey, MapEntry>>,
}

impl Mapper {
    #[must_use]
    pub fn new(expression: MappingExpression) -> Self {
        Self { maps: Arc::new(expression.maps) }
    }

    /// Maps `source` into a new `D`.
    ///
    /// # Errors
    /// [`MappingError::MissingMap`] when no map from `S` to `D` was registered.
    pub fn map<S: 'static, D: 'static>(&self, source: &S) -> Result<D, MappingError> {
        self.maps
            .get(&(TypeId::of::<S>(), TypeId::of::<D>()))
            .and_then(|entry| (entry.map)(source))
            .and_then(|boxed| boxed.downcast::<D>().ok())
            .map(|d| *d)
            .ok_or_else(|| MappingError::MissingMap {
                source_type: type_name::<S>().into(),
                destination_type: type_name::<D>().into(),
                context: None,
            })
    }

    /// Maps every item of `sources`, stopping at the first failure.
    ///
    /// # Errors
    /// See [`Mapper::map`].
    pub fn map_all<'a, S, D, I>(&self, sources: I) -> Result<Vec<D>, MappingError>
    where
        S: 'static,
        D: 'static,
        I: IntoIterator<Item = &'a S>,
    {
        sources.into_iter().map(|s| self.map::<S, D>(s)).collect()
    }

    #[must_use]
    pub fn can_map<S: 'static, D: 'static>(&self) -> bool {
        self.maps.contains_key(&(TypeId::of::<S>(), TypeId::of::<D>()))
    }
}

impl From<MappingExpression> for Mapper {
    fn from(expression: MappingExpression) -> Self {
        Self::new(expression)
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(pairs(&self.maps)).finish()
    }
}

fn pairs(maps: &FxHashMap<MapKey, MapEntry>) -> Vec<String> {
    let mut pairs: Vec<_> = maps.values().map(|e| format!("{} -> {}", e.source, e.destination)).collect();
    pairs.sort_unstable();
    pairs
}
