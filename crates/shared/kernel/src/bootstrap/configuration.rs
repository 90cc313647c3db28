use crate::bootstrap::error::BootstrapError;
use fxhash::FxHashSet;
use std::fmt;

/// Canonical unit names left out of a bootstrap run. Matching is exact and case-sensitive.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    names: FxHashSet<String>,
}

impl ExclusionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<N: Into<String>> FromIterator<N> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self { names: iter.into_iter().map(Into::into).collect() }
    }
}

impl fmt::Debug for ExclusionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.iter().collect();
        names.sort_unstable();
        f.debug_set().entries(names).finish()
    }
}

/// Settings plus exclusions for one bootstrap run. Read-only once built.
#[derive(Debug, Clone)]
pub struct BootstrapConfiguration<S> {
    settings: S,
    excluded: ExclusionSet,
}

impl<S> BootstrapConfiguration<S> {
    /// Configuration with no exclusions.
    pub fn new(settings: S) -> Self {
        Self { settings, excluded: ExclusionSet::default() }
    }

    #[must_use]
    pub fn builder() -> BootstrapConfigurationBuilder<S> {
        BootstrapConfigurationBuilder::default()
    }

    pub const fn settings(&self) -> &S {
        &self.settings
    }

    pub const fn excluded(&self) -> &ExclusionSet {
        &self.excluded
    }
}

#[derive(Debug)]
pub struct BootstrapConfigurationBuilder<S> {
    settings: Option<S>,
    excluded: Option<ExclusionSet>,
}

impl<S> Default for BootstrapConfigurationBuilder<S> {
    fn default() -> Self {
        Self { settings: None, excluded: None }
    }
}

impl<S> BootstrapConfigurationBuilder<S> {
    #[must_use]
    pub fn settings(mut self, settings: S) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Unit names to skip; omitted means an empty set.
    #[must_use]
    pub fn excluded<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.excluded = Some(names.into_iter().collect());
        self
    }

    #[must_use]
    pub fn exclusion_set(mut self, excluded: Option<ExclusionSet>) -> Self {
        self.excluded = excluded;
        self
    }

    /// # Errors
    /// [`BootstrapError::MissingArgument`] naming `settings` when none were supplied.
    pub fn build(self) -> Result<BootstrapConfiguration<S>, BootstrapError> {
        let settings = self.settings.ok_or_else(|| BootstrapError::missing("settings"))?;
        Ok(BootstrapConfiguration { settings, excluded: self.excluded.unwrap_or_default() })
    }
}
