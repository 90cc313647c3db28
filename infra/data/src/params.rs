//! Named command parameters.

use crate::value::DbValue;

/// Ordered bag of named parameters.
///
/// Names are stored without their placeholder sigil, so `@id`, `:id` and `$id`
/// all address the same parameter. Lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, DbValue)>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a parameter.
    pub fn add(&mut self, name: impl AsRef<str>, value: impl Into<DbValue>) -> &mut Self {
        let name = normalize(name.as_ref());
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_owned(), value)),
        }
        self
    }

    #[must_use]
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<DbValue>) -> Self {
        self.add(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DbValue> {
        let name = normalize(name);
        self.entries.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DbValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, V> FromIterator<(N, V)> for Parameters
where
    N: AsRef<str>,
    V: Into<DbValue>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.add(name, value);
        }
        params
    }
}

fn normalize(name: &str) -> &str {
    name.trim().trim_start_matches(['@', ':', '$'])
}
