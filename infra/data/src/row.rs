use crate::error::{DataError, DataErrorExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// One result row: column names with their JSON-decoded values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    #[must_use]
    pub const fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// First column named `name`, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|i| &self.columns[i].1)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    pub(crate) fn position_from(&self, start: usize, name: &str) -> Option<usize> {
        self.columns.iter().skip(start).position(|(n, _)| n.eq_ignore_ascii_case(name)).map(|i| i + start)
    }

    pub(crate) fn segment(&self, start: usize, end: usize) -> &[(String, Value)] {
        &self.columns[start..end]
    }

    /// Deserializes the whole row as `T`. On duplicate names the first column wins.
    ///
    /// # Errors
    /// [`DataError::Deserialize`] when the row does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DataError> {
        deserialize_segment(&self.columns)
    }
}

impl<N: Into<String>> FromIterator<(N, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }
}

pub(crate) fn deserialize_segment<T: DeserializeOwned>(columns: &[(String, Value)]) -> Result<T, DataError> {
    let mut object = Map::with_capacity(columns.len());
    for (name, value) in columns {
        if !object.contains_key(name) {
            object.insert(name.clone(), value.clone());
        }
    }
    serde_json::from_value(Value::Object(object)).context("Failed to deserialize row")
}
