use serde_json::Value as JsonValue;

/// A driver-neutral parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// Bound as its JSON text by drivers without a native JSON type.
    Json(JsonValue),
}

impl DbValue {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// JSON view of the value; bytes become an array of numbers.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::Float(f) => JsonValue::from(*f),
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Bytes(b) => JsonValue::from(b.clone()),
            Self::Json(j) => j.clone(),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident via $conv:expr),* $(,)?) => {
        $(impl From<$ty> for DbValue {
            fn from(value: $ty) -> Self {
                Self::$variant($conv(value))
            }
        })*
    };
}

impl_from! {
    bool => Bool via std::convert::identity,
    i32 => Int via i64::from,
    i64 => Int via std::convert::identity,
    u32 => Int via i64::from,
    f32 => Float via f64::from,
    f64 => Float via std::convert::identity,
    String => Text via std::convert::identity,
    &str => Text via str::to_owned,
    Vec<u8> => Bytes via std::convert::identity,
    JsonValue => Json via std::convert::identity,
}

impl<T: Into<Self>> From<Option<T>> for DbValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_collapse_to_null() {
        assert!(DbValue::from(None::<i64>).is_null());
        assert_eq!(DbValue::from(Some("x")), DbValue::Text("x".to_owned()));
    }

    #[test]
    fn json_view() {
        assert_eq!(DbValue::from(7_i32).to_json(), json!(7));
        assert_eq!(DbValue::Bytes(vec![1, 2]).to_json(), json!([1, 2]));
        assert_eq!(DbValue::from(json!({"a": 1})).to_json(), json!({"a": 1}));
    }
}
