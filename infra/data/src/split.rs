//! Multi-shape row mapping.
//!
//! A joined row `id, name, id, total` split on `id` yields the segments
//! `[id, name]` and `[id, total]`, each deserialized into its own shape.

use crate::error::DataError;
use crate::row::{Row, deserialize_segment};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Column used when `split_on` is blank.
pub const DEFAULT_SPLIT_ON: &str = "id";

/// Start index of each of `segments` consecutive column ranges.
fn cut_points(row: &Row, split_on: &str, segments: usize) -> Result<Vec<usize>, DataError> {
    let mut names: Vec<&str> = split_on.split(',').map(str::trim).filter(|n| !n.is_empty()).collect();
    if names.is_empty() {
        names.push(DEFAULT_SPLIT_ON);
    }

    let mut cuts = Vec::with_capacity(segments);
    cuts.push(0);
    for segment in 1..segments {
        let name = names[(segment - 1).min(names.len() - 1)];
        let previous = cuts[segment - 1];
        let cut = row.position_from(previous + 1, name).ok_or_else(|| DataError::Split {
            message: format!("split column '{name}' not found after column {previous}").into(),
            context: None,
        })?;
        cuts.push(cut);
    }
    Ok(cuts)
}

fn segment<T: DeserializeOwned>(row: &Row, start: usize, end: usize) -> Result<T, DataError> {
    let columns = row.segment(start, end);
    // An outer join that matched nothing maps to `None` for `Option<T>` shapes.
    if columns.iter().all(|(_, v)| v.is_null()) {
        return serde_json::from_value(Value::Null).map_err(|source| DataError::Deserialize {
            source,
            context: Some("Failed to deserialize empty segment".into()),
        });
    }
    deserialize_segment(columns)
}

pub(crate) fn split2<A, B>(row: &Row, split_on: &str) -> Result<(A, B), DataError>
where
    A: DeserializeOwned,
    B: DeserializeOwned,
{
    let cuts = cut_points(row, split_on, 2)?;
    Ok((segment(row, 0, cuts[1])?, segment(row, cuts[1], row.len())?))
}

pub(crate) fn split3<A, B, C>(row: &Row, split_on: &str) -> Result<(A, B, C), DataError>
where
    A: DeserializeOwned,
    B: DeserializeOwned,
    C: DeserializeOwned,
{
    let cuts = cut_points(row, split_on, 3)?;
    Ok((
        segment(row, 0, cuts[1])?,
        segment(row, cuts[1], cuts[2])?,
        segment(row, cuts[2], row.len())?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Customer {
        id: i64,
        name: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Order {
        order_id: i64,
        total: f64,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Line {
        id: i64,
        sku: String,
    }

    fn joined() -> Row {
        [
            ("id", json!(1)),
            ("name", json!("Ada")),
            ("order_id", json!(10)),
            ("total", json!(4.5)),
            ("ID", json!(100)),
            ("sku", json!("X-1")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn one_name_per_cut() {
        let (c, o, l): (Customer, Order, Line) = split3(&joined(), "order_id, id").unwrap();
        assert_eq!(c, Customer { id: 1, name: "Ada".into() });
        assert_eq!(o, Order { order_id: 10, total: 4.5 });
        assert_eq!(l, Line { id: 100, sku: "X-1".into() });
    }

    #[test]
    fn single_name_is_reused_and_matches_case_insensitively() {
        let row: Row = [("Id", json!(1)), ("name", json!("Ada")), ("id", json!(2)), ("sku", json!("S"))]
            .into_iter()
            .collect();
        let (c, l): (Customer, Line) = split2(&row, "").unwrap();
        assert_eq!(c.id, 1);
        assert_eq!(l, Line { id: 2, sku: "S".into() });
    }

    #[test]
    fn null_segment_becomes_none() {
        let row: Row = [("id", json!(1)), ("name", json!("Ada")), ("id", json!(null)), ("sku", json!(null))]
            .into_iter()
            .collect();
        let (_, line): (Customer, Option<Line>) = split2(&row, "id").unwrap();
        assert!(line.is_none());
    }

    #[test]
    fn missing_split_column() {
        let err = split2::<Customer, Line>(&joined(), "nope").unwrap_err();
        assert_eq!(err.kind(), "Split");
        assert!(err.to_string().contains("'nope'"), "{err}");
    }
}
