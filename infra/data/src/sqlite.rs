//! SQLite [`Connection`] over `sqlx`.
//!
//! Named placeholders (`@name`, `:name`, `$name`) are rewritten to numbered `?N`
//! placeholders; every distinct name is bound once, in order of first appearance.

use crate::command::Command;
use crate::connection::{Connection, ConnectionFactory, connection_factory};
use crate::error::{DataError, DataErrorExt};
use crate::params::Parameters;
use crate::row::Row;
use crate::value::DbValue;
use async_trait::async_trait;
use bootkit_domain::ExecutorKind;
use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column as _, Connection as _, Row as _, Sqlite};
use tracing::{debug, trace};

type Query<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// A lazily opened SQLite connection.
pub struct SqliteConnection {
    url: String,
    inner: Option<sqlx::SqliteConnection>,
}

impl SqliteConnection {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), inner: None }
    }

    /// Factory building a [`SqliteConnection`] per connection string.
    #[must_use]
    pub fn factory() -> ConnectionFactory {
        connection_factory(|url: &str| Self::new(url))
    }

    fn opened(&mut self) -> Result<&mut sqlx::SqliteConnection, DataError> {
        self.inner.as_mut().ok_or_else(|| DataError::Connection {
            message: "connection is not open".into(),
            context: None,
        })
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection").field("open", &self.inner.is_some()).finish_non_exhaustive()
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    async fn open(&mut self) -> Result<(), DataError> {
        if self.inner.is_none() {
            let connection = sqlx::SqliteConnection::connect(&self.url).await.context("Failed to open SQLite")?;
            self.inner = Some(connection);
            debug!("SQLite connection opened");
        }
        Ok(())
    }

    async fn execute(&mut self, command: &Command) -> Result<u64, DataError> {
        let (sql, values) = prepare(command)?;
        let connection = self.opened()?;
        let result = bind(sqlx::query(&sql), values).execute(&mut *connection).await.context("Failed to execute")?;
        Ok(result.rows_affected())
    }

    async fn query(&mut self, command: &Command) -> Result<Vec<Row>, DataError> {
        let (sql, values) = prepare(command)?;
        let connection = self.opened()?;
        let rows = bind(sqlx::query(&sql), values).fetch_all(&mut *connection).await.context("Failed to query")?;
        rows.iter().map(decode_row).collect()
    }

    async fn close(&mut self) -> Result<(), DataError> {
        if let Some(connection) = self.inner.take() {
            connection.close().await.context("Failed to close SQLite")?;
            debug!("SQLite connection closed");
        }
        Ok(())
    }
}

fn prepare(command: &Command) -> Result<(String, Vec<DbValue>), DataError> {
    if command.kind == ExecutorKind::StoredProc {
        return Err(DataError::Unsupported {
            message: "SQLite has no stored procedures".into(),
            context: Some(command.text.to_string().into()),
        });
    }
    let (sql, names) = rewrite_placeholders(&command.text);
    trace!(%sql, params = names.len(), "Prepared SQLite statement");
    let values = resolve(&names, &command.params)?;
    Ok((sql, values))
}

fn resolve(names: &[String], params: &Parameters) -> Result<Vec<DbValue>, DataError> {
    names
        .iter()
        .map(|name| {
            params.get(name).cloned().ok_or_else(|| DataError::Command {
                message: format!("parameter '{name}' has no value").into(),
                context: None,
            })
        })
        .collect()
}

/// Rewrites named placeholders outside quoted text; returns the SQL and distinct names.
fn rewrite_placeholders(sql: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = sql.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                out.push(c);
            },
            '@' | ':' | '$' if chars.peek().is_some_and(|(_, n)| n.is_ascii_alphabetic() || *n == '_') => {
                let start = i + 1;
                let mut end = start;
                while let Some((j, n)) = chars.peek().copied() {
                    if !(n.is_ascii_alphanumeric() || n == '_') {
                        break;
                    }
                    end = j + n.len_utf8();
                    chars.next();
                }
                let name = &sql[start..end];
                let index = match names.iter().position(|n| n.eq_ignore_ascii_case(name)) {
                    Some(index) => index,
                    None => {
                        names.push(name.to_owned());
                        names.len() - 1
                    },
                };
                out.push('?');
                out.push_str(&(index + 1).to_string());
            },
            _ => out.push(c),
        }
    }
    (out, names)
}

fn bind(mut query: Query<'_>, values: Vec<DbValue>) -> Query<'_> {
    for value in values {
        query = match value {
            DbValue::Null => query.bind(None::<i64>),
            DbValue::Bool(b) => query.bind(b),
            DbValue::Int(i) => query.bind(i),
            DbValue::Float(f) => query.bind(f),
            DbValue::Text(s) => query.bind(s),
            DbValue::Bytes(b) => query.bind(b),
            DbValue::Json(j) => query.bind(j.to_string()),
        };
    }
    query
}

/// Decodes a row by trying integer, real, text and blob in turn.
fn decode_row(row: &SqliteRow) -> Result<Row, DataError> {
    let mut columns = Vec::with_capacity(row.columns().len());
    for column in row.columns() {
        let index = column.ordinal();
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
            v.map_or(Value::Null, Value::from)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
            v.map_or(Value::Null, Value::from)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(index) {
            v.map_or(Value::Null, Value::String)
        } else {
            let bytes: Option<Vec<u8>> = row.try_get(index).context(column.name().to_owned())?;
            bytes.map_or(Value::Null, Value::from)
        };
        columns.push((column.name().to_owned(), value));
    }
    Ok(Row::new(columns))
}
