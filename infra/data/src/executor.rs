//! Async executor: one connection per call, closed on every exit path.

use crate::command::Command;
use crate::connection::{Connection, ConnectionFactory};
use crate::error::DataError;
use crate::params::Parameters;
use crate::row::Row;
use crate::split::{split2, split3};
use bootkit_domain::ExecutorKind;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

/// Runs commands against one connection string with one executor kind.
#[derive(Clone)]
pub struct DatabaseExecutor {
    connection_string: Arc<str>,
    factory: ConnectionFactory,
    kind: ExecutorKind,
}

impl DatabaseExecutor {
    /// # Errors
    /// [`DataError::MissingArgument`] for a blank connection string.
    pub fn new(
        connection_string: impl Into<Arc<str>>,
        factory: ConnectionFactory,
        kind: ExecutorKind,
    ) -> Result<Self, DataError> {
        let connection_string = connection_string.into();
        if connection_string.trim().is_empty() {
            return Err(DataError::MissingArgument { name: "connection_string".into(), context: None });
        }
        Ok(Self { connection_string, factory, kind })
    }

    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    #[must_use]
    pub const fn kind(&self) -> ExecutorKind {
        self.kind
    }

    /// Command for `sql` with this executor's kind.
    #[must_use]
    pub fn command(&self, sql: &str, params: Option<Parameters>) -> Command {
        Command::new(sql.to_owned(), params.unwrap_or_default(), self.kind)
    }

    /// Runs a non-query command and returns the affected row count.
    ///
    /// # Errors
    /// Driver failures, or [`DataError::Cancelled`].
    #[instrument(skip_all, fields(sql = %sql, kind = %self.kind))]
    pub async fn execute(
        &self,
        sql: &str,
        params: Option<Parameters>,
        cancel: Option<&CancellationToken>,
    ) -> Result<u64, DataError> {
        let command = self.command(sql, params);
        self.run("execute", cancel, move |c| Box::pin(async move { c.execute(&command).await })).await
    }

    /// # Errors
    /// Driver failures, [`DataError::Deserialize`] or [`DataError::Cancelled`].
    #[instrument(skip_all, fields(sql = %sql, kind = %self.kind))]
    pub async fn query<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: Option<Parameters>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<T>, DataError> {
        let rows = self.rows("query", sql, params, cancel).await?;
        rows.iter().map(Row::deserialize).collect()
    }

    /// First row as `T`, or `None` for an empty result.
    ///
    /// # Errors
    /// See [`DatabaseExecutor::query`].
    #[instrument(skip_all, fields(sql = %sql, kind = %self.kind))]
    pub async fn query_first<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: Option<Parameters>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<T>, DataError> {
        let rows = self.rows("query_first", sql, params, cancel).await?;
        rows.first().map(Row::deserialize).transpose()
    }

    /// Runs `map` over every row split into two shapes on `split_on` and returns the first
    /// result, so `map` can fold each row's child into a shared parent.
    ///
    /// # Errors
    /// See [`DatabaseExecutor::query_split_list`].
    #[instrument(skip_all, fields(sql = %sql, split_on = %split_on, kind = %self.kind))]
    pub async fn query_split<A, B, R, F>(
        &self,
        sql: &str,
        mut map: F,
        split_on: &str,
        params: Option<Parameters>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<R>, DataError>
    where
        A: DeserializeOwned,
        B: DeserializeOwned,
        F: FnMut(A, B) -> R,
    {
        let rows = self.rows("query_split", sql, params, cancel).await?;
        let mut first = None;
        for row in &rows {
            let mapped = split2(row, split_on).map(|(a, b)| map(a, b))?;
            first.get_or_insert(mapped);
        }
        Ok(first)
    }

    /// Maps every row as two shapes split on `split_on` (comma separated; blank means `id`).
    ///
    /// # Errors
    /// Driver failures, [`DataError::Split`] for a missing split column,
    /// [`DataError::Deserialize`] or [`DataError::Cancelled`].
    #[instrument(skip_all, fields(sql = %sql, split_on = %split_on, kind = %self.kind))]
    pub async fn query_split_list<A, B, R, F>(
        &self,
        sql: &str,
        mut map: F,
        split_on: &str,
        params: Option<Parameters>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<R>, DataError>
    where
        A: DeserializeOwned,
        B: DeserializeOwned,
        F: FnMut(A, B) -> R,
    {
        let rows = self.rows("query_split_list", sql, params, cancel).await?;
        rows.iter().map(|row| split2(row, split_on).map(|(a, b)| map(a, b))).collect()
    }

    /// Three-shape form of [`DatabaseExecutor::query_split`].
    ///
    /// # Errors
    /// See [`DatabaseExecutor::query_split_list`].
    #[instrument(skip_all, fields(sql = %sql, split_on = %split_on, kind = %self.kind))]
    pub async fn query_split3<A, B, C, R, F>(
        &self,
        sql: &str,
        mut map: F,
        split_on: &str,
        params: Option<Parameters>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<R>, DataError>
    where
        A: DeserializeOwned,
        B: DeserializeOwned,
        C: DeserializeOwned,
        F: FnMut(A, B, C) -> R,
    {
        let rows = self.rows("query_split3", sql, params, cancel).await?;
        let mut first = None;
        for row in &rows {
            let mapped = split3(row, split_on).map(|(a, b, c)| map(a, b, c))?;
            first.get_or_insert(mapped);
        }
        Ok(first)
    }

    /// Three-shape form of [`DatabaseExecutor::query_split_list`].
    ///
    /// # Errors
    /// See [`DatabaseExecutor::query_split_list`].
    #[instrument(skip_all, fields(sql = %sql, split_on = %split_on, kind = %self.kind))]
    pub async fn query_split_list3<A, B, C, R, F>(
        &self,
        sql: &str,
        mut map: F,
        split_on: &str,
        params: Option<Parameters>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<R>, DataError>
    where
        A: DeserializeOwned,
        B: DeserializeOwned,
        C: DeserializeOwned,
        F: FnMut(A, B, C) -> R,
    {
        let rows = self.rows("query_split_list3", sql, params, cancel).await?;
        rows.iter().map(|row| split3(row, split_on).map(|(a, b, c)| map(a, b, c))).collect()
    }

    /// Hands an opened connection to `action`; the connection is closed afterwards.
    ///
    /// # Errors
    /// Whatever `action` or the driver returns, or [`DataError::Cancelled`].
    ///
    /// ```rust,ignore
    /// let count = executor
    ///     .execute_custom(|conn| Box::pin(async move { conn.execute(&command).await }), None)
    ///     .await?;
    /// ```
    #[instrument(skip_all, fields(kind = %self.kind))]
    pub async fn execute_custom<T, F>(&self, action: F, cancel: Option<&CancellationToken>) -> Result<T, DataError>
    where
        F: for<'c> FnOnce(&'c mut dyn Connection) -> BoxFuture<'c, Result<T, DataError>>,
    {
        self.run("execute_custom", cancel, action).await
    }

    async fn rows(
        &self,
        operation: &'static str,
        sql: &str,
        params: Option<Parameters>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Row>, DataError> {
        let command = self.command(sql, params);
        self.run(operation, cancel, move |c| Box::pin(async move { c.query(&command).await })).await
    }

    async fn run<T, F>(
        &self,
        operation: &'static str,
        cancel: Option<&CancellationToken>,
        action: F,
    ) -> Result<T, DataError>
    where
        F: for<'c> FnOnce(&'c mut dyn Connection) -> BoxFuture<'c, Result<T, DataError>>,
    {
        let token = cancel.cloned().unwrap_or_default();
        if token.is_cancelled() {
            return Err(DataError::Cancelled { context: Some(operation.into()) });
        }

        let mut connection = (self.factory)(&self.connection_string);
        debug!(operation, "Connection created");

        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Err(DataError::Cancelled { context: Some(operation.into()) }),
            result = async {
                connection.open().await?;
                action(&mut *connection).await
            } => result,
        };

        if let Err(err) = connection.close().await {
            warn!(operation, error = %err, "Failed to close connection");
        }
        if let Err(err) = &outcome {
            error!(operation, kind = err.kind(), error = %err, "Database operation failed");
        }
        outcome
    }
}

impl fmt::Debug for DatabaseExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseExecutor").field("kind", &self.kind).finish_non_exhaustive()
    }
}
