use crate::command::Command;
use crate::error::DataError;
use crate::row::Row;
use async_trait::async_trait;
use std::sync::Arc;

/// A single driver connection, opened and closed around one executor call.
///
/// `close` must succeed on a connection that was never opened or failed to open.
#[async_trait]
pub trait Connection: Send {
    async fn open(&mut self) -> Result<(), DataError>;

    /// Runs a command that returns no rows; yields the affected row count.
    async fn execute(&mut self, command: &Command) -> Result<u64, DataError>;

    async fn query(&mut self, command: &Command) -> Result<Vec<Row>, DataError>;

    async fn close(&mut self) -> Result<(), DataError>;
}

/// Builds an unopened connection for a connection string.
pub type ConnectionFactory = Arc<dyn Fn(&str) -> Box<dyn Connection> + Send + Sync>;

/// Wraps a closure as a [`ConnectionFactory`].
pub fn connection_factory<F, C>(factory: F) -> ConnectionFactory
where
    F: Fn(&str) -> C + Send + Sync + 'static,
    C: Connection + 'static,
{
    Arc::new(move |connection_string| Box::new(factory(connection_string)) as Box<dyn Connection>)
}
