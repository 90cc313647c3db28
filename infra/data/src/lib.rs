//! # Data Access
//!
//! Async database executors over a driver-neutral [`Connection`] contract.
//!
//! ## Key Features
//! - **One connection per call**: every executor operation opens a connection, runs one
//!   command and closes it on every exit path, cancellation included.
//! - **Split mapping**: joined rows are cut on named columns and mapped into two or three shapes.
//! - **Per-consumer configuration**: connection name, connection factory and executor kind
//!   can be overridden per repository type.
//! - **SQLite adapter** (`sqlite` feature, on by default) over `sqlx`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bootkit_data::{DatabaseExecutor, ExecutorKind, Parameters, SqliteConnection};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Order {
//!     id: i64,
//!     total: f64,
//! }
//!
//! # async fn run() -> Result<(), bootkit_data::DataError> {
//! let executor = DatabaseExecutor::new("sqlite://orders.db", SqliteConnection::factory(), ExecutorKind::Default)?;
//! let params = Parameters::new().with("@min", 10.0);
//! let orders: Vec<Order> = executor.query("SELECT id, total FROM orders WHERE total > @min", Some(params), None).await?;
//! # Ok(())
//! # }
//! ```

mod command;
mod config;
mod connection;
mod error;
mod executor;
mod factory;
mod params;
mod repository;
mod row;
mod split;
#[cfg(feature = "sqlite")]
mod sqlite;
mod value;

pub use command::Command;
pub use config::{ConsumerKey, DatabaseConfigProvider, DatabaseConfigProviderBuilder, SharedSettings};
pub use connection::{Connection, ConnectionFactory, connection_factory};
pub use error::{DataError, DataErrorExt};
pub use executor::DatabaseExecutor;
pub use factory::DatabaseExecutorFactory;
pub use params::Parameters;
pub use repository::{Repository, register_executor_factory, register_repository, register_repository_as};
pub use row::Row;
pub use split::DEFAULT_SPLIT_ON;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;
pub use value::DbValue;

pub use bootkit_domain::ExecutorKind;
pub use tokio_util::sync::CancellationToken;
