//! Sample orders repository over the SQLite executor.

use bootkit::data::{CancellationToken, DataError, DatabaseExecutor, Parameters, Repository};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub id: i64,
    pub total: f64,
}

/// An order joined with its customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerOrder {
    pub customer: Customer,
    pub order: Order,
}

#[derive(Debug)]
pub struct OrdersRepository {
    executor: DatabaseExecutor,
}

impl Repository for OrdersRepository {
    fn new(executor: DatabaseExecutor) -> Self {
        Self { executor }
    }
}

impl OrdersRepository {
    /// Creates the tables when missing.
    ///
    /// # Errors
    /// Any [`DataError`] from the executor.
    pub async fn migrate(&self, cancel: &CancellationToken) -> Result<(), DataError> {
        for ddl in [
            "CREATE TABLE IF NOT EXISTS customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
            "CREATE TABLE IF NOT EXISTS orders (id INTEGER PRIMARY KEY, customer_id INTEGER NOT NULL, total REAL NOT NULL)",
        ] {
            self.executor.execute(ddl, None, Some(cancel)).await?;
        }
        Ok(())
    }

    /// # Errors
    /// Any [`DataError`] from the executor.
    pub async fn add_customer(&self, name: &str, cancel: &CancellationToken) -> Result<i64, DataError> {
        let params = Parameters::new().with("@name", name);
        self.executor.execute("INSERT INTO customers (name) VALUES (@name)", Some(params.clone()), Some(cancel)).await?;
        let id: Option<i64> = self
            .executor
            .query_first::<Customer>("SELECT id, name FROM customers WHERE name = @name ORDER BY id DESC", Some(params), Some(cancel))
            .await?
            .map(|c| c.id);
        id.ok_or_else(|| DataError::Internal { message: "inserted customer not found".into(), context: None })
    }

    /// # Errors
    /// Any [`DataError`] from the executor.
    pub async fn add_order(&self, customer_id: i64, total: f64, cancel: &CancellationToken) -> Result<u64, DataError> {
        let params = Parameters::new().with("@customer", customer_id).with("@total", total);
        self.executor
            .execute("INSERT INTO orders (customer_id, total) VALUES (@customer, @total)", Some(params), Some(cancel))
            .await
    }

    /// Every order with its customer, oldest first.
    ///
    /// # Errors
    /// Any [`DataError`] from the executor.
    pub async fn with_customers(&self, cancel: &CancellationToken) -> Result<Vec<CustomerOrder>, DataError> {
        let orders = self
            .executor
            .query_split_list(
                "SELECT c.id, c.name, o.id, o.total FROM orders o JOIN customers c ON c.id = o.customer_id ORDER BY o.id",
                |customer, order| CustomerOrder { customer, order },
                "id",
                None,
                Some(cancel),
            )
            .await?;
        info!(count = orders.len(), "Orders loaded");
        Ok(orders)
    }
}
