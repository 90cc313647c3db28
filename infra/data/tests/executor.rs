use async_trait::async_trait;
use bootkit_data::{
    CancellationToken, Command, Connection, DataError, DatabaseExecutor, ExecutorKind, Parameters, Row,
    connection_factory,
};
use serde::Deserialize;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// What the fake connection does; shared with every connection the factory builds.
#[derive(Clone, Default)]
struct Script {
    log: Arc<Mutex<Vec<String>>>,
    rows: Vec<Row>,
    fail_open: bool,
    fail_query: bool,
    hang: bool,
}

impl Script {
    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn executor(&self, kind: ExecutorKind) -> DatabaseExecutor {
        let script = self.clone();
        let factory = connection_factory(move |cs: &str| FakeConnection { cs: cs.to_owned(), script: script.clone() });
        DatabaseExecutor::new("fake://orders", factory, kind).unwrap()
    }
}

struct FakeConnection {
    cs: String,
    script: Script,
}

impl FakeConnection {
    fn record(&self, entry: String) {
        self.script.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn open(&mut self) -> Result<(), DataError> {
        self.record(format!("open:{}", self.cs));
        if self.script.fail_open {
            return Err(DataError::Connection { message: "refused".into(), context: None });
        }
        Ok(())
    }

    async fn execute(&mut self, command: &Command) -> Result<u64, DataError> {
        self.record(format!("execute:{}:{}", command.kind, command.text));
        Ok(command.params.len() as u64)
    }

    async fn query(&mut self, command: &Command) -> Result<Vec<Row>, DataError> {
        self.record(format!("query:{}", command.text));
        if self.script.hang {
            futures::future::pending::<()>().await;
        }
        if self.script.fail_query {
            return Err(DataError::Command { message: "syntax error".into(), context: None });
        }
        Ok(self.script.rows.clone())
    }

    async fn close(&mut self) -> Result<(), DataError> {
        self.record("close".to_owned());
        Ok(())
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Customer {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Order {
    id: i64,
    total: f64,
}

fn customer_rows() -> Vec<Row> {
    vec![
        [("id", json!(1)), ("name", json!("Ada")), ("id", json!(10)), ("total", json!(2.5))].into_iter().collect(),
        [("id", json!(2)), ("name", json!("Linus")), ("id", json!(20)), ("total", json!(7.0))].into_iter().collect(),
    ]
}

#[tokio::test]
async fn query_opens_and_closes_exactly_one_connection() {
    let script = Script { rows: customer_rows(), ..Script::default() };

    let customers: Vec<Customer> = script.executor(ExecutorKind::Default).query("SELECT c", None, None).await.unwrap();

    assert_eq!(customers.len(), 2);
    assert_eq!(customers[1], Customer { id: 2, name: "Linus".into() });
    assert_eq!(script.log(), ["open:fake://orders", "query:SELECT c", "close"]);
}

#[tokio::test]
async fn failed_command_still_closes_the_connection() {
    let script = Script { fail_query: true, ..Script::default() };

    let err = script.executor(ExecutorKind::Default).query::<Customer>("SELECT", None, None).await.unwrap_err();

    assert_eq!(err.kind(), "Command");
    assert_eq!(script.log().last().map(String::as_str), Some("close"));
}

#[tokio::test]
async fn failed_open_skips_the_command() {
    let script = Script { fail_open: true, ..Script::default() };

    let err = script.executor(ExecutorKind::Default).execute("DELETE", None, None).await.unwrap_err();

    assert_eq!(err.kind(), "Connection");
    assert_eq!(script.log(), ["open:fake://orders", "close"]);
}

#[tokio::test]
async fn cancelled_token_never_opens_a_connection() {
    let script = Script::default();
    let token = CancellationToken::new();
    token.cancel();

    let err = script.executor(ExecutorKind::Default).execute("DELETE", None, Some(&token)).await.unwrap_err();

    assert!(matches!(err, DataError::Cancelled { .. }));
    assert!(script.log().is_empty());
}

#[tokio::test]
async fn cancellation_during_a_command_closes_the_connection() {
    let script = Script { hang: true, ..Script::default() };
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        canceller.cancel();
    });

    let err = script.executor(ExecutorKind::Default).query::<Customer>("SELECT", None, Some(&token)).await.unwrap_err();

    assert_eq!(err.kind(), "Cancelled");
    assert_eq!(script.log(), ["open:fake://orders", "query:SELECT", "close"]);
}

#[tokio::test]
async fn query_first_of_nothing_is_none() {
    let script = Script::default();
    let first: Option<Customer> = script.executor(ExecutorKind::Default).query_first("SELECT", None, None).await.unwrap();
    assert!(first.is_none());
}

#[tokio::test]
async fn execute_passes_kind_and_parameters() {
    let script = Script::default();
    let params = Parameters::new().with("@id", 1).with("@name", "x");

    let affected = script.executor(ExecutorKind::StoredProc).execute("sp_touch", Some(params), None).await.unwrap();

    assert_eq!(affected, 2);
    assert_eq!(script.log()[1], "execute:stored_proc:sp_touch");
}

#[tokio::test]
async fn split_list_maps_every_row() {
    let script = Script { rows: customer_rows(), ..Script::default() };

    let pairs = script
        .executor(ExecutorKind::Default)
        .query_split_list("SELECT c.*, o.*", |c: Customer, o: Order| (c.name, o.total), "id", None, None)
        .await
        .unwrap();

    assert_eq!(pairs, [("Ada".to_owned(), 2.5), ("Linus".to_owned(), 7.0)]);
}

#[derive(Debug)]
struct CustomerOrders {
    id: i64,
    orders: Vec<i64>,
}

fn one_customer_three_orders() -> Vec<Row> {
    [10, 11, 12]
        .into_iter()
        .map(|order| {
            [("id", json!(1)), ("name", json!("Ada")), ("id", json!(order)), ("total", json!(1.0)), ("id", json!(7))]
                .into_iter()
                .collect()
        })
        .collect()
}

#[tokio::test]
async fn split_folds_every_row_into_the_first_parent() {
    let script = Script { rows: one_customer_three_orders(), ..Script::default() };
    let mut parents: HashMap<i64, Rc<RefCell<CustomerOrders>>> = HashMap::new();

    let customer = script
        .executor(ExecutorKind::Default)
        .query_split(
            "SELECT",
            |c: Customer, o: Order| {
                let parent = parents
                    .entry(c.id)
                    .or_insert_with(|| Rc::new(RefCell::new(CustomerOrders { id: c.id, orders: Vec::new() })));
                parent.borrow_mut().orders.push(o.id);
                Rc::clone(parent)
            },
            "id",
            Some(Parameters::new().with("@customer", 1)),
            None,
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(customer.borrow().id, 1);
    assert_eq!(customer.borrow().orders, [10, 11, 12]);
}

#[tokio::test]
async fn three_way_split_folds_every_row_into_the_first_parent() {
    let script = Script { rows: one_customer_three_orders(), ..Script::default() };
    let mut calls = Vec::new();

    let first = script
        .executor(ExecutorKind::Default)
        .query_split3(
            "SELECT",
            |c: Customer, o: Order, tag: Tag| {
                calls.push((o.id, tag.id));
                c.id
            },
            "id",
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(first, Some(1));
    assert_eq!(calls, [(10, 7), (11, 7), (12, 7)]);
}

#[tokio::test]
async fn split_of_no_rows_is_none() {
    let script = Script::default();

    let first = script
        .executor(ExecutorKind::Default)
        .query_split("SELECT", |c: Customer, _: Order| c.id, "id", None, None)
        .await
        .unwrap();

    assert!(first.is_none());
}

#[derive(Debug, Deserialize)]
struct Tag {
    id: i64,
}

#[tokio::test]
async fn three_way_split() {
    let row: Row = [
        ("id", json!(1)),
        ("name", json!("Ada")),
        ("id", json!(10)),
        ("total", json!(2.5)),
        ("id", json!(100)),
        ("name", json!("Widget")),
    ]
    .into_iter()
    .collect();
    let script = Script { rows: vec![row], ..Script::default() };
    let executor = script.executor(ExecutorKind::Default);

    let first = executor
        .query_split3("SELECT", |c: Customer, o: Order, p: Customer| (c.id, o.id, p.name), "id", None, None)
        .await
        .unwrap();
    let all = executor
        .query_split_list3("SELECT", |_: Customer, _: Order, p: Customer| p.id, "id,id", None, None)
        .await
        .unwrap();

    assert_eq!(first, Some((1, 10, "Widget".to_owned())));
    assert_eq!(all, [100]);
}

#[tokio::test]
async fn missing_split_column_is_reported() {
    let script = Script { rows: customer_rows(), ..Script::default() };

    let err = script
        .executor(ExecutorKind::Default)
        .query_split_list("SELECT", |c: Customer, o: Order| (c, o), "order_id", None, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "Split");
    assert_eq!(script.log().last().map(String::as_str), Some("close"));
}

#[tokio::test]
async fn custom_action_shares_one_connection() {
    let script = Script { rows: customer_rows(), ..Script::default() };
    let executor = script.executor(ExecutorKind::Default);
    let insert = executor.command("INSERT", None);
    let select = executor.command("SELECT", None);

    let count = executor
        .execute_custom(
            |conn| {
                Box::pin(async move {
                    conn.execute(&insert).await?;
                    Ok::<_, DataError>(conn.query(&select).await?.len())
                })
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert_eq!(script.log(), ["open:fake://orders", "execute:default:INSERT", "query:SELECT", "close"]);
}

#[test]
fn blank_connection_string_is_rejected() {
    let factory = connection_factory(|cs: &str| FakeConnection { cs: cs.to_owned(), script: Script::default() });
    let err = DatabaseExecutor::new("  ", factory, ExecutorKind::Default).unwrap_err();
    assert!(matches!(err, DataError::MissingArgument { ref name, .. } if name == "connection_string"));
}
