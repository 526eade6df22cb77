//! End-to-end behavior of Table and Row against a scripted executor.

use std::collections::VecDeque;
use std::sync::Mutex;

use activerow::{
    Executor, OrmConfig, OrmError, OrmResult, Record, SchemaCache, Table, Value, WriteOutcome,
};

/// Replays canned results and records every statement it receives.
#[derive(Default)]
struct MockExecutor {
    schema: Vec<Record>,
    results: Mutex<VecDeque<Vec<Record>>>,
    outcome: Mutex<WriteOutcome>,
    queries: Mutex<Vec<(String, Vec<Value>)>>,
    writes: Mutex<Vec<(String, Vec<(String, Value)>)>>,
    introspections: Mutex<usize>,
}

impl MockExecutor {
    fn new(schema: Vec<Record>) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    fn push_result(&self, rows: Vec<Record>) {
        self.results.lock().unwrap().push_back(rows);
    }

    fn set_outcome(&self, outcome: WriteOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    fn queries(&self) -> Vec<(String, Vec<Value>)> {
        self.queries.lock().unwrap().clone()
    }

    fn writes(&self) -> Vec<(String, Vec<(String, Value)>)> {
        self.writes.lock().unwrap().clone()
    }

    fn introspections(&self) -> usize {
        *self.introspections.lock().unwrap()
    }
}

impl Executor for MockExecutor {
    async fn introspect(&self, _table: &str) -> OrmResult<Vec<Record>> {
        *self.introspections.lock().unwrap() += 1;
        Ok(self.schema.clone())
    }

    async fn query(&self, sql: &str, bindings: &[Value]) -> OrmResult<Vec<Record>> {
        self.queries
            .lock()
            .unwrap()
            .push((sql.to_string(), bindings.to_vec()));
        Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn execute(&self, sql: &str, params: &[(String, Value)]) -> OrmResult<WriteOutcome> {
        self.writes
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(*self.outcome.lock().unwrap())
    }
}

fn column(name: &str, ty: &str, null: &str, key: &str, extra: &str) -> Record {
    [
        ("Field".to_string(), Value::from(name)),
        ("Type".to_string(), Value::from(ty)),
        ("Null".to_string(), Value::from(null)),
        ("Key".to_string(), Value::from(key)),
        ("Default".to_string(), Value::Null),
        ("Extra".to_string(), Value::from(extra)),
    ]
    .into_iter()
    .collect()
}

fn users_schema() -> Vec<Record> {
    vec![
        column("id", "int(11)", "NO", "PRI", "auto_increment"),
        column("name", "varchar(50)", "NO", "", ""),
        column("age", "int(11)", "YES", "", ""),
        column("created_at", "datetime", "YES", "", ""),
    ]
}

fn user_record(id: i64, name: &str) -> Record {
    [
        ("id".to_string(), Value::Int(id)),
        ("name".to_string(), Value::from(name)),
        ("age".to_string(), Value::Int(30)),
    ]
    .into_iter()
    .collect()
}

#[tokio::test]
async fn load_builds_the_schema() {
    let client = MockExecutor::new(users_schema());
    let table = Table::load(&client, "users").await.unwrap();
    assert_eq!(table.name(), "users");
    assert_eq!(table.primary_key(), Some("id"));
    let name = table.schema().field("name").unwrap();
    assert_eq!(name.base_type, "varchar");
    assert_eq!(name.length, Some(50));
    assert_eq!(client.introspections(), 1);
}

#[tokio::test]
async fn cached_loads_introspect_once() {
    let client = MockExecutor::new(users_schema());
    let cache = SchemaCache::new();
    let first = Table::load_cached(&client, "users", &cache).await.unwrap();
    let second = Table::load_cached(&client, "users", &cache).await.unwrap();
    assert_eq!(first.primary_key(), second.primary_key());
    assert_eq!(client.introspections(), 1);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn find_by_pk_parameterizes_the_lookup() {
    let client = MockExecutor::new(users_schema());
    client.push_result(vec![user_record(7, "alice")]);
    let table = Table::load(&client, "users").await.unwrap();

    let row = table.find_by_pk(&client, 7).await.unwrap().unwrap();
    assert_eq!(row.get("name"), Some(&Value::from("alice")));

    let (sql, bindings) = client.queries().pop().unwrap();
    assert_eq!(sql, "select * from users where id = ?");
    assert_eq!(bindings, vec![Value::Int(7)]);
}

#[tokio::test]
async fn find_by_pk_misses_return_none() {
    let client = MockExecutor::new(users_schema());
    client.push_result(vec![]);
    let table = Table::load(&client, "users").await.unwrap();
    assert!(table.find_by_pk(&client, 99).await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_pks_issues_one_query_per_id() {
    let client = MockExecutor::new(users_schema());
    client.push_result(vec![user_record(1, "a")]);
    client.push_result(vec![]);
    client.push_result(vec![user_record(3, "c")]);
    let table = Table::load(&client, "users").await.unwrap();

    let rows = table.find_by_pks(&client, [1, 2, 3]).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(client.queries().len(), 3);
}

#[tokio::test]
async fn hydrated_rows_are_clean_and_save_is_a_noop() {
    let client = MockExecutor::new(users_schema());
    client.push_result(vec![user_record(1, "alice")]);
    let table = Table::load(&client, "users").await.unwrap();

    let mut row = table.find(&client).await.unwrap().unwrap();
    assert!(!row.is_dirty());
    row.save(&client).await.unwrap();
    assert!(client.writes().is_empty());
}

#[tokio::test]
async fn save_updates_only_the_mutated_column() {
    let client = MockExecutor::new(users_schema());
    client.push_result(vec![user_record(1, "alice")]);
    client.set_outcome(WriteOutcome {
        affected_rows: 1,
        last_insert_id: None,
    });
    let table = Table::load(&client, "users").await.unwrap();

    let mut row = table.find(&client).await.unwrap().unwrap();
    row.set("name", "bob");
    row.save(&client).await.unwrap();

    let (sql, params) = client.writes().pop().unwrap();
    assert_eq!(sql, "UPDATE users SET name = :name WHERE id = :id");
    assert_eq!(
        params,
        vec![
            ("name".to_string(), Value::from("bob")),
            ("id".to_string(), Value::Int(1)),
        ]
    );

    // a second save has nothing left to write
    row.save(&client).await.unwrap();
    assert_eq!(client.writes().len(), 1);
}

#[tokio::test]
async fn save_without_a_key_value_fails() {
    let client = MockExecutor::new(users_schema());
    let table = Table::load(&client, "users").await.unwrap();
    let mut row = table.new_row();
    row.set("name", "nobody");
    assert!(matches!(
        row.save(&client).await,
        Err(OrmError::MissingPrimaryKey { .. })
    ));
}

#[tokio::test]
async fn add_returns_the_generated_id_and_cleans_the_row() {
    let client = MockExecutor::new(users_schema());
    client.set_outcome(WriteOutcome {
        affected_rows: 1,
        last_insert_id: Some(41),
    });
    let table = Table::load(&client, "users").await.unwrap();

    let mut row = table.new_row();
    row.set("name", "carol");
    let id = row.add(&client).await.unwrap();
    assert_eq!(id, Some(41));
    assert_eq!(row.get("id"), Some(&Value::Int(41)));

    let (sql, params) = client.writes().pop().unwrap();
    assert_eq!(sql, "INSERT INTO users (name) VALUES (:name)");
    assert_eq!(params, vec![("name".to_string(), Value::from("carol"))]);

    // immediately saving the fresh row issues no statement
    row.save(&client).await.unwrap();
    assert_eq!(client.writes().len(), 1);
}

#[tokio::test]
async fn add_inlines_raw_expressions() {
    let client = MockExecutor::new(users_schema());
    client.set_outcome(WriteOutcome {
        affected_rows: 1,
        last_insert_id: Some(5),
    });
    let table = Table::load(&client, "users").await.unwrap();

    let mut row = table.new_row();
    row.set("name", "dave");
    row.set_raw("created_at", "NOW()");
    row.add(&client).await.unwrap();

    let (sql, params) = client.writes().pop().unwrap();
    assert_eq!(
        sql,
        "INSERT INTO users (created_at, name) VALUES (NOW(), :name)"
    );
    assert_eq!(params, vec![("name".to_string(), Value::from("dave"))]);
}

#[tokio::test]
async fn delete_clears_the_row_state() {
    let client = MockExecutor::new(users_schema());
    client.push_result(vec![user_record(1, "alice")]);
    client.set_outcome(WriteOutcome {
        affected_rows: 1,
        last_insert_id: None,
    });
    let table = Table::load(&client, "users").await.unwrap();

    let mut row = table.find(&client).await.unwrap().unwrap();
    row.delete(&client).await.unwrap();
    assert!(row.get("id").is_none());

    let (sql, params) = client.writes().pop().unwrap();
    assert_eq!(sql, "DELETE FROM users WHERE id = :id");
    assert_eq!(params, vec![("id".to_string(), Value::Int(1))]);
}

#[tokio::test]
async fn delete_reports_zero_affected_rows() {
    let client = MockExecutor::new(users_schema());
    client.push_result(vec![user_record(1, "alice")]);
    client.set_outcome(WriteOutcome {
        affected_rows: 0,
        last_insert_id: None,
    });
    let table = Table::load(&client, "users").await.unwrap();

    let mut row = table.find(&client).await.unwrap().unwrap();
    let err = row.delete(&client).await.unwrap_err();
    assert!(err.is_not_found());
    // the row keeps its state on failure
    assert_eq!(row.get("id"), Some(&Value::Int(1)));
}

#[tokio::test]
async fn validation_rejects_an_overlong_value_before_any_sql() {
    let client = MockExecutor::new(users_schema());
    let table = Table::load(&client, "users").await.unwrap();

    let mut row = table.new_row();
    row.set("id", 1);
    row.set("name", "x".repeat(51));
    assert!(matches!(
        row.save(&client).await,
        Err(OrmError::LengthExceeded { max: 50, .. })
    ));
    assert!(client.writes().is_empty());
}

#[tokio::test]
async fn disabled_validation_lets_values_through() {
    let client = MockExecutor::new(users_schema());
    client.set_outcome(WriteOutcome {
        affected_rows: 1,
        last_insert_id: None,
    });
    let config = OrmConfig::new().validate_fields(false);
    let table = Table::load(&client, "users").await.unwrap().config(config);

    let mut row = table.new_row();
    row.set("id", 1);
    row.set("name", "x".repeat(51));
    row.save(&client).await.unwrap();
    assert_eq!(client.writes().len(), 1);
}

/// Fails every call with a driver-style error.
struct FailingExecutor;

impl Executor for FailingExecutor {
    async fn introspect(&self, _table: &str) -> OrmResult<Vec<Record>> {
        Err(OrmError::execution(1064, "syntax error"))
    }

    async fn query(&self, _sql: &str, _bindings: &[Value]) -> OrmResult<Vec<Record>> {
        Err(OrmError::execution(1064, "syntax error"))
    }

    async fn execute(
        &self,
        _sql: &str,
        _params: &[(String, Value)],
    ) -> OrmResult<WriteOutcome> {
        Err(OrmError::execution(1062, "duplicate entry"))
    }
}

#[tokio::test]
async fn executor_errors_surface_unretried() {
    let schema_client = MockExecutor::new(users_schema());
    let table = Table::load(&schema_client, "users").await.unwrap();

    let err = table.find_all(&FailingExecutor).await.unwrap_err();
    assert!(matches!(err, OrmError::Execution { code: 1064, .. }));

    let mut row = table.new_row();
    row.set("name", "eve");
    let err = row.add(&FailingExecutor).await.unwrap_err();
    assert!(matches!(err, OrmError::Execution { code: 1062, .. }));
}

#[tokio::test]
async fn accumulated_builder_state_reaches_the_executor() {
    let client = MockExecutor::new(users_schema());
    client.push_result(vec![]);
    let table = Table::load(&client, "users").await.unwrap();

    table
        .select(["name"])
        .where_clause("age", ">", 18)
        .or_where_nested(|q| q.where_eq("name", "root").where_between("age", 1, 10))
        .order_by("name", "upwards") // normalizes to desc
        .limit(5)
        .offset(10)
        .find_all(&client)
        .await
        .unwrap();

    let (sql, bindings) = client.queries().pop().unwrap();
    assert_eq!(
        sql,
        "select name, id from users where age > ? or (name = ? and age between ? and ?) \
         order by name desc limit 5 offset 10"
    );
    assert_eq!(
        bindings,
        vec![Value::Int(18), Value::from("root"), Value::Int(1), Value::Int(10)]
    );
}
