//! Table access: schema loading, query accumulation and row hydration.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::config::OrmConfig;
use crate::error::{OrmError, OrmResult};
use crate::executor::{Executor, Record};
use crate::qb::{QueryBuilder, QueryCompiler};
use crate::row::Row;
use crate::schema::{SchemaCache, TableSchema};
use crate::value::Value;

/// One table of the target database, with its introspected schema and an
/// accumulated query under construction.
///
/// `Table` is itself the query builder: the fluent methods delegate to an
/// inner [`QueryBuilder`] and the finders compile and execute it. Fetched
/// records come back as [`Row`]s with every column marked clean.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Arc<TableSchema>,
    builder: QueryBuilder,
    config: OrmConfig,
}

impl Table {
    /// Introspect `name` through the executor and build a fresh table handle.
    pub async fn load(client: &impl Executor, name: &str) -> OrmResult<Self> {
        let records = client.introspect(name).await?;
        Ok(Self::with_schema(Arc::new(TableSchema::from_records(
            name, &records,
        ))))
    }

    /// Like [`Table::load`], but through a caller-owned [`SchemaCache`] so
    /// repeated loads of the same table introspect once.
    pub async fn load_cached(
        client: &impl Executor,
        name: &str,
        cache: &SchemaCache,
    ) -> OrmResult<Self> {
        Ok(Self::with_schema(cache.schema(client, name).await?))
    }

    /// Build a table over an already-loaded schema.
    pub fn with_schema(schema: Arc<TableSchema>) -> Self {
        let builder = QueryBuilder::new(schema.name());
        Self {
            schema,
            builder,
            config: OrmConfig::default(),
        }
    }

    /// Replace the configuration carried into rows.
    pub fn config(mut self, config: OrmConfig) -> Self {
        self.config = config;
        self
    }

    /// The table's schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// The table name.
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// The designated primary key column, when the schema declares one.
    pub fn primary_key(&self) -> Option<&str> {
        self.schema.primary_key()
    }

    /// A fresh empty row for this table.
    pub fn new_row(&self) -> Row {
        Row::new(self.schema.clone()).config(self.config)
    }

    // ==================== builder delegation ====================

    /// Select columns. The primary key is always appended and the list
    /// deduplicated, so fetched rows stay identifiable no matter what the
    /// caller asked for. A bare `*` selection is left untouched.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            columns.push("*".to_string());
        }
        if !(columns.len() == 1 && columns[0] == "*") {
            if let Some(pk) = self.schema.primary_key() {
                columns.push(pk.to_string());
            }
            let mut seen = HashSet::new();
            columns.retain(|c| seen.insert(c.clone()));
        }
        self.builder = self.builder.select(columns);
        self
    }

    /// The table's identity is fixed at load time; this exists for API
    /// symmetry with the plain builder and ignores its argument.
    pub fn from(self, _table: &str) -> Self {
        self
    }

    /// See [`QueryBuilder::distinct`].
    pub fn distinct(mut self) -> Self {
        self.builder = self.builder.distinct();
        self
    }

    /// See [`QueryBuilder::where_clause`].
    pub fn where_clause(mut self, column: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.builder = self.builder.where_clause(column, operator, value);
        self
    }

    /// See [`QueryBuilder::or_where_clause`].
    pub fn or_where_clause(
        mut self,
        column: &str,
        operator: &str,
        value: impl Into<Value>,
    ) -> Self {
        self.builder = self.builder.or_where_clause(column, operator, value);
        self
    }

    /// See [`QueryBuilder::where_eq`].
    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.builder = self.builder.where_eq(column, value);
        self
    }

    /// See [`QueryBuilder::or_where_eq`].
    pub fn or_where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.builder = self.builder.or_where_eq(column, value);
        self
    }

    /// See [`QueryBuilder::where_map`].
    pub fn where_map<I, S, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        self.builder = self.builder.where_map(pairs);
        self
    }

    /// See [`QueryBuilder::where_nested`].
    pub fn where_nested<F>(mut self, f: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        self.builder = self.builder.where_nested(f);
        self
    }

    /// See [`QueryBuilder::or_where_nested`].
    pub fn or_where_nested<F>(mut self, f: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        self.builder = self.builder.or_where_nested(f);
        self
    }

    /// See [`QueryBuilder::where_between`].
    pub fn where_between(
        mut self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.builder = self.builder.where_between(column, low, high);
        self
    }

    /// See [`QueryBuilder::where_not_between`].
    pub fn where_not_between(
        mut self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.builder = self.builder.where_not_between(column, low, high);
        self
    }

    /// See [`QueryBuilder::group_by`].
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builder = self.builder.group_by(columns);
        self
    }

    /// See [`QueryBuilder::having`].
    pub fn having(mut self, column: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.builder = self.builder.having(column, operator, value);
        self
    }

    /// See [`QueryBuilder::or_having`].
    pub fn or_having(mut self, column: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.builder = self.builder.or_having(column, operator, value);
        self
    }

    /// See [`QueryBuilder::order_by`].
    pub fn order_by(mut self, column: &str, direction: &str) -> Self {
        self.builder = self.builder.order_by(column, direction);
        self
    }

    /// See [`QueryBuilder::limit`].
    pub fn limit(mut self, n: i64) -> Self {
        self.builder = self.builder.limit(n);
        self
    }

    /// See [`QueryBuilder::offset`].
    pub fn offset(mut self, n: i64) -> Self {
        self.builder = self.builder.offset(n);
        self
    }

    /// The accumulated query's SQL (for debugging).
    pub fn to_sql(&self) -> String {
        QueryCompiler::compile_select(&self.builder)
    }

    // ==================== finders ====================

    /// Fetch a single row by primary-key equality; `None` when absent.
    pub async fn find_by_pk(
        &self,
        client: &impl Executor,
        id: impl Into<Value>,
    ) -> OrmResult<Option<Row>> {
        let pk = self.required_pk()?;
        let query = QueryBuilder::new(self.schema.name()).where_eq(pk, id);
        let sql = QueryCompiler::compile_select(&query);
        let bindings = QueryCompiler::get_bindings(&query);
        debug!(sql = %sql, "find_by_pk");
        let mut records = client.query(&sql, &bindings).await?;
        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.hydrate(records.remove(0))))
    }

    /// Fetch many rows, one parameterized query per id.
    ///
    /// The first executor error aborts the remaining lookups; ids that match
    /// nothing are skipped silently.
    pub async fn find_by_pks<I, V>(&self, client: &impl Executor, ids: I) -> OrmResult<Vec<Row>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut rows = Vec::new();
        for id in ids {
            if let Some(row) = self.find_by_pk(client, id).await? {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Compile the accumulated query and fetch every matching row.
    pub async fn find_all(&self, client: &impl Executor) -> OrmResult<Vec<Row>> {
        let sql = QueryCompiler::compile_select(&self.builder);
        let bindings = QueryCompiler::get_bindings(&self.builder);
        debug!(sql = %sql, "find_all");
        let records = client.query(&sql, &bindings).await?;
        Ok(records.into_iter().map(|r| self.hydrate(r)).collect())
    }

    /// Compile the accumulated query and fetch the first matching row;
    /// `None` when nothing matched.
    pub async fn find(&self, client: &impl Executor) -> OrmResult<Option<Row>> {
        let mut rows = self.find_all(client).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    /// Wrap one fetched record as a [`Row`], every column marked clean.
    fn hydrate(&self, record: Record) -> Row {
        let mut row = self.new_row();
        for (column, value) in record {
            row.hydrate(&column, value);
        }
        row
    }

    fn required_pk(&self) -> OrmResult<&str> {
        self.schema.primary_key().ok_or_else(|| {
            OrmError::validation(format!(
                "table '{}' has no primary key",
                self.schema.name()
            ))
        })
    }
}
