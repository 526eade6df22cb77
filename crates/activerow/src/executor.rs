//! Execution-layer boundary.

use std::collections::BTreeMap;

use crate::error::OrmResult;
use crate::value::Value;

/// One result row: column name to driver scalar.
///
/// Introspection results use the same shape, with the keys `Field`, `Type`,
/// `Null`, `Key`, `Default` and `Extra`.
pub type Record = BTreeMap<String, Value>;

/// Outcome of an INSERT/UPDATE/DELETE statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Rows touched by the statement.
    pub affected_rows: u64,
    /// The key generated for the inserted row, when the engine produced one.
    pub last_insert_id: Option<i64>,
}

/// The execution collaborator: runs the statements this layer compiles.
///
/// Implementations own connections, wire formats, timeouts and retries; this
/// layer only hands them finished SQL plus bindings. [`Executor::query`]
/// takes positional `?` bindings whose order matches the placeholder order
/// exactly; [`Executor::execute`] takes named `:column` parameters, each name
/// bound exactly once per statement.
pub trait Executor: Send + Sync {
    /// Describe a table: one record per column.
    fn introspect(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Record>>> + Send;

    /// Run a SELECT-style statement with positional bindings.
    fn query(
        &self,
        sql: &str,
        bindings: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Record>>> + Send;

    /// Run a write statement with named parameters.
    fn execute(
        &self,
        sql: &str,
        params: &[(String, Value)],
    ) -> impl std::future::Future<Output = OrmResult<WriteOutcome>> + Send;
}

impl<E: Executor> Executor for &E {
    fn introspect(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Record>>> + Send {
        (*self).introspect(table)
    }

    fn query(
        &self,
        sql: &str,
        bindings: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Record>>> + Send {
        (*self).query(sql, bindings)
    }

    fn execute(
        &self,
        sql: &str,
        params: &[(String, Value)],
    ) -> impl std::future::Future<Output = OrmResult<WriteOutcome>> + Send {
        (*self).execute(sql, params)
    }
}
