//! Fluent query builder and SQL compilation.
//!
//! [`QueryBuilder`] accumulates the shape of one query — target, columns,
//! predicates, grouping, ordering, limit/offset — together with a positional
//! binding list whose insertion order matches the placeholder order the
//! compiler will emit. [`QueryCompiler`] turns that state into SQL text and a
//! flat binding sequence without mutating it.
//!
//! # Usage
//!
//! ```ignore
//! use activerow::qb::{QueryBuilder, QueryCompiler};
//!
//! let query = QueryBuilder::new("users")
//!     .select(["name", "email"])
//!     .where_clause("age", ">", 18)
//!     .or_where_nested(|q| q.where_eq("role", "admin").or_where_eq("role", "owner"))
//!     .order_by("name", "asc")
//!     .limit(20);
//!
//! let sql = QueryCompiler::compile_select(&query);
//! let bindings = QueryCompiler::get_bindings(&query);
//! ```

mod compiler;
mod write;

pub use compiler::QueryCompiler;
pub use write::{WriteStatement, delete_statement, insert_statement, update_statement};

use crate::value::Value;

/// Operators accepted by `where_clause`/`having`, matched case-insensitively.
const OPERATORS: &[&str] = &[
    "=", "<", ">", "<=", ">=", "<>", "!=", "like", "not like", "between", "ilike", "&", "|", "^",
    "<<", ">>", "rlike", "regexp", "not regexp",
];

/// Connector between two predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

/// One predicate in a where or having list.
///
/// `Between` carries no bounds of its own; its two values live in the binding
/// list as a single pair entry, expanded to two placeholders at compile time.
#[derive(Debug, Clone)]
pub enum WhereClause {
    Basic {
        column: String,
        operator: String,
        value: Value,
        boolean: BoolOp,
    },
    Nested {
        query: Box<QueryBuilder>,
        boolean: BoolOp,
    },
    Between {
        column: String,
        not: bool,
        boolean: BoolOp,
    },
}

impl WhereClause {
    pub(crate) fn boolean(&self) -> BoolOp {
        match self {
            WhereClause::Basic { boolean, .. }
            | WhereClause::Nested { boolean, .. }
            | WhereClause::Between { boolean, .. } => *boolean,
        }
    }
}

/// One binding entry.
///
/// `Pair` holds both bounds of a between clause; `Group` holds the bindings a
/// nested sub-query contributed. The compiler flattens these depth-first.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Value(Value),
    Pair(Value, Value),
    Group(Vec<Binding>),
}

/// Per-clause-kind binding lists, each in placeholder emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    pub wheres: Vec<Binding>,
    pub havings: Vec<Binding>,
}

/// One ordering entry.
#[derive(Debug, Clone)]
pub struct OrderClause {
    pub column: String,
    pub direction: &'static str,
}

/// Mutable accumulator for one query's shape.
///
/// Every fluent method consumes and returns the builder, appending to its
/// state without reordering earlier entries.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) from: String,
    pub(crate) columns: Vec<String>,
    pub(crate) wheres: Vec<WhereClause>,
    pub(crate) groups: Vec<String>,
    pub(crate) havings: Vec<WhereClause>,
    pub(crate) orders: Vec<OrderClause>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
    pub(crate) distinct: bool,
    pub(crate) bindings: Bindings,
}

impl QueryBuilder {
    /// Create a builder targeting `table`, selecting every column.
    pub fn new(table: &str) -> Self {
        Self {
            from: table.to_string(),
            columns: vec!["*".to_string()],
            ..Self::default()
        }
    }

    /// The query's target table.
    pub fn table(&self) -> &str {
        &self.from
    }

    // ==================== SELECT columns ====================

    /// Replace the column selection. `*` selects every column.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        if self.columns.is_empty() {
            self.columns.push("*".to_string());
        }
        self
    }

    /// Request `select distinct`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== WHERE ====================

    /// Append a predicate, `and`-joined with what came before.
    ///
    /// The operator is checked case-insensitively against a fixed whitelist.
    /// An operator outside it is reinterpreted as the value with the operator
    /// forced to `=`, and the supplied value argument is discarded — a
    /// permissive fallback, not an error.
    pub fn where_clause(self, column: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.push_where(column, operator, value.into(), BoolOp::And)
    }

    /// `or`-joined version of [`QueryBuilder::where_clause`].
    pub fn or_where_clause(self, column: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.push_where(column, operator, value.into(), BoolOp::Or)
    }

    /// Two-argument form: equality on `column`.
    pub fn where_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_where(column, "=", value.into(), BoolOp::And)
    }

    /// `or`-joined version of [`QueryBuilder::where_eq`].
    pub fn or_where_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_where(column, "=", value.into(), BoolOp::Or)
    }

    /// Expand `(column, value)` pairs into equality predicates, all
    /// `and`-joined.
    pub fn where_map<I, S, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in pairs {
            self = self.push_where(&column.into(), "=", value.into(), BoolOp::And);
        }
        self
    }

    /// Expand `(column, value)` pairs into equality predicates, all
    /// `or`-joined.
    pub fn or_where_map<I, S, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in pairs {
            self = self.push_where(&column.into(), "=", value.into(), BoolOp::Or);
        }
        self
    }

    /// Group the predicates built by `f` into one parenthesized sub-clause.
    ///
    /// The closure receives a fresh builder scoped to the same table. The
    /// group is folded in only if it produced at least one predicate; its
    /// bindings are appended after the bindings already present, keeping
    /// their relative order.
    pub fn where_nested<F>(self, f: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        self.push_nested(f, BoolOp::And)
    }

    /// `or`-joined version of [`QueryBuilder::where_nested`].
    pub fn or_where_nested<F>(self, f: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        self.push_nested(f, BoolOp::Or)
    }

    /// Append `column between low and high`.
    pub fn where_between(self, column: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.push_between(column, low.into(), high.into(), BoolOp::And, false)
    }

    /// Append `column not between low and high`.
    pub fn where_not_between(
        self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.push_between(column, low.into(), high.into(), BoolOp::And, true)
    }

    /// `or`-joined version of [`QueryBuilder::where_between`].
    pub fn or_where_between(
        self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.push_between(column, low.into(), high.into(), BoolOp::Or, false)
    }

    /// `or`-joined version of [`QueryBuilder::where_not_between`].
    pub fn or_where_not_between(
        self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.push_between(column, low.into(), high.into(), BoolOp::Or, true)
    }

    // ==================== GROUP BY / HAVING ====================

    /// Append grouping columns.
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append a having predicate; same operator fallback as
    /// [`QueryBuilder::where_clause`].
    pub fn having(mut self, column: &str, operator: &str, value: impl Into<Value>) -> Self {
        let (operator, value) = normalize_operator(operator, value.into());
        self.bindings.havings.push(Binding::Value(value.clone()));
        self.havings.push(WhereClause::Basic {
            column: column.to_string(),
            operator,
            value,
            boolean: BoolOp::And,
        });
        self
    }

    /// `or`-joined version of [`QueryBuilder::having`].
    pub fn or_having(mut self, column: &str, operator: &str, value: impl Into<Value>) -> Self {
        let (operator, value) = normalize_operator(operator, value.into());
        self.bindings.havings.push(Binding::Value(value.clone()));
        self.havings.push(WhereClause::Basic {
            column: column.to_string(),
            operator,
            value,
            boolean: BoolOp::Or,
        });
        self
    }

    // ==================== ORDER / LIMIT / OFFSET ====================

    /// Append an ordering. Only `asc` (any case) sorts ascending; every other
    /// direction, typos included, becomes `desc`.
    pub fn order_by(mut self, column: &str, direction: &str) -> Self {
        let direction = if direction.eq_ignore_ascii_case("asc") {
            "asc"
        } else {
            "desc"
        };
        self.orders.push(OrderClause {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Cap the number of returned rows; ignored unless positive.
    pub fn limit(mut self, n: i64) -> Self {
        if n > 0 {
            self.limit = Some(n);
        }
        self
    }

    /// Skip rows; negative offsets clamp to zero.
    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n.max(0));
        self
    }

    // ==================== Compilation ====================

    /// The compiled SQL (for debugging).
    pub fn to_sql(&self) -> String {
        QueryCompiler::compile_select(self)
    }

    /// The flattened binding sequence matching [`QueryBuilder::to_sql`].
    pub fn to_bindings(&self) -> Vec<Value> {
        QueryCompiler::get_bindings(self)
    }

    // ==================== Internals ====================

    fn push_where(mut self, column: &str, operator: &str, value: Value, boolean: BoolOp) -> Self {
        let (operator, value) = normalize_operator(operator, value);
        self.bindings.wheres.push(Binding::Value(value.clone()));
        self.wheres.push(WhereClause::Basic {
            column: column.to_string(),
            operator,
            value,
            boolean,
        });
        self
    }

    fn push_nested<F>(mut self, f: F, boolean: BoolOp) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let sub = f(QueryBuilder::new(&self.from));
        if !sub.wheres.is_empty() {
            self.bindings
                .wheres
                .push(Binding::Group(sub.bindings.wheres.clone()));
            self.wheres.push(WhereClause::Nested {
                query: Box::new(sub),
                boolean,
            });
        }
        self
    }

    fn push_between(
        mut self,
        column: &str,
        low: Value,
        high: Value,
        boolean: BoolOp,
        not: bool,
    ) -> Self {
        self.bindings.wheres.push(Binding::Pair(low, high));
        self.wheres.push(WhereClause::Between {
            column: column.to_string(),
            not,
            boolean,
        });
        self
    }
}

/// Apply the permissive operator fallback: an unknown operator becomes the
/// value, compared with `=`.
fn normalize_operator(operator: &str, value: Value) -> (String, Value) {
    if OPERATORS.contains(&operator.to_lowercase().as_str()) {
        (operator.to_string(), value)
    } else {
        ("=".to_string(), Value::Text(operator.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_operator_becomes_the_value() {
        let query = QueryBuilder::new("users").where_clause("status", "active", 99);
        match &query.wheres[0] {
            WhereClause::Basic {
                operator, value, ..
            } => {
                assert_eq!(operator, "=");
                assert_eq!(value, &Value::from("active"));
            }
            other => panic!("unexpected clause {other:?}"),
        }
        // The dangling third argument is discarded.
        assert_eq!(query.to_bindings(), vec![Value::from("active")]);
    }

    #[test]
    fn whitelisted_operator_keeps_its_case() {
        let query = QueryBuilder::new("users").where_clause("name", "LIKE", "a%");
        match &query.wheres[0] {
            WhereClause::Basic { operator, .. } => assert_eq!(operator, "LIKE"),
            other => panic!("unexpected clause {other:?}"),
        }
    }

    #[test]
    fn where_map_expands_to_equalities() {
        let query = QueryBuilder::new("users").where_map([("a", 1), ("b", 2)]);
        assert_eq!(query.wheres.len(), 2);
        assert_eq!(query.to_bindings(), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn empty_nested_group_is_not_folded_in() {
        let query = QueryBuilder::new("users").where_nested(|q| q);
        assert!(query.wheres.is_empty());
        assert!(query.to_bindings().is_empty());
    }

    #[test]
    fn order_direction_normalizes_to_desc() {
        let query = QueryBuilder::new("users")
            .order_by("a", "ASC")
            .order_by("b", "descending")
            .order_by("c", "desc");
        let dirs: Vec<_> = query.orders.iter().map(|o| o.direction).collect();
        assert_eq!(dirs, ["asc", "desc", "desc"]);
    }

    #[test]
    fn non_positive_limit_is_ignored() {
        assert_eq!(QueryBuilder::new("users").limit(0).limit, None);
        assert_eq!(QueryBuilder::new("users").limit(-5).limit, None);
        assert_eq!(QueryBuilder::new("users").limit(10).limit, Some(10));
    }

    #[test]
    fn negative_offset_clamps_to_zero() {
        assert_eq!(QueryBuilder::new("users").offset(-3).offset, Some(0));
        assert_eq!(QueryBuilder::new("users").offset(8).offset, Some(8));
    }

    #[test]
    fn between_pushes_one_pair_binding() {
        let query = QueryBuilder::new("users").where_between("age", 18, 30);
        assert_eq!(query.bindings.wheres.len(), 1);
        assert_eq!(
            query.bindings.wheres[0],
            Binding::Pair(Value::Int(18), Value::Int(30))
        );
    }
}
