//! SQL synthesis from built query state.

use super::{Binding, QueryBuilder, WhereClause};
use crate::value::Value;

/// Compiles a [`QueryBuilder`]'s accumulated state into SQL text and a flat
/// binding sequence.
///
/// Compilation is a pure read: the same builder can be compiled any number of
/// times. Components are rendered in a fixed order and empty ones are omitted
/// entirely, so no empty clause ever reaches the SQL.
pub struct QueryCompiler;

impl QueryCompiler {
    /// Render the full select statement.
    pub fn compile_select(query: &QueryBuilder) -> String {
        let segments = [
            Self::compile_columns(query),
            Self::compile_from(query),
            Self::compile_wheres(query),
            Self::compile_groups(query),
            Self::compile_havings(query),
            Self::compile_orders(query),
            Self::compile_limit(query),
            Self::compile_offset(query),
        ];
        segments
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Flatten the builder's binding structure depth-first, in the exact
    /// left-to-right order the placeholders appear in the compiled SQL.
    ///
    /// This ordering equivalence is the compiler's central invariant: the
    /// output length always equals the number of `?` placeholders in
    /// [`QueryCompiler::compile_select`]'s result.
    pub fn get_bindings(query: &QueryBuilder) -> Vec<Value> {
        let mut out = Vec::new();
        flatten(&query.bindings.wheres, &mut out);
        flatten(&query.bindings.havings, &mut out);
        out
    }

    fn compile_columns(query: &QueryBuilder) -> String {
        let select = if query.distinct {
            "select distinct "
        } else {
            "select "
        };
        let columns = if query.columns.is_empty() {
            "*".to_string()
        } else {
            query.columns.join(", ")
        };
        format!("{select}{columns}")
    }

    fn compile_from(query: &QueryBuilder) -> String {
        format!("from {}", query.from)
    }

    fn compile_wheres(query: &QueryBuilder) -> String {
        if query.wheres.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = query
            .wheres
            .iter()
            .map(|clause| {
                format!(
                    "{} {}",
                    clause.boolean().keyword(),
                    Self::compile_where(clause)
                )
            })
            .collect();
        format!("where {}", strip_leading_boolean(&rendered.join(" ")))
    }

    fn compile_where(clause: &WhereClause) -> String {
        match clause {
            WhereClause::Basic {
                column, operator, ..
            } => format!("{column} {operator} ?"),
            WhereClause::Between { column, not, .. } => {
                let keyword = if *not { "not between" } else { "between" };
                format!("{column} {keyword} ? and ?")
            }
            WhereClause::Nested { query, .. } => {
                let inner = Self::compile_wheres(query);
                let body = inner.strip_prefix("where ").unwrap_or(&inner);
                format!("({body})")
            }
        }
    }

    fn compile_groups(query: &QueryBuilder) -> String {
        if query.groups.is_empty() {
            return String::new();
        }
        format!("group by {}", query.groups.join(", "))
    }

    fn compile_havings(query: &QueryBuilder) -> String {
        if query.havings.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = query
            .havings
            .iter()
            .map(|clause| match clause {
                WhereClause::Basic {
                    column,
                    operator,
                    boolean,
                    ..
                } => format!("{} {column} {operator} ?", boolean.keyword()),
                // having lists only ever hold basic predicates
                other => format!("{} {}", other.boolean().keyword(), Self::compile_where(other)),
            })
            .collect();
        format!("having {}", strip_leading_boolean(&rendered.join(" ")))
    }

    fn compile_orders(query: &QueryBuilder) -> String {
        if query.orders.is_empty() {
            return String::new();
        }
        let orders: Vec<String> = query
            .orders
            .iter()
            .map(|order| format!("{} {}", order.column, order.direction))
            .collect();
        format!("order by {}", orders.join(", "))
    }

    fn compile_limit(query: &QueryBuilder) -> String {
        match query.limit {
            Some(n) => format!("limit {n}"),
            None => String::new(),
        }
    }

    fn compile_offset(query: &QueryBuilder) -> String {
        match query.offset {
            Some(n) => format!("offset {n}"),
            None => String::new(),
        }
    }
}

fn flatten(bindings: &[Binding], out: &mut Vec<Value>) {
    for binding in bindings {
        match binding {
            Binding::Value(value) => out.push(value.clone()),
            Binding::Pair(low, high) => {
                out.push(low.clone());
                out.push(high.clone());
            }
            Binding::Group(inner) => flatten(inner, out),
        }
    }
}

/// Drop the first boolean connector; the first predicate has none before it.
fn strip_leading_boolean(sql: &str) -> String {
    sql.strip_prefix("and ")
        .or_else(|| sql.strip_prefix("or "))
        .unwrap_or(sql)
        .to_string()
}
