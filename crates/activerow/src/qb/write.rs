//! Named-parameter write statements for the row layer.
//!
//! Write statements use `:column` placeholders, each name bound exactly once
//! per statement. Raw field values are spliced into the SQL text and never
//! reach the parameter list.

use crate::value::{FieldValue, Value};

/// A compiled write statement: SQL text plus named parameters in
/// first-appearance order, so positional executors can bind sequentially.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteStatement {
    pub sql: String,
    pub params: Vec<(String, Value)>,
}

/// Build `INSERT INTO t (a, b) VALUES (:a, :b)` over the given fields.
pub fn insert_statement<'a, I>(table: &str, fields: I) -> WriteStatement
where
    I: IntoIterator<Item = (&'a str, &'a FieldValue)>,
{
    let mut columns = Vec::new();
    let mut values = Vec::new();
    let mut params = Vec::new();
    for (column, value) in fields {
        columns.push(column.to_string());
        match value {
            FieldValue::Bound(v) => {
                values.push(format!(":{column}"));
                params.push((column.to_string(), v.clone()));
            }
            FieldValue::Raw(fragment) => values.push(fragment.clone()),
        }
    }
    WriteStatement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            values.join(", ")
        ),
        params,
    }
}

/// Build `UPDATE t SET a = :a, ... WHERE pk = :pk` over the given fields.
///
/// The caller keeps the key column out of `fields`; it appears only in the
/// where clause, so its name is bound once.
pub fn update_statement<'a, I>(
    table: &str,
    fields: I,
    primary_key: &str,
    key_value: &Value,
) -> WriteStatement
where
    I: IntoIterator<Item = (&'a str, &'a FieldValue)>,
{
    let mut sets = Vec::new();
    let mut params = Vec::new();
    for (column, value) in fields {
        match value {
            FieldValue::Bound(v) => {
                sets.push(format!("{column} = :{column}"));
                params.push((column.to_string(), v.clone()));
            }
            FieldValue::Raw(fragment) => sets.push(format!("{column} = {fragment}")),
        }
    }
    params.push((primary_key.to_string(), key_value.clone()));
    WriteStatement {
        sql: format!(
            "UPDATE {} SET {} WHERE {} = :{}",
            table,
            sets.join(", "),
            primary_key,
            primary_key
        ),
        params,
    }
}

/// Build `DELETE FROM t WHERE pk = :pk`.
pub fn delete_statement(table: &str, primary_key: &str, key_value: &Value) -> WriteStatement {
    WriteStatement {
        sql: format!("DELETE FROM {table} WHERE {primary_key} = :{primary_key}"),
        params: vec![(primary_key.to_string(), key_value.clone())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_renders_named_placeholders() {
        let name = FieldValue::Bound(Value::from("alice"));
        let age = FieldValue::Bound(Value::Int(30));
        let stmt = insert_statement("users", [("name", &name), ("age", &age)]);
        assert_eq!(stmt.sql, "INSERT INTO users (name, age) VALUES (:name, :age)");
        assert_eq!(
            stmt.params,
            vec![
                ("name".to_string(), Value::from("alice")),
                ("age".to_string(), Value::Int(30)),
            ]
        );
    }

    #[test]
    fn raw_values_are_inlined_not_bound() {
        let name = FieldValue::Bound(Value::from("alice"));
        let created = FieldValue::Raw("NOW()".to_string());
        let stmt = insert_statement("users", [("name", &name), ("created_at", &created)]);
        assert_eq!(
            stmt.sql,
            "INSERT INTO users (name, created_at) VALUES (:name, NOW())"
        );
        assert_eq!(stmt.params, vec![("name".to_string(), Value::from("alice"))]);
    }

    #[test]
    fn update_binds_the_key_last() {
        let name = FieldValue::Bound(Value::from("bob"));
        let stmt = update_statement("users", [("name", &name)], "id", &Value::Int(7));
        assert_eq!(stmt.sql, "UPDATE users SET name = :name WHERE id = :id");
        assert_eq!(
            stmt.params,
            vec![
                ("name".to_string(), Value::from("bob")),
                ("id".to_string(), Value::Int(7)),
            ]
        );
    }

    #[test]
    fn update_inlines_raw_fragments() {
        let touched = FieldValue::Raw("CURRENT_TIMESTAMP".to_string());
        let stmt = update_statement("users", [("touched_at", &touched)], "id", &Value::Int(1));
        assert_eq!(
            stmt.sql,
            "UPDATE users SET touched_at = CURRENT_TIMESTAMP WHERE id = :id"
        );
        assert_eq!(stmt.params, vec![("id".to_string(), Value::Int(1))]);
    }

    #[test]
    fn delete_targets_the_key() {
        let stmt = delete_statement("users", "id", &Value::Int(3));
        assert_eq!(stmt.sql, "DELETE FROM users WHERE id = :id");
        assert_eq!(stmt.params, vec![("id".to_string(), Value::Int(3))]);
    }
}
