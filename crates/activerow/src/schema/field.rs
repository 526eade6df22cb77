//! Column metadata parsed from schema introspection.

use serde::{Deserialize, Serialize};

use crate::executor::Record;
use crate::value::Value;

/// `Key` marker for the primary key column.
pub const SQL_PRIMARY_KEY: &str = "PRI";
/// `Null` marker for nullable columns.
pub const SQL_NULL_VALUE: &str = "YES";
/// `Null` marker for non-nullable columns.
pub const SQL_NOT_NULL_VALUE: &str = "NO";
/// `Extra` marker for engine-generated keys.
pub const SQL_AUTO_INCREMENT: &str = "auto_increment";

const DEFAULT_TYPE: &str = "varchar";

/// Immutable metadata for one table column, built once per column when a
/// table loads its schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Column name.
    pub name: String,
    /// Type name with any parenthesized size stripped (`varchar`, `int`, ...).
    pub base_type: String,
    /// Declared size, when the type string carried a plain integer one.
    pub length: Option<u32>,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether introspection marked this column `PRI`.
    pub is_primary_key: bool,
    /// Extra attribute (e.g. `auto_increment`).
    pub extra: String,
    /// Declared default, when one exists.
    pub default_value: Option<String>,
    /// Owning table name.
    pub table: String,
}

impl FieldDescriptor {
    /// Parse one introspection record.
    ///
    /// Recognized keys are `Field`, `Type`, `Null`, `Key`, `Default` and
    /// `Extra`; anything else in the record is ignored. A `Null` value other
    /// than the two markers leaves the nullability default untouched.
    pub fn from_record(record: &Record, table: &str) -> Self {
        let mut field = Self {
            name: String::new(),
            base_type: DEFAULT_TYPE.to_string(),
            length: None,
            nullable: false,
            is_primary_key: false,
            extra: String::new(),
            default_value: None,
            table: table.to_string(),
        };
        for (key, value) in record {
            match key.as_str() {
                "Field" => field.name = text(value),
                "Type" => {
                    let raw = text(value);
                    match raw.split_once('(') {
                        Some((base, rest)) => {
                            field.base_type = base.to_string();
                            field.length = rest.strip_suffix(')').and_then(|len| len.parse().ok());
                        }
                        None => field.base_type = raw,
                    }
                }
                "Null" => match text(value).as_str() {
                    SQL_NULL_VALUE => field.nullable = true,
                    SQL_NOT_NULL_VALUE => field.nullable = false,
                    _ => {}
                },
                "Key" => field.is_primary_key = text(value) == SQL_PRIMARY_KEY,
                "Default" => {
                    field.default_value = match value {
                        Value::Null => None,
                        other => Some(text(other)),
                    }
                }
                "Extra" => field.extra = text(value),
                _ => {}
            }
        }
        field
    }

    /// Whether the storage engine fills this column itself.
    pub fn is_auto_generated(&self) -> bool {
        self.extra == SQL_AUTO_INCREMENT
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Null => String::new(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
    }
}
