//! Table schemas built from runtime introspection.

mod cache;
mod field;

pub use cache::SchemaCache;
pub use field::{
    FieldDescriptor, SQL_AUTO_INCREMENT, SQL_NOT_NULL_VALUE, SQL_NULL_VALUE, SQL_PRIMARY_KEY,
};

use serde::{Deserialize, Serialize};

use crate::executor::Record;

/// The described shape of one table: its columns in introspection order and
/// the designated primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    primary_key: Option<String>,
    fields: Vec<FieldDescriptor>,
}

impl TableSchema {
    /// Build a schema from introspection records.
    ///
    /// When more than one column is marked `PRI`, the first one becomes the
    /// primary key and the rest stay ordinary columns — composite keys are
    /// unsupported throughout the row layer.
    pub fn from_records(name: &str, records: &[Record]) -> Self {
        let mut primary_key = None;
        let mut fields = Vec::with_capacity(records.len());
        for record in records {
            let field = FieldDescriptor::from_record(record, name);
            if field.is_primary_key && primary_key.is_none() {
                primary_key = Some(field.name.clone());
            }
            fields.push(field);
        }
        Self {
            name: name.to_string(),
            primary_key,
            fields,
        }
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The designated primary key column, when the schema declares one.
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// All column descriptors, in introspection order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up one column's descriptor.
    pub fn field(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == column)
    }

    /// Whether the schema describes `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.fields.iter().any(|f| f.name == column)
    }

    /// Column names, in introspection order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
