//! Active-record rows with dirty tracking.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::config::OrmConfig;
use crate::error::{OrmError, OrmResult};
use crate::executor::Executor;
use crate::qb::{delete_statement, insert_statement, update_statement};
use crate::schema::TableSchema;
use crate::validate;
use crate::value::{FieldValue, Value};

/// One record of a table.
///
/// A row hydrated from a fetch starts with every column clean; values written
/// through [`Row::set`] are tracked as dirty, so [`Row::save`] touches only
/// what actually changed since the load.
#[derive(Debug, Clone)]
pub struct Row {
    schema: Arc<TableSchema>,
    fields: BTreeMap<String, FieldValue>,
    dirty: BTreeSet<String>,
    config: OrmConfig,
}

impl Row {
    /// Create an empty row for `schema`.
    pub fn new(schema: Arc<TableSchema>) -> Self {
        Self {
            schema,
            fields: BTreeMap::new(),
            dirty: BTreeSet::new(),
            config: OrmConfig::default(),
        }
    }

    /// Replace the row's configuration.
    pub fn config(mut self, config: OrmConfig) -> Self {
        self.config = config;
        self
    }

    /// The owning table's name.
    pub fn table(&self) -> &str {
        self.schema.name()
    }

    /// Set a column value and mark it dirty.
    ///
    /// Writes to columns the schema does not describe are silently dropped.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        if self.schema.has_column(column) {
            self.fields
                .insert(column.to_string(), FieldValue::Bound(value.into()));
            self.dirty.insert(column.to_string());
        }
    }

    /// Set a column to a raw SQL fragment, e.g. `CURRENT_TIMESTAMP`.
    ///
    /// The fragment is spliced into the statement text at compile time and
    /// never travels as a binding.
    pub fn set_raw(&mut self, column: &str, sql: &str) {
        if self.schema.has_column(column) {
            self.fields
                .insert(column.to_string(), FieldValue::Raw(sql.to_string()));
            self.dirty.insert(column.to_string());
        }
    }

    /// Write a fetched value without marking it dirty.
    pub(crate) fn hydrate(&mut self, column: &str, value: Value) {
        if self.schema.has_column(column) {
            self.fields
                .insert(column.to_string(), FieldValue::Bound(value));
            self.dirty.remove(column);
        }
    }

    /// Read a bound column value. Raw fragments and unset columns read as
    /// `None`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        match self.fields.get(column) {
            Some(FieldValue::Bound(value)) => Some(value),
            _ => None,
        }
    }

    /// The bound values as a plain map (raw fragments excluded).
    pub fn values(&self) -> BTreeMap<String, Value> {
        self.fields
            .iter()
            .filter_map(|(column, value)| match value {
                FieldValue::Bound(v) => Some((column.clone(), v.clone())),
                FieldValue::Raw(_) => None,
            })
            .collect()
    }

    /// Columns changed since the row was loaded.
    pub fn dirty_columns(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Whether any column changed since the row was loaded.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Persist changed columns with a minimal UPDATE.
    ///
    /// A clean row is a successful no-op — no statement reaches the executor.
    /// The primary key identifies the record and never appears in SET, so a
    /// row whose only dirty column is its key is also a no-op.
    pub async fn save(&mut self, client: &impl Executor) -> OrmResult<()> {
        if self.config.validate_fields {
            self.validate()?;
        }
        let (pk, key_value) = self.required_pk()?;
        let dirty: Vec<(&str, &FieldValue)> = self
            .fields
            .iter()
            .filter(|(column, _)| self.dirty.contains(*column) && column.as_str() != pk)
            .map(|(column, value)| (column.as_str(), value))
            .collect();
        if dirty.is_empty() {
            return Ok(());
        }
        let stmt = update_statement(self.schema.name(), dirty, pk, key_value);
        debug!(sql = %stmt.sql, "save");
        client.execute(&stmt.sql, &stmt.params).await?;
        self.dirty.clear();
        Ok(())
    }

    /// Insert the row and write any generated key back as a clean field.
    ///
    /// Returns the driver-generated id when the engine produced one. After a
    /// successful insert the row is clean: an immediate [`Row::save`] issues
    /// no SQL.
    pub async fn add(&mut self, client: &impl Executor) -> OrmResult<Option<i64>> {
        if self.config.validate_fields {
            self.validate()?;
        }
        if self.fields.is_empty() {
            return Err(OrmError::validation(format!(
                "cannot insert into '{}': no fields set",
                self.schema.name()
            )));
        }
        let fields: Vec<(&str, &FieldValue)> = self
            .fields
            .iter()
            .map(|(column, value)| (column.as_str(), value))
            .collect();
        let stmt = insert_statement(self.schema.name(), fields);
        debug!(sql = %stmt.sql, "add");
        let outcome = client.execute(&stmt.sql, &stmt.params).await?;
        if let Some(id) = outcome.last_insert_id {
            if let Some(pk) = self.schema.primary_key().map(str::to_string) {
                self.hydrate(&pk, Value::Int(id));
            }
        }
        self.dirty.clear();
        Ok(outcome.last_insert_id)
    }

    /// Delete the record keyed by the current primary-key value.
    ///
    /// Zero affected rows reports `NotFound`; success clears the row's state.
    pub async fn delete(&mut self, client: &impl Executor) -> OrmResult<()> {
        let (pk, key_value) = self.required_pk()?;
        let stmt = delete_statement(self.schema.name(), pk, key_value);
        debug!(sql = %stmt.sql, "delete");
        let outcome = client.execute(&stmt.sql, &stmt.params).await?;
        if outcome.affected_rows == 0 {
            return Err(OrmError::not_found(format!(
                "no row of '{}' matched the primary key",
                self.schema.name()
            )));
        }
        self.fields.clear();
        self.dirty.clear();
        Ok(())
    }

    /// Validate every currently-set bound value against the schema.
    ///
    /// Raw fragments are SQL text by declaration and are not validated.
    fn validate(&self) -> OrmResult<()> {
        for (column, value) in &self.fields {
            let FieldValue::Bound(value) = value else {
                continue;
            };
            if let Some(field) = self.schema.field(column) {
                validate::validate_field_with_mode(field, value, self.config.twelve_hour_time)?;
            }
        }
        Ok(())
    }

    /// The primary-key column and its current, non-empty value.
    fn required_pk(&self) -> OrmResult<(&str, &Value)> {
        let pk = self.schema.primary_key().ok_or_else(|| {
            OrmError::validation(format!(
                "table '{}' has no primary key",
                self.schema.name()
            ))
        })?;
        match self.fields.get(pk) {
            Some(FieldValue::Bound(value)) if !value.is_empty() => Ok((pk, value)),
            _ => Err(OrmError::MissingPrimaryKey {
                table: self.schema.name().to_string(),
                column: pk.to_string(),
            }),
        }
    }
}
