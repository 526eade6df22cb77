//! Caller-owned schema cache.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::TableSchema;
use crate::error::OrmResult;
use crate::executor::Executor;

/// A name-keyed cache of loaded schemas.
///
/// Owned by the caller's session or request context rather than living as
/// process-global state. The lock is held across the introspection call, so
/// concurrent lookups of the same table perform exactly one
/// read-introspect-insert sequence.
#[derive(Debug, Default)]
pub struct SchemaCache {
    tables: Mutex<HashMap<String, Arc<TableSchema>>>,
}

impl SchemaCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the schema for `table`, introspecting on first use.
    pub async fn schema(
        &self,
        client: &impl Executor,
        table: &str,
    ) -> OrmResult<Arc<TableSchema>> {
        let mut tables = self.tables.lock().await;
        if let Some(schema) = tables.get(table) {
            return Ok(schema.clone());
        }
        let records = client.introspect(table).await?;
        let schema = Arc::new(TableSchema::from_records(table, &records));
        tables.insert(table.to_string(), schema.clone());
        Ok(schema)
    }

    /// Drop a cached schema, e.g. after DDL performed outside this layer.
    pub async fn invalidate(&self, table: &str) {
        self.tables.lock().await.remove(table);
    }

    /// Number of cached schemas.
    pub async fn len(&self) -> usize {
        self.tables.lock().await.len()
    }

    /// Whether the cache holds no schemas.
    pub async fn is_empty(&self) -> bool {
        self.tables.lock().await.is_empty()
    }
}
