// # Memory Table Store
//
// In-memory implementation of TableStore.
//
// ## Purpose
//
// Holds rows in a map per table. Nothing survives a restart. Used by tests,
// by the daemon when no store path is configured, and as the reference for
// the TableStore semantics (update of a missing row is NotFound, delete of
// a missing row succeeds).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::table_store::{Row, TableStore};

/// In-memory table store
///
/// # Example
///
/// ```rust,no_run
/// use carton_core::store::MemoryTableStore;
/// use carton_core::traits::{Row, TableStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryTableStore::new();
///
///     let mut row = Row::new();
///     row.insert("id".into(), "COM0001".into());
///     store.insert_row("components", "COM0001", row).await?;
///
///     let fetched = store.fetch_row("components", "COM0001").await?;
///     assert_eq!(fetched["id"], "COM0001");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    inner: Arc<RwLock<HashMap<String, HashMap<String, Row>>>>,
}

impl MemoryTableStore {
    /// Create a new empty memory table store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in `table`
    pub async fn len(&self, table: &str) -> usize {
        self.inner.read().await.get(table).map_or(0, HashMap::len)
    }

    /// True if `table` has no rows
    pub async fn is_empty(&self, table: &str) -> bool {
        self.len(table).await == 0
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn fetch_row(&self, table: &str, key: &str) -> Result<Row, Error> {
        let guard = self.inner.read().await;
        guard
            .get(table)
            .and_then(|rows| rows.get(key))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{}/{}", table, key)))
    }

    async fn insert_row(&self, table: &str, key: &str, row: Row) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), row);
        Ok(())
    }

    async fn update_row(&self, table: &str, key: &str, fields: Row) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let row = guard
            .get_mut(table)
            .and_then(|rows| rows.get_mut(key))
            .ok_or_else(|| Error::not_found(format!("{}/{}", table, key)))?;
        row.extend(fields);
        Ok(())
    }

    async fn delete_row(&self, table: &str, key: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        if let Some(rows) = guard.get_mut(table) {
            rows.remove(key);
        }
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, status: &str) -> Row {
        let mut r = Row::new();
        r.insert("id".into(), id.into());
        r.insert("status".into(), status.into());
        r
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryTableStore::new();
        assert!(store.is_empty("components").await);

        store.insert_row("components", "c1", row("c1", "launching")).await.unwrap();
        assert_eq!(store.len("components").await, 1);

        let fetched = store.fetch_row("components", "c1").await.unwrap();
        assert_eq!(fetched["status"], "launching");

        store.delete_row("components", "c1").await.unwrap();
        assert!(store.is_empty("components").await);
    }

    #[tokio::test]
    async fn test_memory_store_update_merges() {
        let store = MemoryTableStore::new();
        store.insert_row("components", "c1", row("c1", "launching")).await.unwrap();

        let mut fields = Row::new();
        fields.insert("state".into(), "bootstrapped".into());
        store.update_row("components", "c1", fields).await.unwrap();

        let fetched = store.fetch_row("components", "c1").await.unwrap();
        assert_eq!(fetched["status"], "launching");
        assert_eq!(fetched["state"], "bootstrapped");
    }

    #[tokio::test]
    async fn test_memory_store_missing_rows() {
        let store = MemoryTableStore::new();

        let err = store.fetch_row("components", "nope").await.unwrap_err();
        assert!(err.is_not_found());

        let err = store.update_row("components", "nope", Row::new()).await.unwrap_err();
        assert!(err.is_not_found());

        assert!(store.delete_row("components", "nope").await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_store_tables_are_separate() {
        let store = MemoryTableStore::new();
        store.insert_row("components", "x", row("x", "a")).await.unwrap();
        assert!(store.fetch_row("assemblies", "x").await.unwrap_err().is_not_found());
    }
}
