// # Table Store Trait
//
// Defines the keyed table access the component layer relies on.
//
// ## Purpose
//
// Component rows live in a wide-column table keyed by `id`. This layer only
// issues point lookups and partial-field updates: no scans, no secondary
// indexes. Connection handling, retries and backoff belong to the
// implementation, never to callers.
//
// ## Implementations
//
// - In-memory: `MemoryTableStore` (tests, single-process use)
// - File-based: `FileTableStore` (JSON file with atomic writes)
//
// ## Usage
//
// ```rust,ignore
// use carton_core::traits::TableStore;
//
// let row = store.fetch_row("components", "COM0001").await?;
//
// let mut fields = carton_core::traits::Row::new();
// fields.insert("state".into(), "bootstrapped".into());
// store.update_row("components", "COM0001", fields).await?;
// ```

use async_trait::async_trait;

/// A stored row: column name to JSON value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Trait for keyed table store implementations
///
/// Implementations must be safe to call concurrently from multiple tasks.
///
/// # Semantics
///
/// - `fetch_row` returns `Error::NotFound` when no row has the key
/// - `update_row` merges the given columns into an existing row and returns
///   `Error::NotFound` when the row does not exist
/// - `delete_row` succeeds when the row is already absent
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Fetch a single row by primary key
    async fn fetch_row(&self, table: &str, key: &str) -> Result<Row, crate::Error>;

    /// Insert or replace a full row
    async fn insert_row(&self, table: &str, key: &str, row: Row) -> Result<(), crate::Error>;

    /// Overwrite the given columns of an existing row
    async fn update_row(&self, table: &str, key: &str, fields: Row) -> Result<(), crate::Error>;

    /// Delete a row by primary key
    async fn delete_row(&self, table: &str, key: &str) -> Result<(), crate::Error>;

    /// Store name (for logging)
    fn store_name(&self) -> &'static str;
}
