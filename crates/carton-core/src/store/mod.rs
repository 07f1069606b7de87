// # Table Store Implementations
//
// Reference implementations of the TableStore trait.

pub mod file;
pub mod memory;

pub use file::FileTableStore;
pub use memory::MemoryTableStore;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::traits::TableStore;

/// Open the store described by `config`
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn TableStore>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryTableStore::new())),
        StoreConfig::File { path } => Ok(Arc::new(FileTableStore::open(path).await?)),
    }
}
