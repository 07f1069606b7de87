// # File Table Store
//
// File-based implementation of TableStore with crash recovery.
//
// ## Purpose
//
// Keeps component rows across restarts of a single-node deployment without
// an external database.
//
// ## Crash Recovery
//
// - Atomic writes: write to `.tmp`, then rename over the store file
// - Backup: the previous file is copied to `.backup` before every rename
// - Recovery: a store file that fails to parse is replaced by its backup
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "tables": {
//     "components": {
//       "COM0001": { "id": "COM0001", "inputs": ["{\"key\":..}"], "status": "running" }
//     }
//   }
// }
// ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::table_store::{Row, TableStore};

/// Store file format version
const STORE_FILE_VERSION: &str = "1.0";

type Tables = HashMap<String, HashMap<String, Row>>;

/// File-backed table store
///
/// Every mutation is written through to disk before it returns.
#[derive(Debug, Clone)]
pub struct FileTableStore {
    path: PathBuf,
    tables: Arc<RwLock<Tables>>,
}

/// Serializable store file format
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StoreFileFormat {
    version: String,
    tables: Tables,
}

impl FileTableStore {
    /// Create or load a file table store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Load the existing store file, if any
    /// 3. If the file is corrupted, load the backup instead
    /// 4. If both fail to parse, start empty
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let tables = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            tables: Arc::new(RwLock::new(tables)),
        })
    }

    async fn load_with_recovery(path: &Path) -> Result<Tables, Error> {
        match Self::load(path).await {
            Ok(tables) => {
                tracing::debug!("Loaded table store from {}", path.display());
                Ok(tables)
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Store file {} appears corrupted: {}. Attempting recovery from backup.",
                    path.display(),
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty store.");
                    return Ok(Tables::new());
                }

                match Self::load(&backup_path).await {
                    Ok(tables) => {
                        tracing::info!("Recovered table store from backup");
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "Failed to restore store file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(tables)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also unreadable: {}. Starting with empty store.",
                            backup_err
                        );
                        Ok(Tables::new())
                    }
                }
            }
            Err(other) => Err(other),
        }
    }

    async fn load(path: &Path) -> Result<Tables, Error> {
        if !path.exists() {
            tracing::debug!("Store file does not exist: {}", path.display());
            return Ok(Tables::new());
        }

        let content = fs::read_to_string(path).await?;
        let file: StoreFileFormat = serde_json::from_str(&content)?;

        if file.version != STORE_FILE_VERSION {
            tracing::warn!(
                "Store file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STORE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.tables)
    }

    /// Write the given snapshot atomically
    async fn write(&self, tables: &Tables) -> Result<(), Error> {
        let file = StoreFileFormat {
            version: STORE_FILE_VERSION.to_string(),
            tables: tables.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp_path = self.temp_path();
        {
            let mut f = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            f.write_all(json.as_bytes()).await?;
            f.flush().await?;
        }

        if self.path.exists()
            && let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await
        {
            tracing::warn!("Failed to create backup: {}", e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Table store written to {}", self.path.display());
        Ok(())
    }

    /// Write `next` to disk, then make it the live snapshot
    ///
    /// On a failed write the live tables are left untouched, so readers
    /// never see a change that is not on disk.
    async fn commit(&self, live: &mut Tables, next: Tables) -> Result<(), Error> {
        self.write(&next).await?;
        *live = next;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl TableStore for FileTableStore {
    async fn fetch_row(&self, table: &str, key: &str) -> Result<Row, Error> {
        let guard = self.tables.read().await;
        guard
            .get(table)
            .and_then(|rows| rows.get(key))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{}/{}", table, key)))
    }

    async fn insert_row(&self, table: &str, key: &str, row: Row) -> Result<(), Error> {
        let mut guard = self.tables.write().await;
        let mut next = guard.clone();
        next.entry(table.to_string())
            .or_default()
            .insert(key.to_string(), row);
        self.commit(&mut guard, next).await
    }

    async fn update_row(&self, table: &str, key: &str, fields: Row) -> Result<(), Error> {
        let mut guard = self.tables.write().await;
        let mut next = guard.clone();
        let row = next
            .get_mut(table)
            .and_then(|rows| rows.get_mut(key))
            .ok_or_else(|| Error::not_found(format!("{}/{}", table, key)))?;
        row.extend(fields);
        self.commit(&mut guard, next).await
    }

    async fn delete_row(&self, table: &str, key: &str) -> Result<(), Error> {
        let mut guard = self.tables.write().await;
        let present = guard
            .get(table)
            .is_some_and(|rows| rows.contains_key(key));
        if !present {
            return Ok(());
        }

        let mut next = guard.clone();
        if let Some(rows) = next.get_mut(table) {
            rows.remove(key);
        }
        self.commit(&mut guard, next).await
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}
