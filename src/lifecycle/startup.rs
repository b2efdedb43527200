//! Startup helpers.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The repository is opened before the listener is bound

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::store::{MemoryStore, StoreError};

/// Open the repository described by `config`.
pub fn open_store(config: &StorageConfig) -> Result<Arc<MemoryStore>, StoreError> {
    let store = match &config.snapshot_path {
        Some(path) => MemoryStore::load_from_file(PathBuf::from(path))?,
        None => {
            tracing::info!("No snapshot path configured, running in memory only");
            MemoryStore::default()
        }
    };
    Ok(Arc::new(store))
}
