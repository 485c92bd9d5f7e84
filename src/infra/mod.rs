pub mod file_store;
pub mod http_client;
pub mod memory_store;
pub mod sqlite_store;

use crate::app::ports::KeyValueStore;
use crate::common::error::Result;
use crate::config::{StorageConfig, StoreBackend};
use std::sync::Arc;
use tracing::info;

pub use file_store::JsonFileStore;
pub use http_client::RestCatalogClient;
pub use memory_store::InMemoryStore;
pub use sqlite_store::SqliteStore;

/// Opens the configured store backend.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.backend {
        StoreBackend::File => Arc::new(JsonFileStore::open(&config.data_dir)?),
        StoreBackend::Sqlite => Arc::new(SqliteStore::open_at_root(&config.data_dir)?),
        StoreBackend::Memory => Arc::new(InMemoryStore::new()),
    };
    info!(
        backend = store.backend_name(),
        data_dir = %config.data_dir.display(),
        "Opened persistent store"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn opens_each_backend() {
        let dir = tempdir().unwrap();
        for (backend, name) in [
            (StoreBackend::File, "json-file"),
            (StoreBackend::Sqlite, "sqlite"),
            (StoreBackend::Memory, "memory"),
        ] {
            let config = StorageConfig {
                backend,
                data_dir: dir.path().to_path_buf(),
            };
            let store = open_store(&config).unwrap();
            assert_eq!(store.backend_name(), name);
            store.set("stats", "{}").unwrap();
            assert_eq!(store.get("stats").unwrap().as_deref(), Some("{}"));
        }
    }
}
