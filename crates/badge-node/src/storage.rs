//! RocksDB key storage backend for the badge node.

use async_trait::async_trait;
use badge_keys::{KeyStorage, KeyStoreError, StoredKey};
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

/// Column family holding one serialized key per key id.
const CF_KEYS: &str = "keys";

/// RocksDB-backed key persistence.
pub struct RocksKeyStorage {
    db: DB,
}

impl RocksKeyStorage {
    /// Open or create a RocksDB database at the given path.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(CF_KEYS, Options::default())];
        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        tracing::debug!(path = %path.display(), "opened key database");

        Ok(Self { db })
    }

    fn keys_cf(&self) -> Result<&rocksdb::ColumnFamily, KeyStoreError> {
        self.db
            .cf_handle(CF_KEYS)
            .ok_or_else(|| KeyStoreError::Storage(format!("column family '{}' not found", CF_KEYS)))
    }
}

fn storage_error(e: rocksdb::Error) -> KeyStoreError {
    KeyStoreError::Storage(e.to_string())
}

#[async_trait]
impl KeyStorage for RocksKeyStorage {
    async fn load(&self) -> Result<Vec<StoredKey>, KeyStoreError> {
        let cf = self.keys_cf()?;
        let mut keys = Vec::new();
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = entry.map_err(storage_error)?;
            keys.push(serde_json::from_slice(&value)?);
        }
        Ok(keys)
    }

    async fn persist(&self, keys: &[StoredKey]) -> Result<(), KeyStoreError> {
        let cf = self.keys_cf()?;
        let mut batch = WriteBatch::default();
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (id, _) = entry.map_err(storage_error)?;
            if !keys.iter().any(|k| k.id.as_bytes() == &*id) {
                batch.delete_cf(cf, id);
            }
        }
        for key in keys {
            batch.put_cf(cf, key.id.as_bytes(), serde_json::to_vec(key)?);
        }
        self.db.write(batch).map_err(storage_error)
    }
}
