//! Key persistence backends.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::KeyStoreError;
use crate::record::StoredKey;

/// Name of the document written by [`FileKeyStorage`].
pub const KEYS_FILE: &str = "keys.json";

/// Persistence collaborator for the key store.
///
/// `persist` receives the complete key set and replaces whatever was stored
/// before.
#[async_trait]
pub trait KeyStorage: Send + Sync {
    /// Load every persisted key.
    async fn load(&self) -> Result<Vec<StoredKey>, KeyStoreError>;

    /// Replace the persisted key set.
    async fn persist(&self, keys: &[StoredKey]) -> Result<(), KeyStoreError>;
}

/// Keeps keys in memory only.
#[derive(Default)]
pub struct MemoryKeyStorage {
    keys: Mutex<Vec<StoredKey>>,
}

impl MemoryKeyStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStorage for MemoryKeyStorage {
    async fn load(&self) -> Result<Vec<StoredKey>, KeyStoreError> {
        Ok(self.keys.lock().await.clone())
    }

    async fn persist(&self, keys: &[StoredKey]) -> Result<(), KeyStoreError> {
        *self.keys.lock().await = keys.to_vec();
        Ok(())
    }
}

/// Stores keys as one JSON document inside a directory.
pub struct FileKeyStorage {
    path: PathBuf,
}

impl FileKeyStorage {
    /// Use `<dir>/keys.json`. The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(KEYS_FILE),
        }
    }

    /// Path of the key document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyStorage for FileKeyStorage {
    async fn load(&self) -> Result<Vec<StoredKey>, KeyStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, keys: &[StoredKey]) -> Result<(), KeyStoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(keys)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), count = keys.len(), "keys persisted");
        Ok(())
    }
}
