//! Key lifecycle store.
//!
//! Readers take a snapshot of the key index (`Arc<BTreeMap>`) and never
//! block writers for longer than a pointer swap. Writers serialize on an
//! async mutex, build the next index off to the side, persist it, and only
//! then publish it, so a reader sees either the old or the new key set.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use badge_core::{types::split_fragment, Did, KeyStatus, KeyType};
use badge_crypto::{JwkSet, KeyMaterial, PublicJwk, DEFAULT_RSA_BITS};
use tokio::sync::Mutex;

use crate::document::{DidDocument, DidDocumentResponse, JwkSetResponse, WellKnownResponse};
use crate::error::KeyStoreError;
use crate::record::{KeyRecord, KeySummary, StoredKey};
use crate::storage::KeyStorage;

type KeyIndex = BTreeMap<String, Arc<KeyRecord>>;

/// Parameters for keys the store creates on its own.
#[derive(Debug, Clone)]
pub struct KeyStoreSettings {
    /// Type of the key created when `initialize` finds an empty store.
    pub initial_key_type: KeyType,
    /// Id of that key.
    pub initial_key_id: String,
    /// RSA modulus size.
    pub rsa_bits: usize,
}

impl Default for KeyStoreSettings {
    fn default() -> Self {
        Self {
            initial_key_type: KeyType::Ed25519,
            initial_key_id: "default".to_string(),
            rsa_bits: DEFAULT_RSA_BITS,
        }
    }
}

/// Owns the issuer's signing keys and publishes their public halves.
pub struct KeyStore {
    did: Did,
    storage: Arc<dyn KeyStorage>,
    settings: KeyStoreSettings,
    keys: RwLock<Arc<KeyIndex>>,
    writer: Mutex<()>,
    loaded: AtomicBool,
    initialized: AtomicBool,
    closed: AtomicBool,
}

impl KeyStore {
    /// Create a store for `did:web:<host>` backed by `storage`.
    pub fn new(host: &str, storage: Arc<dyn KeyStorage>) -> Self {
        Self::with_settings(host, storage, KeyStoreSettings::default())
    }

    pub fn with_settings(
        host: &str,
        storage: Arc<dyn KeyStorage>,
        settings: KeyStoreSettings,
    ) -> Self {
        Self {
            did: Did::web(host),
            storage,
            settings,
            keys: RwLock::new(Arc::new(KeyIndex::new())),
            writer: Mutex::new(()),
            loaded: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// The store's `did:web` identifier.
    pub fn did(&self) -> &Did {
        &self.did
    }

    /// Load persisted keys, creating the initial key if none exist.
    ///
    /// Calling this again after it succeeded does nothing.
    pub async fn initialize(&self) -> Result<(), KeyStoreError> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        let _guard = self.writer.lock().await;
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        self.ensure_open()?;
        self.ensure_loaded().await?;

        let current = self.snapshot();
        if current.is_empty() {
            let id = self.settings.initial_key_id.clone();
            let record = self.create_record(&id, self.settings.initial_key_type).await?;
            let mut next = (*current).clone();
            next.insert(id.clone(), Arc::new(record));
            self.commit(next).await?;
            tracing::info!(key_id = %id, key_type = %self.settings.initial_key_type, "initial signing key created");
        }

        self.initialized.store(true, Ordering::Release);
        tracing::info!(did = %self.did, keys = self.snapshot().len(), "key store initialized");
        Ok(())
    }

    /// Load persisted keys without creating the initial key.
    ///
    /// Reads (`get_jwk_set`, `resolve_verification_method`, `signing_key`)
    /// only see keys once the store is loaded, either here, by
    /// `initialize`, or by a mutation.
    pub async fn load(&self) -> Result<(), KeyStoreError> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }
        let _guard = self.writer.lock().await;
        self.ensure_loaded().await
    }

    /// Persist the current key set and refuse further mutations.
    pub async fn close(&self) -> Result<(), KeyStoreError> {
        let _guard = self.writer.lock().await;
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if self.loaded.load(Ordering::Acquire) {
            let stored = to_stored(&self.snapshot())?;
            self.storage.persist(&stored).await?;
        }
        tracing::info!(did = %self.did, "key store closed");
        Ok(())
    }

    /// Generate and store a new Active key.
    pub async fn generate_key_pair(
        &self,
        id: &str,
        key_type: KeyType,
    ) -> Result<Arc<KeyRecord>, KeyStoreError> {
        if id.is_empty() || id.contains('#') {
            return Err(KeyStoreError::InvalidKeyId(id.to_string()));
        }
        let _guard = self.writer.lock().await;
        self.ensure_open()?;
        self.ensure_loaded().await?;

        let current = self.snapshot();
        if current.contains_key(id) {
            return Err(KeyStoreError::DuplicateKey(id.to_string()));
        }
        let record = Arc::new(self.create_record(id, key_type).await?);
        let mut next = (*current).clone();
        next.insert(id.to_string(), record.clone());
        self.commit(next).await?;

        tracing::info!(key_id = %id, key_type = %key_type, "key generated");
        Ok(record)
    }

    /// Change a key's status.
    pub async fn set_key_status(
        &self,
        id: &str,
        status: KeyStatus,
    ) -> Result<Arc<KeyRecord>, KeyStoreError> {
        let _guard = self.writer.lock().await;
        self.ensure_open()?;
        self.ensure_loaded().await?;

        let current = self.snapshot();
        let existing = current
            .get(id)
            .ok_or_else(|| KeyStoreError::KeyNotFound(id.to_string()))?;
        if existing.status == status {
            return Ok(existing.clone());
        }
        let record = Arc::new(existing.with_status(status));
        let mut next = (*current).clone();
        next.insert(id.to_string(), record.clone());
        self.commit(next).await?;

        tracing::info!(key_id = %id, status = %status, "key status changed");
        Ok(record)
    }

    /// Public JWKs of every Active key.
    pub fn get_jwk_set(&self) -> JwkSet {
        JwkSet {
            keys: self
                .snapshot()
                .values()
                .filter(|r| r.is_active())
                .map(|r| r.public_jwk().clone())
                .collect(),
        }
    }

    /// The DID document for the current key set.
    pub fn did_document(&self) -> DidDocument {
        DidDocument::from_jwk_set(&self.did, &self.get_jwk_set())
    }

    /// The DID document as a well-known response, initializing the store
    /// first if needed.
    pub async fn get_did_document(&self) -> DidDocumentResponse {
        match self.initialize().await {
            Ok(()) => WellKnownResponse::ok(self.did_document()),
            Err(e) => {
                tracing::error!(did = %self.did, error = %e, "failed to build DID document");
                WellKnownResponse::internal_error(e.to_string())
            }
        }
    }

    /// The JWK Set as a well-known response.
    pub async fn jwks_response(&self) -> JwkSetResponse {
        match self.initialize().await {
            Ok(()) => WellKnownResponse::ok(self.get_jwk_set()),
            Err(e) => {
                tracing::error!(did = %self.did, error = %e, "failed to build JWK set");
                WellKnownResponse::internal_error(e.to_string())
            }
        }
    }

    /// Resolve `did:web:<host>#<kid>` or a bare `<kid>` to an Active key's JWK.
    pub fn resolve_verification_method(
        &self,
        verification_method: &str,
    ) -> Result<PublicJwk, KeyStoreError> {
        let key_id = if verification_method.starts_with("did:") {
            let did = Did::parse(verification_method)?;
            if did != self.did {
                return Err(KeyStoreError::ForeignDid {
                    expected: self.did.to_string(),
                    actual: did.to_string(),
                });
            }
            split_fragment(verification_method)
                .1
                .ok_or_else(|| KeyStoreError::KeyNotFound(verification_method.to_string()))?
        } else {
            verification_method
        };

        let snapshot = self.snapshot();
        let record = snapshot
            .get(key_id)
            .ok_or_else(|| KeyStoreError::KeyNotFound(key_id.to_string()))?;
        if !record.is_active() {
            return Err(KeyStoreError::KeyInactive(key_id.to_string()));
        }
        Ok(record.public_jwk().clone())
    }

    /// The key to sign with: `key_id` if given, otherwise the most recently
    /// created Active key.
    pub fn signing_key(&self, key_id: Option<&str>) -> Result<Arc<KeyRecord>, KeyStoreError> {
        let snapshot = self.snapshot();
        match key_id {
            Some(id) => {
                let record = snapshot
                    .get(id)
                    .ok_or_else(|| KeyStoreError::KeyNotFound(id.to_string()))?;
                if !record.is_active() {
                    return Err(KeyStoreError::KeyInactive(id.to_string()));
                }
                Ok(record.clone())
            }
            None => snapshot
                .values()
                .filter(|r| r.is_active())
                .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
                .cloned()
                .ok_or(KeyStoreError::NoActiveKey),
        }
    }

    /// Public summaries of every key, Active or not.
    pub fn list_keys(&self) -> Vec<KeySummary> {
        self.snapshot().values().map(|r| r.summary()).collect()
    }

    /// Whether any key is Active.
    pub fn has_active_key(&self) -> bool {
        self.snapshot().values().any(|r| r.is_active())
    }

    fn snapshot(&self) -> Arc<KeyIndex> {
        self.keys
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn publish(&self, next: KeyIndex) {
        *self
            .keys
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(next);
    }

    fn ensure_open(&self) -> Result<(), KeyStoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(KeyStoreError::Closed);
        }
        Ok(())
    }

    /// Must be called with the writer lock held.
    async fn ensure_loaded(&self) -> Result<(), KeyStoreError> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }
        let stored = self.storage.load().await?;
        let mut index = KeyIndex::new();
        for key in &stored {
            let record = KeyRecord::from_stored(key)?;
            index.insert(record.id.clone(), Arc::new(record));
        }
        tracing::debug!(count = index.len(), "keys loaded from storage");
        self.publish(index);
        self.loaded.store(true, Ordering::Release);
        Ok(())
    }

    /// Persist `next`, then make it visible. Must be called with the writer
    /// lock held.
    async fn commit(&self, next: KeyIndex) -> Result<(), KeyStoreError> {
        let stored = to_stored(&next)?;
        self.storage.persist(&stored).await?;
        self.publish(next);
        Ok(())
    }

    async fn create_record(&self, id: &str, key_type: KeyType) -> Result<KeyRecord, KeyStoreError> {
        let rsa_bits = self.settings.rsa_bits;
        let material = tokio::task::spawn_blocking(move || KeyMaterial::generate(key_type, rsa_bits))
            .await
            .map_err(|e| KeyStoreError::Internal(format!("key generation task failed: {}", e)))??;
        Ok(KeyRecord::new(id, material))
    }
}

fn to_stored(index: &KeyIndex) -> Result<Vec<StoredKey>, KeyStoreError> {
    index.values().map(|r| r.to_stored()).collect()
}
