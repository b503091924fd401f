//! Shared state handed to every API handler.

use std::sync::Arc;
use std::time::Instant;

use badge_keys::{
    CompositeIssuerResolver, FileKeyStorage, KeyStorage, KeyStore, KeyStoreSettings,
    LocalIssuerResolver, MemoryKeyStorage, TrustedIssuerRegistry,
};
use badge_verifier::{CredentialIssuer, CredentialVerifier, RevocationRegistry};

use crate::config::{BadgeConfig, StorageBackend};
use crate::storage::RocksKeyStorage;

pub struct AppState {
    pub keys: Arc<KeyStore>,
    pub verifier: CredentialVerifier,
    pub issuer: CredentialIssuer,
    pub revocations: Arc<RevocationRegistry>,
    pub trusted_issuers: Arc<TrustedIssuerRegistry>,
    pub start_time: Instant,
}

impl AppState {
    /// Open key storage, load the key store and wire the pipeline.
    pub async fn from_config(config: &BadgeConfig) -> anyhow::Result<Self> {
        let storage: Arc<dyn KeyStorage> = match config.storage.backend {
            StorageBackend::Rocksdb => Arc::new(RocksKeyStorage::open(
                &config.storage.data_dir.join("keys.db"),
            )?),
            StorageBackend::File => Arc::new(FileKeyStorage::new(&config.storage.data_dir)),
            StorageBackend::Memory => Arc::new(MemoryKeyStorage::new()),
        };
        let settings = KeyStoreSettings {
            initial_key_type: config.keys.initial_key_type,
            initial_key_id: config.keys.initial_key_id.clone(),
            rsa_bits: config.keys.rsa_bits,
        };
        let keys = Arc::new(KeyStore::with_settings(&config.keys.did_host, storage, settings));
        keys.initialize().await?;

        Ok(Self::new(
            keys,
            TrustedIssuerRegistry::from_issuers(config.verification.trusted_issuers.iter().cloned()),
            config.verification.collaborator_timeout(),
        ))
    }

    /// Wire the pipeline around an already initialized key store.
    pub fn new(
        keys: Arc<KeyStore>,
        trusted_issuers: TrustedIssuerRegistry,
        collaborator_timeout: std::time::Duration,
    ) -> Self {
        let trusted_issuers = Arc::new(trusted_issuers);
        let revocations = Arc::new(RevocationRegistry::new());

        let mut resolver = CompositeIssuerResolver::new();
        resolver.add_resolver(Arc::new(LocalIssuerResolver::for_store(keys.clone())));
        resolver.add_resolver(trusted_issuers.clone());

        let verifier = CredentialVerifier::new(keys.clone())
            .with_issuer_resolver(Arc::new(resolver))
            .with_status_checker(revocations.clone())
            .with_collaborator_timeout(collaborator_timeout);

        Self {
            issuer: CredentialIssuer::new(keys.clone())
                .with_revocation_list(format!("{}/revocations", keys.did())),
            keys,
            verifier,
            revocations,
            trusted_issuers,
            start_time: Instant::now(),
        }
    }
}
