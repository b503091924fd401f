//! Fixtures shared by the integration tests.

use std::sync::Arc;

use badge_keys::{KeyStorage, KeyStore, KeyStoreSettings, MemoryKeyStorage};
use serde_json::{json, Value};

pub const HOST: &str = "example.com";
pub const ISSUER: &str = "did:web:example.com";

/// Settings with a small RSA modulus so RSA key generation stays fast.
pub fn fast_settings() -> KeyStoreSettings {
    KeyStoreSettings {
        rsa_bits: 1024,
        ..KeyStoreSettings::default()
    }
}

/// An uninitialized in-memory key store for `did:web:example.com`.
pub fn memory_store() -> Arc<KeyStore> {
    store_on(Arc::new(MemoryKeyStorage::new()))
}

pub fn store_on(storage: Arc<dyn KeyStorage>) -> Arc<KeyStore> {
    Arc::new(KeyStore::with_settings(HOST, storage, fast_settings()))
}

/// An in-memory key store holding its default Ed25519 key.
pub async fn initialized_store() -> Arc<KeyStore> {
    let store = memory_store();
    store
        .initialize()
        .await
        .unwrap_or_else(|e| panic!("key store failed to initialize: {}", e));
    store
}

/// An unsigned VC 1.1 credential with no proof.
pub fn unsigned_v1() -> Value {
    json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": ["VerifiableCredential"],
        "issuer": ISSUER,
        "issuanceDate": "2024-01-01T00:00:00Z"
    })
}

/// An Open Badges 3.0 achievement credential body, ready for issuance.
pub fn open_badge() -> Value {
    json!({
        "@context": [
            "https://www.w3.org/ns/credentials/v2",
            "https://purl.imsglobal.org/spec/ob/v3p0/context-3.0.3.json"
        ],
        "type": ["VerifiableCredential", "OpenBadgeCredential"],
        "name": "Rust Fundamentals",
        "credentialSubject": {
            "id": "did:example:learner",
            "type": ["AchievementSubject"],
            "achievement": {
                "id": "https://example.com/achievements/rust-101",
                "type": ["Achievement"],
                "name": "Rust Fundamentals",
                "criteria": {"narrative": "Completed the Rust course."}
            }
        }
    })
}
