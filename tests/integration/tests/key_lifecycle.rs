//! Integration test: key store lifecycle across restarts and the public
//! views it exports.

use std::sync::Arc;

use badge_core::{KeyStatus, KeyType};
use badge_integration_tests::{store_on, HOST};
use badge_keys::{FileKeyStorage, KeyStoreError, LocalDidResolver, DidResolver, MemoryKeyStorage};
use proptest::prelude::*;

#[tokio::test]
async fn test_file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = store_on(Arc::new(FileKeyStorage::new(dir.path())));
    first.initialize().await.unwrap();
    first.generate_key_pair("rsa-2025", KeyType::Rsa).await.unwrap();
    first.set_key_status("default", KeyStatus::Inactive).await.unwrap();
    let published = first.get_jwk_set();
    first.close().await.unwrap();
    assert!(matches!(
        first.generate_key_pair("late", KeyType::Ed25519).await,
        Err(KeyStoreError::Closed)
    ));

    let second = store_on(Arc::new(FileKeyStorage::new(dir.path())));
    second.initialize().await.unwrap();
    assert_eq!(second.list_keys().len(), 2);
    assert_eq!(second.get_jwk_set(), published);

    let raw = std::fs::read_to_string(dir.path().join("keys.json")).unwrap();
    assert!(raw.contains("rsa-2025"));
}

#[tokio::test]
async fn test_did_resolver_matches_well_known_document() {
    let store = store_on(Arc::new(MemoryKeyStorage::new()));
    store.initialize().await.unwrap();
    store.generate_key_pair("second", KeyType::Ed25519).await.unwrap();

    let resolver = LocalDidResolver::new(store.clone());
    let resolved = resolver.resolve(&format!("did:web:{}", HOST)).await.unwrap();
    assert_eq!(resolved, store.did_document());
    assert_eq!(resolved.assertion_method.len(), 2);
    assert!(resolver.resolve("did:web:elsewhere.org").await.is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Published JWKs carry only public members, and exactly the Active keys.
    #[test]
    fn published_keys_are_public_and_active(statuses in prop::collection::vec(any::<bool>(), 1..5)) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        runtime.block_on(async {
            let store = store_on(Arc::new(MemoryKeyStorage::new()));
            for (i, active) in statuses.iter().enumerate() {
                let id = format!("k{}", i);
                store.generate_key_pair(&id, KeyType::Ed25519).await.unwrap();
                if !active {
                    store.set_key_status(&id, KeyStatus::Inactive).await.unwrap();
                }
            }

            let jwks = serde_json::to_value(store.get_jwk_set()).unwrap();
            let keys = jwks["keys"].as_array().unwrap();
            assert_eq!(keys.len(), statuses.iter().filter(|a| **a).count());
            for key in keys {
                for private in ["d", "p", "q", "dp", "dq", "qi"] {
                    assert!(key.get(private).is_none(), "{} leaked", private);
                }
            }
            assert_eq!(
                store.did_document().verification_method.len(),
                keys.len()
            );
        });
    }
}
