use std::sync::Arc;

use badge_core::{KeyStatus, KeyType};
use badge_crypto::{base64url_decode, base64url_encode, sign, KeyMaterial, PublicJwk};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::KeyStoreError;

/// A signing key owned by the key store.
///
/// The private half is reachable only through [`KeyRecord::sign`] and the
/// storage encoding; `KeyRecord` itself does not implement `Serialize`.
#[derive(Debug, Clone)]
pub struct KeyRecord {
    pub id: String,
    pub key_type: KeyType,
    pub status: KeyStatus,
    pub created_at: DateTime<Utc>,
    public_jwk: PublicJwk,
    material: Arc<KeyMaterial>,
}

impl KeyRecord {
    /// Wrap freshly generated key material as an Active record.
    pub fn new(id: impl Into<String>, material: KeyMaterial) -> Self {
        let id = id.into();
        let public_jwk = material.public_jwk().with_kid(id.clone());
        Self {
            id,
            key_type: material.key_type(),
            status: KeyStatus::Active,
            created_at: Utc::now(),
            public_jwk,
            material: Arc::new(material),
        }
    }

    /// The public JWK, with `kid` set to the record id.
    pub fn public_jwk(&self) -> &PublicJwk {
        &self.public_jwk
    }

    /// Whether the key is Active.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// A copy of this record with a different status. Key material is shared.
    pub fn with_status(&self, status: KeyStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Sign a message with this key.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        sign(message, &self.material)
    }

    /// Public view of this record for API responses.
    pub fn summary(&self) -> KeySummary {
        KeySummary {
            id: self.id.clone(),
            key_type: self.key_type,
            status: self.status,
            created_at: self.created_at,
            public_jwk: self.public_jwk.clone(),
        }
    }

    /// Encode this record for a storage backend.
    pub fn to_stored(&self) -> Result<StoredKey, KeyStoreError> {
        let secret = self.material.to_secret_bytes()?;
        Ok(StoredKey {
            id: self.id.clone(),
            key_type: self.key_type,
            status: self.status,
            created_at: self.created_at,
            secret: base64url_encode(secret.as_slice()),
        })
    }

    /// Decode a record loaded from a storage backend.
    pub fn from_stored(stored: &StoredKey) -> Result<Self, KeyStoreError> {
        let mut secret = base64url_decode(&stored.secret)?;
        let material = KeyMaterial::from_secret_bytes(stored.key_type, &secret);
        secret.zeroize();
        let material = material?;
        Ok(Self {
            id: stored.id.clone(),
            key_type: stored.key_type,
            status: stored.status,
            created_at: stored.created_at,
            public_jwk: material.public_jwk().with_kid(stored.id.clone()),
            material: Arc::new(material),
        })
    }
}

/// Public summary of a key record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySummary {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub status: KeyStatus,
    pub created_at: DateTime<Utc>,
    pub public_jwk: PublicJwk,
}

/// Storage encoding of a key record. Private material is base64url-encoded
/// and wiped when the value is dropped.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredKey {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub status: KeyStatus,
    pub created_at: DateTime<Utc>,
    pub secret: String,
}

impl Drop for StoredKey {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl std::fmt::Debug for StoredKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredKey")
            .field("id", &self.id)
            .field("key_type", &self.key_type)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_active() {
        let record = KeyRecord::new("k1", KeyMaterial::ed25519_from_seed(&[1u8; 32]));
        assert_eq!(record.status, KeyStatus::Active);
        assert_eq!(record.key_type, KeyType::Ed25519);
        assert_eq!(record.public_jwk().kid.as_deref(), Some("k1"));
    }

    #[test]
    fn test_with_status_keeps_key() {
        let record = KeyRecord::new("k1", KeyMaterial::ed25519_from_seed(&[1u8; 32]));
        let inactive = record.with_status(KeyStatus::Inactive);
        assert!(!inactive.is_active());
        assert_eq!(inactive.public_jwk(), record.public_jwk());
        assert_eq!(inactive.created_at, record.created_at);
    }

    #[test]
    fn test_stored_roundtrip() {
        let record = KeyRecord::new("k1", KeyMaterial::ed25519_from_seed(&[2u8; 32]))
            .with_status(KeyStatus::Inactive);
        let stored = record.to_stored().unwrap();
        let restored = KeyRecord::from_stored(&stored).unwrap();
        assert_eq!(restored.id, "k1");
        assert_eq!(restored.status, KeyStatus::Inactive);
        assert_eq!(restored.public_jwk(), record.public_jwk());
    }

    #[test]
    fn test_summary_has_no_private_members() {
        let record = KeyRecord::new("k1", KeyMaterial::generate(KeyType::Rsa, 1024).unwrap());
        let value = serde_json::to_value(record.summary()).unwrap();
        assert_eq!(value["type"], "RSA");
        assert_eq!(value["status"], "active");
        let jwk = value["publicJwk"].as_object().unwrap();
        for field in ["d", "p", "q", "dp", "dq", "qi"] {
            assert!(!jwk.contains_key(field));
        }
    }

    #[test]
    fn test_stored_key_debug_hides_secret() {
        let record = KeyRecord::new("k1", KeyMaterial::ed25519_from_seed(&[3u8; 32]));
        let stored = record.to_stored().unwrap();
        let debug = format!("{:?}", stored);
        assert!(!debug.contains(&stored.secret));
    }

    #[test]
    fn test_sign_verifies_against_public_jwk() {
        let record = KeyRecord::new("k1", KeyMaterial::ed25519_from_seed(&[4u8; 32]));
        let sig = record.sign(b"payload");
        assert!(badge_crypto::verify(b"payload", &sig, record.public_jwk()).is_ok());
    }
}
