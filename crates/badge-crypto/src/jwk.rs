//! Public JSON Web Keys.
//!
//! [`PublicKeyParams`] has one variant per key family and each variant holds
//! only that family's public members. There is no representation for `d`,
//! `p`, `q`, `dp`, `dq` or `qi`; deserializing a private JWK into these types
//! drops them.

use badge_core::KeyType;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Algorithm-specific public key members, tagged by `kty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum PublicKeyParams {
    /// Octet key pair (RFC 8037).
    #[serde(rename = "OKP")]
    Okp { crv: String, x: String },
    /// RSA public key (RFC 7518 §6.3.1).
    #[serde(rename = "RSA")]
    Rsa { n: String, e: String },
}

/// A public JWK with optional metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicJwk {
    #[serde(flatten)]
    pub params: PublicKeyParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
}

impl PublicJwk {
    /// Create a bare public JWK.
    pub fn new(params: PublicKeyParams) -> Self {
        Self {
            params,
            kid: None,
            alg: None,
            key_use: None,
        }
    }

    /// Set the key id.
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Set the intended JWS algorithm and mark the key for signatures.
    pub fn with_alg(mut self, alg: impl Into<String>) -> Self {
        self.alg = Some(alg.into());
        self.key_use = Some("sig".into());
        self
    }

    /// The key type these parameters describe.
    pub fn key_type(&self) -> Result<KeyType, CryptoError> {
        match &self.params {
            PublicKeyParams::Okp { crv, .. } if crv == "Ed25519" => Ok(KeyType::Ed25519),
            PublicKeyParams::Okp { crv, .. } => {
                Err(CryptoError::UnsupportedKey(format!("unsupported OKP curve: {}", crv)))
            }
            PublicKeyParams::Rsa { .. } => Ok(KeyType::Rsa),
        }
    }
}

/// A JWK Set document (RFC 7517 §5).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<PublicJwk>,
}

impl JwkSet {
    /// Find a key by `kid`.
    pub fn find(&self, kid: &str) -> Option<&PublicJwk> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
