use std::fmt;

use badge_core::KeyType;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use zeroize::{Zeroize, Zeroizing};

use crate::encoding::base64url_encode;
use crate::error::CryptoError;
use crate::jwk::{PublicJwk, PublicKeyParams};

/// Modulus size for newly generated RSA keys.
pub const DEFAULT_RSA_BITS: usize = 2048;

/// Private signing key material.
///
/// Ed25519 keys zeroize on drop inside ed25519-dalek; RSA keys zeroize their
/// private components inside the rsa crate. The `Debug` impl never prints
/// key material.
pub enum KeyMaterial {
    /// Ed25519 signing key.
    Ed25519(SigningKey),
    /// RSA private key.
    Rsa(Box<RsaPrivateKey>),
}

impl KeyMaterial {
    /// Generate a new random key of the given type using OS-provided entropy.
    pub fn generate(key_type: KeyType, rsa_bits: usize) -> Result<Self, CryptoError> {
        match key_type {
            KeyType::Ed25519 => Ok(Self::Ed25519(SigningKey::generate(&mut OsRng))),
            KeyType::Rsa => {
                tracing::debug!(bits = rsa_bits, "generating RSA key");
                let key = RsaPrivateKey::new(&mut OsRng, rsa_bits)
                    .map_err(|e| CryptoError::KeyGenerationError(e.to_string()))?;
                Ok(Self::Rsa(Box::new(key)))
            }
        }
    }

    /// Create an Ed25519 key from a 32-byte seed.
    pub fn ed25519_from_seed(seed: &[u8; 32]) -> Self {
        Self::Ed25519(SigningKey::from_bytes(seed))
    }

    /// The key type.
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Ed25519(_) => KeyType::Ed25519,
            Self::Rsa(_) => KeyType::Rsa,
        }
    }

    /// The public half of this key as a JWK.
    ///
    /// Only public components are read here; the result type cannot hold
    /// anything else.
    pub fn public_jwk(&self) -> PublicJwk {
        let params = match self {
            Self::Ed25519(key) => PublicKeyParams::Okp {
                crv: "Ed25519".into(),
                x: base64url_encode(key.verifying_key().as_bytes()),
            },
            Self::Rsa(key) => PublicKeyParams::Rsa {
                n: base64url_encode(key.n().to_bytes_be()),
                e: base64url_encode(key.e().to_bytes_be()),
            },
        };
        PublicJwk::new(params).with_alg(self.key_type().jws_algorithm())
    }

    /// Serialize the private key for server-side storage.
    ///
    /// Ed25519 keys export their 32-byte seed, RSA keys a PKCS#8 DER document.
    pub fn to_secret_bytes(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        match self {
            Self::Ed25519(key) => Ok(Zeroizing::new(key.to_bytes().to_vec())),
            Self::Rsa(key) => {
                let der = key
                    .to_pkcs8_der()
                    .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?;
                Ok(Zeroizing::new(der.as_bytes().to_vec()))
            }
        }
    }

    /// Restore a private key from its storage encoding.
    pub fn from_secret_bytes(key_type: KeyType, bytes: &[u8]) -> Result<Self, CryptoError> {
        match key_type {
            KeyType::Ed25519 => {
                if bytes.len() != 32 {
                    return Err(CryptoError::InvalidKeyLength {
                        expected: 32,
                        actual: bytes.len(),
                    });
                }
                let mut seed = [0u8; 32];
                seed.copy_from_slice(bytes);
                let key = Self::ed25519_from_seed(&seed);
                seed.zeroize();
                Ok(key)
            }
            KeyType::Rsa => {
                let key = RsaPrivateKey::from_pkcs8_der(bytes)
                    .map_err(|e| CryptoError::InvalidKeyEncoding(e.to_string()))?;
                Ok(Self::Rsa(Box::new(key)))
            }
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_type", &self.key_type())
            .finish_non_exhaustive()
    }
}
