//! Badge Crypto: key material, public JWKs, hashing, and signatures.
//!
//! Private key material lives only inside [`KeyMaterial`]. The JWK types in
//! [`jwk`] model public parameters exclusively, so nothing built from them
//! can carry private fields.

pub mod encoding;
pub mod error;
pub mod hashing;
pub mod jwk;
pub mod keys;
pub mod signing;

pub use encoding::{base64url_decode, base64url_encode, multibase_decode, multibase_encode};
pub use error::CryptoError;
pub use hashing::{sha256, Hash};
pub use jwk::{JwkSet, PublicJwk, PublicKeyParams};
pub use keys::{KeyMaterial, DEFAULT_RSA_BITS};
pub use signing::{sign, verify};
