//! Badge Keys: the issuer's key lifecycle store.
//!
//! - Ed25519 and RSA key records with reversible Active/Inactive status
//! - Pluggable persistence (memory, JSON file)
//! - Public-only JWK Set and `did:web` DID document export
//! - Issuer resolution (local DID, trusted registry, composite)

pub mod document;
pub mod error;
pub mod record;
pub mod resolver;
pub mod storage;
pub mod store;

pub use document::{
    DidDocument, DidDocumentResponse, JwkSetResponse, VerificationMethod, WellKnownBody,
    WellKnownResponse,
};
pub use error::KeyStoreError;
pub use record::{KeyRecord, KeySummary, StoredKey};
pub use resolver::{
    CompositeIssuerResolver, DidResolver, IssuerResolver, LocalDidResolver, LocalIssuerResolver,
    TrustedIssuerRegistry,
};
pub use storage::{FileKeyStorage, KeyStorage, MemoryKeyStorage};
pub use store::{KeyStore, KeyStoreSettings};
