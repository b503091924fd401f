//! Badge Core: Fundamental types, errors, and constants shared by the
//! Open Badges key store, verifier, and node.

pub mod canonical;
pub mod credential;
pub mod error;
pub mod types;

pub use canonical::CanonicalBytes;
pub use credential::{
    parse_timestamp, ContextEntry, Credential, CredentialFormat, Issuer, JwtEnvelope, Proof,
    VC_CONTEXT_V1, VC_CONTEXT_V2, VERIFIABLE_CREDENTIAL,
};
pub use error::CoreError;
pub use types::{Did, KeyStatus, KeyType};
