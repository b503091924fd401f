//! Badge Verifier: credential verification and issuance.
//!
//! - Format resolution of JSON-LD and compact JWT credentials
//! - Four-stage check pipeline: temporal, proof, issuer, status
//! - Structured verification results
//! - Data Integrity and JWT issuance with keys from the key store

pub mod collaborators;
pub mod error;
pub mod format;
pub mod issuer;
pub mod jwt;
pub mod options;
pub mod proof;
pub mod result;
pub mod stages;
pub mod verifier;

pub use collaborators::{
    guarded, CollaboratorFailure, RevocationRegistry, StatusCheck, StatusChecker,
    DEFAULT_COLLABORATOR_TIMEOUT, REVOCATION_LIST_ENTRY,
};
pub use error::{StructuralError, VerifierError};
pub use format::{partial_identity, resolve, CredentialInput, PartialIdentity};
pub use issuer::CredentialIssuer;
pub use options::{VerificationOptions, VerificationRequest};
pub use result::{
    CheckCategory, CheckResult, Checks, ResultFormatter, ResultMetadata, VerificationResult,
    VerificationStatus,
};
pub use stages::Stage;
pub use verifier::CredentialVerifier;
