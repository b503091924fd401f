use badge_core::CoreError;
use badge_crypto::CryptoError;
use badge_keys::KeyStoreError;

/// A credential that cannot enter the check pipeline.
///
/// The display strings are the `error` member of a rejected verification
/// result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralError {
    #[error("Invalid JWT format")]
    InvalidJwtFormat,

    #[error("Invalid JWT format: {0}")]
    UndecodableJwt(String),

    #[error("Credential must be a JSON object or a compact JWT string")]
    NotAnObject,

    #[error("Credential is missing required @context")]
    MissingContext,

    #[error("Credential @context must include {v1} or {v2}", v1 = badge_core::VC_CONTEXT_V1, v2 = badge_core::VC_CONTEXT_V2)]
    UnrecognizedContext,

    #[error("Credential is missing required issuer")]
    MissingIssuer,

    #[error("Credential issuer must be an IRI or an object with an id")]
    InvalidIssuer,

    #[error("Credential type must include VerifiableCredential")]
    MissingVerifiableCredentialType,

    #[error("Credential has an invalid {field}: {value}")]
    InvalidTimestamp { field: String, value: String },

    #[error("Invalid verification options: {0}")]
    InvalidOptions(String),

    #[error("{}", join(.0))]
    Multiple(Vec<StructuralError>),
}

fn join(errors: &[StructuralError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from credential issuance and request parsing.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    #[error("invalid credential: {0}")]
    InvalidCredential(#[from] StructuralError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("key store error: {0}")]
    KeyStore(#[from] KeyStoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("collaborator error: {0}")]
    Collaborator(String),
}
