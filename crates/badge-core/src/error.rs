/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("unknown key type: {0}")]
    UnknownKeyType(String),

    #[error("unknown key status: {0}")]
    UnknownKeyStatus(String),

    #[error("invalid timestamp in {field}: {value}")]
    InvalidTimestamp { field: String, value: String },

    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] serde_json::Error),
}
