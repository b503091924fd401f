/// Key lifecycle store errors.
#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("duplicate key id: {0}")]
    DuplicateKey(String),

    #[error("invalid key id: {0:?}")]
    InvalidKeyId(String),

    #[error("key is inactive: {0}")]
    KeyInactive(String),

    #[error("no active signing key")]
    NoActiveKey,

    #[error("verification method belongs to {actual}, not {expected}")]
    ForeignDid { expected: String, actual: String },

    #[error("key store is closed")]
    Closed,

    #[error("key storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] badge_crypto::CryptoError),

    #[error("core error: {0}")]
    Core(#[from] badge_core::CoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for KeyStoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for KeyStoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
