/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key generation failed: {0}")]
    KeyGenerationError(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("signing failed: {0}")]
    SigningError(String),

    #[error("unsupported key: {0}")]
    UnsupportedKey(String),

    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
