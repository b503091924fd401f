//! Byte encodings used on the wire: unpadded base64url (JOSE) and
//! base58btc multibase (Data Integrity `proofValue`).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::CryptoError;

/// Multibase prefix for base58btc.
const BASE58BTC_PREFIX: char = 'z';

/// Encode bytes as unpadded base64url.
pub fn base64url_encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url. Padding and standard-alphabet characters are rejected.
pub fn base64url_decode(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| CryptoError::InvalidInput(format!("invalid base64url: {}", e)))
}

/// Encode bytes as a base58btc multibase string (`z...`).
pub fn multibase_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("{}{}", BASE58BTC_PREFIX, bs58::encode(bytes).into_string())
}

/// Decode a base58btc multibase string.
pub fn multibase_decode(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    let body = encoded.strip_prefix(BASE58BTC_PREFIX).ok_or_else(|| {
        CryptoError::InvalidInput("multibase value must use the base58btc 'z' prefix".into())
    })?;
    bs58::decode(body)
        .into_vec()
        .map_err(|e| CryptoError::InvalidInput(format!("invalid base58: {}", e)))
}
