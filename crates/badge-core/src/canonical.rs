//! Canonical JSON bytes (RFC 8785, JSON Canonicalization Scheme).
//!
//! Every signature in this workspace is computed over `CanonicalBytes`.
//! The inner buffer is private, so the only way to obtain signing input is
//! through [`CanonicalBytes::new`].

use serde::Serialize;

use crate::error::CoreError;

/// Bytes produced by JCS serialization: sorted object keys, no insignificant
/// whitespace, ECMAScript number formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    pub fn new(value: &impl Serialize) -> Result<Self, CoreError> {
        let bytes = serde_jcs::to_vec(value)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
