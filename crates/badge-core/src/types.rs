use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Decentralized Identifier.
/// Format: `did:<method>:<method-specific-id>`
///
/// Only `did:web` identifiers are resolved locally; other methods parse but
/// never resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Did(String);

impl Did {
    /// Parse a DID URI, discarding any fragment.
    pub fn parse(uri: &str) -> Result<Self, CoreError> {
        let (did, _) = split_fragment(uri);
        let parts: Vec<&str> = did.splitn(3, ':').collect();
        if parts.len() < 3 || parts[0] != "did" || parts[1].is_empty() || parts[2].is_empty() {
            return Err(CoreError::InvalidDid(format!(
                "DID must have format 'did:<method>:<identifier>', got: {}",
                uri
            )));
        }
        Ok(Self(did.to_string()))
    }

    /// Build the `did:web` identifier for a host.
    ///
    /// A port separator is percent-encoded (`localhost:3000` becomes
    /// `did:web:localhost%3A3000`).
    pub fn web(host: &str) -> Self {
        Self(format!("did:web:{}", host.replace(':', "%3A")))
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// Extract the method (web, key, jwk, ...).
    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    /// Extract the method-specific identifier.
    pub fn identifier(&self) -> &str {
        self.0.splitn(3, ':').nth(2).unwrap_or_default()
    }

    /// Whether this is a `did:web` identifier.
    pub fn is_web(&self) -> bool {
        self.method() == "web"
    }

    /// The decoded host of a `did:web` identifier (`%3A` restored to `:`).
    pub fn web_host(&self) -> Option<String> {
        if !self.is_web() {
            return None;
        }
        let domain = self.identifier().split(':').next().unwrap_or_default();
        Some(domain.replace("%3A", ":").replace("%3a", ":"))
    }

    /// A DID URL pointing at a fragment of this DID's document.
    pub fn with_fragment(&self, fragment: &str) -> String {
        format!("{}#{}", self.0, fragment)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split a DID URL into the DID and its optional fragment.
pub fn split_fragment(did_url: &str) -> (&str, Option<&str>) {
    match did_url.split_once('#') {
        Some((did, fragment)) => (did, Some(fragment)),
        None => (did_url, None),
    }
}

/// Signing key algorithms supported by the key store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// RSA (PKCS#1 v1.5 with SHA-256).
    #[serde(rename = "RSA")]
    Rsa,
    /// Ed25519 (EdDSA).
    Ed25519,
}

impl KeyType {
    /// The JOSE `alg` value for signatures made with this key type.
    pub fn jws_algorithm(&self) -> &'static str {
        match self {
            Self::Rsa => "RS256",
            Self::Ed25519 => "EdDSA",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => write!(f, "RSA"),
            Self::Ed25519 => write!(f, "Ed25519"),
        }
    }
}

impl FromStr for KeyType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa" => Ok(Self::Rsa),
            "ed25519" | "eddsa" => Ok(Self::Ed25519),
            _ => Err(CoreError::UnknownKeyType(s.to_string())),
        }
    }
}

/// Lifecycle status of a signing key. Transitions are reversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// Published in the DID document and usable for signing.
    Active,
    /// Retained but neither published nor resolvable.
    Inactive,
}

impl KeyStatus {
    /// Whether the key is currently active.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl FromStr for KeyStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(CoreError::UnknownKeyStatus(s.to_string())),
        }
    }
}
