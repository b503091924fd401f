//! did:web documents and the well-known response envelope.

use badge_core::Did;
use badge_crypto::{JwkSet, PublicJwk};
use serde::{Deserialize, Serialize};

/// DID Core v1 context.
pub const DID_CONTEXT_V1: &str = "https://www.w3.org/ns/did/v1";

/// JsonWebKey2020 suite context.
pub const JWS_2020_CONTEXT_V1: &str = "https://w3id.org/security/suites/jws-2020/v1";

/// Verification method type used for every published key.
pub const JSON_WEB_KEY_2020: &str = "JsonWebKey2020";

/// A verification method within a DID document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// `did#keyId`.
    pub id: String,
    #[serde(rename = "type")]
    pub method_type: String,
    pub controller: String,
    pub public_key_jwk: PublicJwk,
}

/// W3C DID document for a `did:web` identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    pub verification_method: Vec<VerificationMethod>,
    pub authentication: Vec<String>,
    pub assertion_method: Vec<String>,
}

impl DidDocument {
    /// An empty document for `did`.
    pub fn new(did: &Did) -> Self {
        Self {
            context: vec![DID_CONTEXT_V1.to_string(), JWS_2020_CONTEXT_V1.to_string()],
            id: did.uri().to_string(),
            verification_method: Vec::new(),
            authentication: Vec::new(),
            assertion_method: Vec::new(),
        }
    }

    /// Build a document publishing every key of a JWK Set.
    ///
    /// Keys without a `kid` cannot be addressed by a DID URL and are skipped.
    pub fn from_jwk_set(did: &Did, jwks: &JwkSet) -> Self {
        let mut doc = Self::new(did);
        for jwk in &jwks.keys {
            if let Some(kid) = jwk.kid.as_deref() {
                doc.add_verification_method(kid, jwk.clone());
            }
        }
        doc
    }

    /// Publish a key for authentication and assertion.
    pub fn add_verification_method(&mut self, key_id: &str, jwk: PublicJwk) {
        let id = format!("{}#{}", self.id, key_id);
        self.verification_method.push(VerificationMethod {
            id: id.clone(),
            method_type: JSON_WEB_KEY_2020.to_string(),
            controller: self.id.clone(),
            public_key_jwk: jwk,
        });
        self.authentication.push(id.clone());
        self.assertion_method.push(id);
    }

    /// Look up a verification method by its full id.
    pub fn find_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }
}

/// Body of a failed well-known response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of a well-known response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WellKnownBody<T> {
    Ok(T),
    Error(ErrorBody),
}

/// `{status, body}` envelope returned by the well-known operations instead
/// of an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellKnownResponse<T> {
    pub status: u16,
    pub body: WellKnownBody<T>,
}

impl<T> WellKnownResponse<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: 200,
            body: WellKnownBody::Ok(body),
        }
    }

    pub fn internal_error(error: impl Into<String>) -> Self {
        Self {
            status: 500,
            body: WellKnownBody::Error(ErrorBody {
                error: error.into(),
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.body, WellKnownBody::Ok(_))
    }

    /// The successful body, if any.
    pub fn into_body(self) -> Option<T> {
        match self.body {
            WellKnownBody::Ok(body) => Some(body),
            WellKnownBody::Error(_) => None,
        }
    }
}

pub type DidDocumentResponse = WellKnownResponse<DidDocument>;
pub type JwkSetResponse = WellKnownResponse<JwkSet>;
