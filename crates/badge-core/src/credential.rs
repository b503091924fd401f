//! Normalized verifiable credential.
//!
//! Both wire encodings (JSON-LD objects and compact JWTs) are projected into
//! a single [`Credential`] once, at the verification boundary. Downstream
//! stages never look at the raw encoding again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// VC Data Model 1.1 base context.
pub const VC_CONTEXT_V1: &str = "https://www.w3.org/2018/credentials/v1";

/// VC Data Model 2.0 base context.
pub const VC_CONTEXT_V2: &str = "https://www.w3.org/ns/credentials/v2";

/// The type every verifiable credential must declare.
pub const VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";

/// One entry of a JSON-LD `@context`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextEntry {
    /// A context IRI.
    Iri(String),
    /// An inline context definition.
    Object(Map<String, Value>),
}

impl ContextEntry {
    /// Whether this entry is one of the recognized VC base contexts.
    pub fn is_vc_context(&self) -> bool {
        matches!(self, Self::Iri(iri) if iri == VC_CONTEXT_V1 || iri == VC_CONTEXT_V2)
    }
}

/// Credential issuer: a bare IRI or a profile object with an `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Issuer {
    /// Issuer given as an IRI.
    Iri(String),
    /// Issuer profile object.
    Profile {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl Issuer {
    /// The issuer identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::Iri(id) => id,
            Self::Profile { id, .. } => id,
        }
    }

    /// The issuer display name, if the profile carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Iri(_) => None,
            Self::Profile { name, .. } => name.as_deref(),
        }
    }
}

/// Embedded proof attached to a JSON-LD credential.
///
/// Every member is optional here; a proof missing a member the proof stage
/// needs fails that stage's checks instead of failing parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub proof_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cryptosuite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
    /// Members not modelled above, kept for canonicalization.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The wire encoding a credential arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialFormat {
    /// A JSON-LD object, optionally with an embedded proof.
    JsonLd,
    /// A compact JWS whose payload carries the credential.
    Jwt,
}

/// The decoded JOSE envelope of a JWT credential.
#[derive(Debug, Clone, PartialEq)]
pub struct JwtEnvelope {
    /// Decoded protected header.
    pub header: Map<String, Value>,
    /// Decoded payload claims.
    pub claims: Map<String, Value>,
    /// `base64url(header) "." base64url(payload)`, the bytes the signature covers.
    pub signing_input: String,
    /// Decoded signature bytes.
    pub signature: Vec<u8>,
}

impl JwtEnvelope {
    /// The `alg` header parameter.
    pub fn alg(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }

    /// The `kid` header parameter.
    pub fn kid(&self) -> Option<&str> {
        self.header.get("kid").and_then(Value::as_str)
    }
}

/// A credential normalized from either wire encoding.
///
/// Constructed once per verification call and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Encoding the credential arrived in.
    pub format: CredentialFormat,
    /// `@context` entries in document order.
    pub context: Vec<ContextEntry>,
    /// Credential identifier.
    pub id: Option<String>,
    /// Declared types, in document order.
    pub types: Vec<String>,
    /// Issuer IRI or profile.
    pub issuer: Issuer,
    /// Authoritative issuance instant (`validFrom` over `issuanceDate`).
    pub issuance: Option<DateTime<Utc>>,
    /// Authoritative expiration instant (`validUntil` over `expirationDate`).
    pub expiration: Option<DateTime<Utc>>,
    /// Subject claims.
    pub credential_subject: Value,
    /// Declared status mechanism, if any.
    pub credential_status: Option<Value>,
    /// Embedded proof, if any.
    pub proof: Option<Proof>,
    /// The credential document without its `proof` member.
    pub document: Map<String, Value>,
    /// JOSE envelope for JWT credentials.
    pub envelope: Option<JwtEnvelope>,
}

impl Credential {
    /// The issuer identifier.
    pub fn issuer_id(&self) -> &str {
        self.issuer.id()
    }

    /// Whether the credential declares the given type.
    pub fn has_type(&self, credential_type: &str) -> bool {
        self.types.iter().any(|t| t == credential_type)
    }
}

/// Parse an RFC 3339 timestamp from the named credential field.
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CoreError::InvalidTimestamp {
            field: field.to_string(),
            value: value.to_string(),
        })
}
