//! Credential format resolution.
//!
//! A request carries either a JSON-LD object or a compact JWT. The input is
//! classified once into [`CredentialInput`] and projected into the
//! normalized [`Credential`]; nothing after this module sees the raw form.

use badge_core::{
    parse_timestamp, ContextEntry, Credential, CredentialFormat, Issuer, JwtEnvelope, Proof,
    VERIFIABLE_CREDENTIAL,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StructuralError;
use crate::jwt;

/// A credential as received, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialInput {
    /// A compact JWS string.
    Jwt(String),
    /// Any other JSON value. Only objects are valid credentials.
    JsonLd(Value),
}

impl From<Value> for CredentialInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(token) => Self::Jwt(token),
            other => Self::JsonLd(other),
        }
    }
}

impl CredentialInput {
    /// The wire format this input claims to be.
    pub fn format(&self) -> CredentialFormat {
        match self {
            Self::Jwt(_) => CredentialFormat::Jwt,
            Self::JsonLd(_) => CredentialFormat::JsonLd,
        }
    }
}

/// Identifying fields recovered from a credential that failed resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialIdentity {
    pub credential_id: Option<String>,
    pub issuer: Option<String>,
}

/// Resolve an input into a normalized credential.
pub fn resolve(input: &CredentialInput) -> Result<Credential, StructuralError> {
    match input {
        CredentialInput::JsonLd(Value::Object(obj)) => project(obj, None),
        CredentialInput::JsonLd(_) => Err(StructuralError::NotAnObject),
        CredentialInput::Jwt(token) => {
            let envelope = jwt::decode_compact(token)?;
            let vc = jwt::embedded_credential(&envelope.claims).ok_or_else(|| {
                StructuralError::UndecodableJwt("vc claim is not a JSON object".into())
            })?;
            let mut credential = project(vc, Some(&envelope))?;
            credential.format = CredentialFormat::Jwt;
            credential.envelope = Some(envelope);
            Ok(credential)
        }
    }
}

/// Recover the credential id and issuer from whatever parts of the input
/// are readable.
pub fn partial_identity(input: &CredentialInput) -> PartialIdentity {
    match input {
        CredentialInput::JsonLd(Value::Object(obj)) => PartialIdentity {
            credential_id: string_member(obj, "id"),
            issuer: obj.get("issuer").and_then(issuer_id),
        },
        CredentialInput::JsonLd(_) => PartialIdentity::default(),
        CredentialInput::Jwt(token) => {
            let Some(claims) = jwt::peek_claims(token) else {
                return PartialIdentity::default();
            };
            let vc = jwt::embedded_credential(&claims);
            PartialIdentity {
                credential_id: vc
                    .and_then(|vc| string_member(vc, "id"))
                    .or_else(|| string_member(&claims, "jti")),
                issuer: vc
                    .and_then(|vc| vc.get("issuer"))
                    .and_then(issuer_id)
                    .or_else(|| string_member(&claims, "iss")),
            }
        }
    }
}

fn string_member(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn issuer_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Object(profile) => string_member(profile, "id"),
        _ => None,
    }
}

/// Project a credential object into the normalized form. `envelope` supplies
/// registered JWT claims for members the object omits.
fn project(
    obj: &Map<String, Value>,
    envelope: Option<&JwtEnvelope>,
) -> Result<Credential, StructuralError> {
    let claims = envelope.map(|e| &e.claims);
    let mut violations = Vec::new();

    let context = match parse_context(obj.get("@context")) {
        Ok(context) => context,
        Err(e) => {
            violations.push(e);
            Vec::new()
        }
    };

    let issuer_value = match obj.get("issuer") {
        Some(Value::Null) | None => claims.and_then(|c| c.get("iss")),
        Some(value) => Some(value),
    };
    let issuer = match parse_issuer(issuer_value) {
        Ok(issuer) => Some(issuer),
        Err(e) => {
            violations.push(e);
            None
        }
    };

    let types = parse_types(obj.get("type"));
    if !types.iter().any(|t| t == VERIFIABLE_CREDENTIAL) {
        violations.push(StructuralError::MissingVerifiableCredentialType);
    }

    let issuer = match (violations.len(), issuer) {
        (0, Some(issuer)) => issuer,
        (1, _) => return Err(violations.remove(0)),
        _ => return Err(StructuralError::Multiple(violations)),
    };

    // validFrom/validUntil are authoritative over issuanceDate/expirationDate.
    let issuance = match temporal(obj, &["validFrom", "issuanceDate"])? {
        Some(ts) => Some(ts),
        None => numeric_date(claims, &["nbf", "iat"]),
    };
    let expiration = match temporal(obj, &["validUntil", "expirationDate"])? {
        Some(ts) => Some(ts),
        None => numeric_date(claims, &["exp"]),
    };

    let mut document = obj.clone();
    let proof = document.remove("proof").and_then(parse_proof);

    Ok(Credential {
        format: CredentialFormat::JsonLd,
        context,
        id: string_member(obj, "id").or_else(|| claims.and_then(|c| string_member(c, "jti"))),
        types,
        issuer,
        issuance,
        expiration,
        credential_subject: obj.get("credentialSubject").cloned().unwrap_or(Value::Null),
        credential_status: obj
            .get("credentialStatus")
            .filter(|v| !v.is_null())
            .cloned(),
        proof,
        document,
        envelope: None,
    })
}

fn parse_context(value: Option<&Value>) -> Result<Vec<ContextEntry>, StructuralError> {
    let entries = match value {
        None | Some(Value::Null) => return Err(StructuralError::MissingContext),
        Some(Value::String(iri)) => vec![ContextEntry::Iri(iri.clone())],
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(iri) => Ok(ContextEntry::Iri(iri.clone())),
                Value::Object(def) => Ok(ContextEntry::Object(def.clone())),
                _ => Err(StructuralError::UnrecognizedContext),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(StructuralError::UnrecognizedContext),
    };
    if entries.iter().any(ContextEntry::is_vc_context) {
        Ok(entries)
    } else {
        Err(StructuralError::UnrecognizedContext)
    }
}

fn parse_issuer(value: Option<&Value>) -> Result<Issuer, StructuralError> {
    match value {
        None | Some(Value::Null) => Err(StructuralError::MissingIssuer),
        Some(Value::String(id)) if id.is_empty() => Err(StructuralError::MissingIssuer),
        Some(Value::String(id)) => Ok(Issuer::Iri(id.clone())),
        Some(profile @ Value::Object(_)) if issuer_id(profile).is_some() => {
            serde_json::from_value(profile.clone()).map_err(|_| StructuralError::InvalidIssuer)
        }
        Some(_) => Err(StructuralError::InvalidIssuer),
    }
}

fn parse_types(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse the first present member of `fields`.
fn temporal(
    obj: &Map<String, Value>,
    fields: &[&str],
) -> Result<Option<DateTime<Utc>>, StructuralError> {
    for field in fields {
        match obj.get(*field) {
            None | Some(Value::Null) => continue,
            Some(Value::String(value)) => {
                return parse_timestamp(field, value).map(Some).map_err(|_| {
                    StructuralError::InvalidTimestamp {
                        field: field.to_string(),
                        value: value.clone(),
                    }
                });
            }
            Some(other) => {
                return Err(StructuralError::InvalidTimestamp {
                    field: field.to_string(),
                    value: other.to_string(),
                })
            }
        }
    }
    Ok(None)
}

/// Read a JWT NumericDate claim.
fn numeric_date(claims: Option<&Map<String, Value>>, names: &[&str]) -> Option<DateTime<Utc>> {
    let claims = claims?;
    names.iter().find_map(|name| {
        let secs = claims.get(*name)?;
        let secs = secs.as_i64().or_else(|| secs.as_f64().map(|f| f as i64))?;
        DateTime::from_timestamp(secs, 0)
    })
}

/// A malformed proof becomes an empty [`Proof`] so the proof checks fail on
/// it. For a proof set only the first proof is considered.
fn parse_proof(value: Value) -> Option<Proof> {
    match value {
        Value::Null => None,
        Value::Array(mut items) => {
            if items.is_empty() {
                None
            } else {
                parse_proof(items.swap_remove(0))
            }
        }
        other => Some(serde_json::from_value(other).unwrap_or_default()),
    }
}
