//! Compact JWS encoding for JWT credentials.

use badge_core::JwtEnvelope;
use badge_crypto::{base64url_decode, base64url_encode};
use serde_json::{Map, Value};

use crate::error::StructuralError;

/// Whether `s` is a non-empty run of unpadded base64url characters.
fn is_base64url_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Whether `s` has the shape of a compact JWS: three dot-separated
/// base64url segments.
pub fn is_compact_jws(s: &str) -> bool {
    let segments: Vec<&str> = s.split('.').collect();
    segments.len() == 3 && segments.iter().all(|seg| is_base64url_segment(seg))
}

fn decode_json_segment(segment: &str, name: &str) -> Result<Map<String, Value>, StructuralError> {
    let bytes = base64url_decode(segment)
        .map_err(|_| StructuralError::UndecodableJwt(format!("{} is not valid base64url", name)))?;
    match serde_json::from_slice(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(StructuralError::UndecodableJwt(format!(
            "{} is not a JSON object",
            name
        ))),
    }
}

/// Decode a compact JWS.
///
/// The header and payload must decode to JSON objects. A signature segment
/// that is not decodable yields an empty signature, which fails proof
/// verification later instead of rejecting the credential here.
pub fn decode_compact(token: &str) -> Result<JwtEnvelope, StructuralError> {
    if !is_compact_jws(token) {
        return Err(StructuralError::InvalidJwtFormat);
    }
    let mut parts = token.split('.');
    let (header_b64, payload_b64, signature_b64) = match (parts.next(), parts.next(), parts.next())
    {
        (Some(h), Some(p), Some(s)) => (h, p, s),
        _ => return Err(StructuralError::InvalidJwtFormat),
    };

    let header = decode_json_segment(header_b64, "header")?;
    let claims = decode_json_segment(payload_b64, "payload")?;
    let signature = base64url_decode(signature_b64).unwrap_or_default();

    Ok(JwtEnvelope {
        header,
        claims,
        signing_input: format!("{}.{}", header_b64, payload_b64),
        signature,
    })
}

/// Best-effort payload decode that skips the shape check. Used to recover
/// identifying claims from tokens rejected by [`decode_compact`].
pub fn peek_claims(token: &str) -> Option<Map<String, Value>> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64url_decode(payload).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Encode and sign a compact JWS.
pub fn encode_compact(
    header: &Map<String, Value>,
    claims: &Map<String, Value>,
    sign: impl FnOnce(&[u8]) -> Vec<u8>,
) -> Result<String, serde_json::Error> {
    let signing_input = format!(
        "{}.{}",
        base64url_encode(serde_json::to_vec(header)?),
        base64url_encode(serde_json::to_vec(claims)?)
    );
    let signature = sign(signing_input.as_bytes());
    Ok(format!("{}.{}", signing_input, base64url_encode(signature)))
}

/// The embedded credential object: the `vc` claim, or the payload itself.
pub fn embedded_credential(claims: &Map<String, Value>) -> Option<&Map<String, Value>> {
    match claims.get("vc") {
        Some(Value::Object(vc)) => Some(vc),
        Some(_) => None,
        None => Some(claims),
    }
}
