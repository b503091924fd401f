//! Data Integrity proofs.
//!
//! RDF dataset canonicalization is approximated with JCS, so
//! `eddsa-rdfc-2022` and `eddsa-jcs-2022` share one signing input:
//!
//! ```text
//! SHA-256(JCS(proof options)) || SHA-256(JCS(document without proof))
//! ```
//!
//! where the proof options are the proof without `proofValue`, carrying the
//! document's `@context`.

use badge_core::{CanonicalBytes, CoreError, KeyType, Proof};
use badge_crypto::sha256;
use serde_json::{Map, Value};

pub const DATA_INTEGRITY_PROOF: &str = "DataIntegrityProof";
pub const ED25519_SIGNATURE_2020: &str = "Ed25519Signature2020";

pub const EDDSA_RDFC_2022: &str = "eddsa-rdfc-2022";
pub const EDDSA_JCS_2022: &str = "eddsa-jcs-2022";
/// Deprecated RSA suite, accepted for compatibility.
pub const RSA_SHA256_2018: &str = "rsa-sha256-2018";

pub const ASSERTION_METHOD: &str = "assertionMethod";

/// Whether a proof `type` is one this verifier understands.
pub fn is_recognized_proof_type(proof_type: &str) -> bool {
    matches!(proof_type, DATA_INTEGRITY_PROOF | ED25519_SIGNATURE_2020)
}

/// How a cryptosuite identifier is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteSupport {
    Standard,
    Deprecated,
    Unknown,
}

/// Classify a cryptosuite identifier.
pub fn classify_suite(suite: &str) -> SuiteSupport {
    match suite {
        EDDSA_RDFC_2022 | EDDSA_JCS_2022 => SuiteSupport::Standard,
        RSA_SHA256_2018 => SuiteSupport::Deprecated,
        _ => SuiteSupport::Unknown,
    }
}

/// The key type a proof must be verified with. `Ed25519Signature2020` has no
/// cryptosuite and always uses Ed25519.
pub fn required_key_type(proof: &Proof) -> Option<KeyType> {
    match (proof.proof_type.as_deref(), proof.cryptosuite.as_deref()) {
        (Some(ED25519_SIGNATURE_2020), _) => Some(KeyType::Ed25519),
        (_, Some(EDDSA_RDFC_2022 | EDDSA_JCS_2022)) => Some(KeyType::Ed25519),
        (_, Some(RSA_SHA256_2018)) => Some(KeyType::Rsa),
        _ => None,
    }
}

/// The cryptosuite used when signing with a key type.
pub fn suite_for(key_type: KeyType) -> &'static str {
    match key_type {
        KeyType::Ed25519 => EDDSA_JCS_2022,
        KeyType::Rsa => RSA_SHA256_2018,
    }
}

/// Bytes a Data Integrity proof signs.
pub fn signing_input(document: &Map<String, Value>, proof: &Proof) -> Result<Vec<u8>, CoreError> {
    let mut options = match serde_json::to_value(proof)? {
        Value::Object(options) => options,
        _ => Map::new(),
    };
    options.remove("proofValue");
    match document.get("@context") {
        Some(context) => {
            options.insert("@context".to_string(), context.clone());
        }
        None => {
            options.remove("@context");
        }
    }

    let unsecured: Map<String, Value> = document
        .iter()
        .filter(|(k, _)| k.as_str() != "proof")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut input = Vec::with_capacity(64);
    input.extend_from_slice(&sha256(CanonicalBytes::new(&options)?.as_bytes()));
    input.extend_from_slice(&sha256(CanonicalBytes::new(&unsecured)?.as_bytes()));
    Ok(input)
}
