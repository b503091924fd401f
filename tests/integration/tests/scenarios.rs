//! Integration test: the reference verification scenarios end to end.

use badge_core::KeyType;
use badge_crypto::base64url_encode;
use badge_integration_tests::{initialized_store, memory_store, unsigned_v1, ISSUER};
use badge_keys::WellKnownBody;
use badge_verifier::{
    CredentialVerifier, VerificationOptions, VerificationRequest, VerificationStatus,
};
use serde_json::json;

// =========================================================================
// Scenario A: unsigned credential, default options
// =========================================================================

#[tokio::test]
async fn test_scenario_a_missing_proof() {
    let verifier = CredentialVerifier::new(initialized_store().await);
    let result = verifier
        .verify_json(json!({"credential": unsigned_v1()}))
        .await;

    assert_eq!(result.status, VerificationStatus::Success);
    assert!(!result.is_valid);
    assert_eq!(result.checks.proof.len(), 1);
    assert!(!result.checks.proof[0].passed);
    assert_eq!(result.issuer.as_deref(), Some(ISSUER));

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["isValid"], false);
}

// =========================================================================
// Scenario B: same credential with proof verification skipped
// =========================================================================

#[tokio::test]
async fn test_scenario_b_skip_proof() {
    let verifier = CredentialVerifier::new(initialized_store().await);
    let result = verifier
        .verify_json(json!({
            "credential": unsigned_v1(),
            "options": {"skipProofVerification": true}
        }))
        .await;

    assert_eq!(result.status, VerificationStatus::Success);
    assert!(result.checks.proof.is_empty());
    let others_pass = result
        .checks
        .temporal
        .iter()
        .chain(&result.checks.issuer)
        .chain(&result.checks.status)
        .all(|c| c.passed);
    assert_eq!(result.is_valid, others_pass);
    // The local store publishes a key for the issuer DID and no status is declared.
    assert!(result.is_valid, "{:?}", result.checks);
}

#[tokio::test]
async fn test_scenario_b_issuer_without_keys() {
    // No key has been generated yet, so the issuer DID does not resolve.
    let verifier = CredentialVerifier::new(memory_store());
    let options = VerificationOptions {
        skip_proof_verification: true,
        ..Default::default()
    };
    let result = verifier
        .verify(VerificationRequest::new(unsigned_v1()).with_options(options))
        .await;
    assert!(!result.is_valid);
    assert!(!result.checks.issuer[0].passed);
}

// =========================================================================
// Scenario C: issuer recovered from a JWT with a bogus signature
// =========================================================================

#[tokio::test]
async fn test_scenario_c_jwt_issuer_reported() {
    let header = base64url_encode(br#"{"alg":"EdDSA","typ":"JWT","kid":"did:web:example.com#default"}"#);
    let payload = base64url_encode(
        serde_json::to_vec(&json!({
            "vc": {
                "@context": ["https://www.w3.org/ns/credentials/v2"],
                "type": ["VerifiableCredential"],
                "issuer": ISSUER
            }
        }))
        .unwrap(),
    );
    let token = format!("{}.{}.{}", header, payload, base64url_encode(b"signature"));

    let verifier = CredentialVerifier::new(initialized_store().await);
    let result = verifier.verify_json(json!({"credential": token})).await;
    assert_eq!(result.issuer.as_deref(), Some(ISSUER));
    assert!(!result.is_valid);
}

#[tokio::test]
async fn test_scenario_c_issuer_reported_on_structural_error() {
    let header = base64url_encode(br#"{"alg":"EdDSA"}"#);
    let payload = base64url_encode(br#"{"vc":{"issuer":"did:web:example.com"}}"#);
    let token = format!("{}.{}.signature", header, payload);

    let verifier = CredentialVerifier::new(initialized_store().await);
    let result = verifier.verify_json(json!({"credential": token})).await;
    assert_eq!(result.status, VerificationStatus::Error);
    assert_eq!(result.issuer.as_deref(), Some(ISSUER));
}

// =========================================================================
// Scenario D: one RSA key published in the DID document
// =========================================================================

#[tokio::test]
async fn test_scenario_d_rsa_key_document() {
    let store = memory_store();
    store.generate_key_pair("k1", KeyType::Rsa).await.unwrap();

    let response = store.get_did_document().await;
    assert_eq!(response.status, 200);
    let WellKnownBody::Ok(document) = response.body else {
        panic!("expected a DID document");
    };
    assert_eq!(document.verification_method.len(), 1);
    assert!(document.verification_method[0].id.ends_with("#k1"));
    assert_eq!(document.verification_method[0].public_key_jwk.kid.as_deref(), Some("k1"));
}
