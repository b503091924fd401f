//! Integration test: issue → verify round trips across both encodings and
//! both key types.

use std::sync::Arc;

use badge_core::{CredentialFormat, KeyStatus, KeyType, Proof};
use badge_crypto::multibase_encode;
use badge_integration_tests::{initialized_store, open_badge, ISSUER};
use badge_keys::{CompositeIssuerResolver, KeyStore, LocalIssuerResolver, TrustedIssuerRegistry};
use badge_verifier::{
    proof::signing_input, CredentialInput, CredentialIssuer, CredentialVerifier,
    RevocationRegistry, VerificationOptions, VerificationRequest, VerificationResult,
};
use serde_json::{json, Value};

async fn issue_and_verify(
    keys: &Arc<KeyStore>,
    credential: Value,
    format: CredentialFormat,
    key_id: Option<&str>,
) -> (CredentialInput, VerificationResult) {
    let issued = CredentialIssuer::new(keys.clone())
        .issue(credential, format, key_id)
        .expect("issuance should succeed");
    let result = CredentialVerifier::new(keys.clone())
        .verify(VerificationRequest::new(issued.clone()))
        .await;
    (issued, result)
}

// =========================================================================
// Round trips
// =========================================================================

#[tokio::test]
async fn test_round_trip_matrix() {
    let keys = initialized_store().await;
    keys.generate_key_pair("rsa-1", KeyType::Rsa).await.unwrap();

    for format in [CredentialFormat::JsonLd, CredentialFormat::Jwt] {
        for key_id in ["default", "rsa-1"] {
            let (_, result) = issue_and_verify(&keys, open_badge(), format, Some(key_id)).await;
            assert!(
                result.is_valid,
                "{:?} with {} failed: {:?}",
                format, key_id, result.checks
            );
            assert_eq!(result.issuer.as_deref(), Some(ISSUER));
            assert!(result.credential_id.unwrap().starts_with("urn:uuid:"));
        }
    }
}

#[tokio::test]
async fn test_jwt_expiration_claim() {
    let keys = initialized_store().await;
    let mut badge = open_badge();
    badge["validFrom"] = json!("2020-01-01T00:00:00Z");
    badge["validUntil"] = json!("2021-01-01T00:00:00Z");

    let (_, result) = issue_and_verify(&keys, badge.clone(), CredentialFormat::Jwt, None).await;
    assert!(!result.is_valid);
    assert!(!result.checks.find("temporal.expiration").unwrap().passed);
    assert!(result.checks.find("proof.jws").unwrap().passed);

    let issued = CredentialIssuer::new(keys.clone())
        .issue(badge, CredentialFormat::Jwt, None)
        .unwrap();
    let options = VerificationOptions {
        allow_expired: true,
        ..Default::default()
    };
    let result = CredentialVerifier::new(keys)
        .verify(VerificationRequest::new(issued).with_options(options))
        .await;
    assert!(result.is_valid, "{:?}", result.checks);
}

// =========================================================================
// Tampering and key lifecycle
// =========================================================================

#[tokio::test]
async fn test_tampered_document_fails_signature() {
    let keys = initialized_store().await;
    let (issued, _) = issue_and_verify(&keys, open_badge(), CredentialFormat::JsonLd, None).await;
    let CredentialInput::JsonLd(mut doc) = issued else {
        panic!("expected JSON-LD");
    };
    doc["credentialSubject"]["achievement"]["name"] = json!("Advanced Rust");

    let result = CredentialVerifier::new(keys)
        .verify(VerificationRequest::new(doc))
        .await;
    assert!(!result.is_valid);
    let signature = result.checks.find("proof.signature").unwrap();
    assert!(!signature.passed);
}

#[tokio::test]
async fn test_tampered_jwt_payload_fails() {
    let keys = initialized_store().await;
    let (issued, _) = issue_and_verify(&keys, open_badge(), CredentialFormat::Jwt, None).await;
    let CredentialInput::Jwt(token) = issued else {
        panic!("expected JWT");
    };
    let parts: Vec<&str> = token.split('.').collect();
    let other = CredentialIssuer::new(keys.clone())
        .issue(json!({"type": ["VerifiableCredential"]}), CredentialFormat::Jwt, None)
        .unwrap();
    let CredentialInput::Jwt(other) = other else {
        panic!("expected JWT");
    };
    let other_payload = other.split('.').nth(1).unwrap();
    let spliced = format!("{}.{}.{}", parts[0], other_payload, parts[2]);

    let result = CredentialVerifier::new(keys)
        .verify(VerificationRequest::new(json!(spliced)))
        .await;
    assert!(!result.is_valid);
    assert!(!result.checks.find("proof.jws").unwrap().passed);
}

#[tokio::test]
async fn test_deactivated_key_invalidates_and_reactivation_restores() {
    let keys = initialized_store().await;
    let (issued, result) =
        issue_and_verify(&keys, open_badge(), CredentialFormat::JsonLd, None).await;
    assert!(result.is_valid);

    keys.generate_key_pair("next", KeyType::Ed25519).await.unwrap();
    keys.set_key_status("default", KeyStatus::Inactive).await.unwrap();
    let verifier = CredentialVerifier::new(keys.clone());
    let result = verifier.verify(VerificationRequest::new(issued.clone())).await;
    assert!(!result.is_valid);
    let signature = result.checks.find("proof.signature").unwrap();
    assert!(signature.detail("reason").unwrap().as_str().unwrap().contains("not resolvable"));

    keys.set_key_status("default", KeyStatus::Active).await.unwrap();
    let result = verifier.verify(VerificationRequest::new(issued)).await;
    assert!(result.is_valid, "{:?}", result.checks);
}

#[tokio::test]
async fn test_revocation_registry_in_pipeline() {
    let keys = initialized_store().await;
    let mut badge = open_badge();
    badge["credentialStatus"] = json!({
        "id": "https://example.com/status/3#42",
        "type": "BitstringStatusListEntry"
    });
    let issued = CredentialIssuer::new(keys.clone())
        .issue(badge, CredentialFormat::JsonLd, None)
        .unwrap();

    let registry = Arc::new(RevocationRegistry::new());
    let verifier = CredentialVerifier::new(keys).with_status_checker(registry.clone());
    assert!(verifier.verify(VerificationRequest::new(issued.clone())).await.is_valid);

    registry.revoke("https://example.com/status/3#42");
    let result = verifier.verify(VerificationRequest::new(issued.clone())).await;
    assert!(!result.is_valid);
    assert!(!result.checks.find("status.revocation").unwrap().passed);

    let options = VerificationOptions {
        allow_revoked: true,
        ..Default::default()
    };
    let result = verifier
        .verify(VerificationRequest::new(issued).with_options(options))
        .await;
    assert!(result.is_valid, "{:?}", result.checks);
}

#[tokio::test]
async fn test_revoke_issued_credential_by_id() {
    let keys = initialized_store().await;
    let issuer = CredentialIssuer::new(keys.clone())
        .with_revocation_list(format!("{}/revocations", ISSUER));
    let registry = Arc::new(RevocationRegistry::new());
    let verifier = CredentialVerifier::new(keys).with_status_checker(registry.clone());

    for format in [CredentialFormat::JsonLd, CredentialFormat::Jwt] {
        let issued = issuer.issue(open_badge(), format, None).unwrap();
        let result = verifier.verify(VerificationRequest::new(issued.clone())).await;
        assert!(result.is_valid, "{:?}", result.checks);
        let id = result.credential_id.unwrap();

        registry.revoke(id.clone());
        let result = verifier.verify(VerificationRequest::new(issued.clone())).await;
        assert!(!result.is_valid, "{:?} stayed valid after revocation", format);
        let status = result.checks.find("status.revocation").unwrap();
        assert!(!status.passed);

        assert!(registry.reinstate(&id));
        assert!(verifier.verify(VerificationRequest::new(issued)).await.is_valid);
    }
}

// =========================================================================
// Issuer binding
// =========================================================================

#[tokio::test]
async fn test_local_key_cannot_sign_for_trusted_issuer() {
    let keys = initialized_store().await;
    let trusted = "did:web:trusted-university.edu";

    let mut document = open_badge();
    document["issuer"] = json!(trusted);
    document["validFrom"] = json!("2024-01-01T00:00:00Z");
    let proof = Proof {
        proof_type: Some("DataIntegrityProof".into()),
        cryptosuite: Some("eddsa-jcs-2022".into()),
        verification_method: Some(format!("{}#default", ISSUER)),
        proof_purpose: Some("assertionMethod".into()),
        ..Proof::default()
    };
    let input = signing_input(document.as_object().unwrap(), &proof).unwrap();
    let signature = keys.signing_key(Some("default")).unwrap().sign(&input);
    document["proof"] = serde_json::to_value(Proof {
        proof_value: Some(multibase_encode(signature)),
        ..proof
    })
    .unwrap();

    let mut resolver = CompositeIssuerResolver::new();
    resolver.add_resolver(Arc::new(LocalIssuerResolver::for_store(keys.clone())));
    resolver.add_resolver(Arc::new(TrustedIssuerRegistry::from_issuers([trusted])));
    let verifier = CredentialVerifier::new(keys).with_issuer_resolver(Arc::new(resolver));

    let result = verifier.verify(VerificationRequest::new(document)).await;
    assert!(result.checks.find("issuer.resolvable").unwrap().passed);
    assert!(!result.is_valid);
    let signature = result.checks.find("proof.signature").unwrap();
    assert_eq!(
        signature.detail("reason"),
        Some(&json!("verification method is not controlled by the issuer"))
    );
}
