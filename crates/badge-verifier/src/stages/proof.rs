use std::sync::Arc;

use async_trait::async_trait;
use badge_core::{types::split_fragment, Credential, JwtEnvelope, KeyType, Proof};
use badge_crypto::{multibase_decode, verify, PublicJwk};
use badge_keys::KeyStore;

use super::{
    Stage, PROOF_CRYPTOSUITE, PROOF_JWS, PROOF_PRESENT, PROOF_PURPOSE, PROOF_SIGNATURE, PROOF_TYPE,
};
use crate::options::VerificationOptions;
use crate::proof::{
    classify_suite, is_recognized_proof_type, required_key_type, signing_input, SuiteSupport,
    ASSERTION_METHOD, ED25519_SIGNATURE_2020,
};

const NOT_CONTROLLED_BY_ISSUER: &str = "verification method is not controlled by the issuer";
use crate::result::{CheckCategory, CheckResult};

/// Cryptographic proof checks: embedded Data Integrity proofs for JSON-LD
/// credentials, the JWS signature for JWT credentials.
pub struct ProofStage {
    keys: Arc<KeyStore>,
}

impl ProofStage {
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self { keys }
    }

    fn data_integrity(&self, credential: &Credential) -> Vec<CheckResult> {
        let Some(proof) = credential.proof.as_ref() else {
            return vec![CheckResult::fail(PROOF_PRESENT, "credential has no proof")];
        };
        let mut checks = vec![CheckResult::pass(PROOF_PRESENT)];

        let type_check = match proof.proof_type.as_deref() {
            Some(t) if is_recognized_proof_type(t) => {
                CheckResult::pass(PROOF_TYPE).with_detail("type", t)
            }
            Some(t) => CheckResult::fail(PROOF_TYPE, format!("unsupported proof type: {}", t))
                .with_detail("type", t),
            None => CheckResult::fail(PROOF_TYPE, "proof has no type"),
        };
        let type_ok = type_check.passed;
        checks.push(type_check);
        if !type_ok {
            return checks;
        }

        let suite_check = cryptosuite_check(proof);
        let suite_ok = suite_check.passed;
        checks.push(suite_check);
        if !suite_ok {
            return checks;
        }

        checks.push(purpose_check(proof));
        checks.push(self.signature_check(credential, proof));
        checks
    }

    fn signature_check(&self, credential: &Credential, proof: &Proof) -> CheckResult {
        let Some(method) = proof.verification_method.as_deref() else {
            return CheckResult::fail(PROOF_SIGNATURE, "proof has no verificationMethod");
        };
        let Some(proof_value) = proof.proof_value.as_deref() else {
            return CheckResult::fail(PROOF_SIGNATURE, "proof has no proofValue")
                .with_detail("verificationMethod", method);
        };

        let jwk = match self.resolve_key(credential, method, required_key_type(proof)) {
            Ok(jwk) => jwk,
            Err(reason) => {
                return CheckResult::fail(PROOF_SIGNATURE, reason)
                    .with_detail("verificationMethod", method)
            }
        };
        let signature = match multibase_decode(proof_value) {
            Ok(signature) => signature,
            Err(e) => {
                return CheckResult::fail(PROOF_SIGNATURE, format!("invalid proofValue: {}", e))
                    .with_detail("verificationMethod", method)
            }
        };
        let input = match signing_input(&credential.document, proof) {
            Ok(input) => input,
            Err(e) => {
                return CheckResult::fail(PROOF_SIGNATURE, format!("canonicalization failed: {}", e))
                    .with_detail("verificationMethod", method)
            }
        };

        match verify(&input, &signature, &jwk) {
            Ok(()) => CheckResult::pass(PROOF_SIGNATURE).with_detail("verificationMethod", method),
            Err(e) => {
                tracing::debug!(verification_method = method, error = %e, "proof signature rejected");
                CheckResult::fail(PROOF_SIGNATURE, "signature does not match")
                    .with_detail("verificationMethod", method)
            }
        }
    }

    fn jws(&self, credential: &Credential, envelope: &JwtEnvelope) -> Vec<CheckResult> {
        let mut checks = vec![CheckResult::pass(PROOF_PRESENT).with_detail("format", "jwt")];

        let Some(kid) = envelope.kid() else {
            checks.push(CheckResult::fail(PROOF_JWS, "JWT header has no kid"));
            return checks;
        };
        let expected = match envelope.alg() {
            Some("EdDSA") => KeyType::Ed25519,
            Some("RS256") => KeyType::Rsa,
            Some(alg) => {
                checks.push(
                    CheckResult::fail(PROOF_JWS, format!("unsupported JWS algorithm: {}", alg))
                        .with_detail("kid", kid),
                );
                return checks;
            }
            None => {
                checks.push(CheckResult::fail(PROOF_JWS, "JWT header has no alg").with_detail("kid", kid));
                return checks;
            }
        };
        if envelope.signature.is_empty() {
            checks.push(
                CheckResult::fail(PROOF_JWS, "signature segment could not be decoded")
                    .with_detail("kid", kid),
            );
            return checks;
        }

        let check = match self.resolve_key(credential, kid, Some(expected)) {
            Err(reason) => CheckResult::fail(PROOF_JWS, reason),
            Ok(jwk) => match verify(envelope.signing_input.as_bytes(), &envelope.signature, &jwk) {
                Ok(()) => CheckResult::pass(PROOF_JWS),
                Err(e) => {
                    tracing::debug!(kid = kid, error = %e, "JWS signature rejected");
                    CheckResult::fail(PROOF_JWS, "signature does not match")
                }
            },
        };
        checks.push(check.with_detail("kid", kid).with_detail("alg", expected.jws_algorithm()));
        checks
    }

    /// Resolve a verification method of the credential's issuer and check it
    /// has the expected key type. A bare key id is taken relative to the
    /// issuer DID.
    fn resolve_key(
        &self,
        credential: &Credential,
        method: &str,
        expected: Option<KeyType>,
    ) -> Result<PublicJwk, String> {
        let issuer = credential.issuer_id();
        let method = if method.starts_with("did:") {
            method.to_string()
        } else {
            format!("{}#{}", issuer, method)
        };
        let (controller, _) = split_fragment(&method);
        if controller != issuer {
            tracing::warn!(
                verification_method = %method,
                issuer = issuer,
                "proof signed by a key outside the issuer DID"
            );
            return Err(NOT_CONTROLLED_BY_ISSUER.to_string());
        }

        let jwk = self
            .keys
            .resolve_verification_method(&method)
            .map_err(|e| format!("verification method not resolvable: {}", e))?;
        let key_type = jwk.key_type().map_err(|e| e.to_string())?;
        match expected {
            Some(expected) if expected != key_type => Err(format!(
                "key type {} does not match the proof algorithm ({})",
                key_type, expected
            )),
            _ => Ok(jwk),
        }
    }
}

fn purpose_check(proof: &Proof) -> CheckResult {
    match proof.proof_purpose.as_deref() {
        Some(ASSERTION_METHOD) => CheckResult::pass(PROOF_PURPOSE).with_detail("proofPurpose", ASSERTION_METHOD),
        Some(purpose) => CheckResult::fail(
            PROOF_PURPOSE,
            format!("proof purpose {} is not {}", purpose, ASSERTION_METHOD),
        )
        .with_detail("proofPurpose", purpose),
        None => CheckResult::fail(PROOF_PURPOSE, "proof has no proofPurpose"),
    }
}

fn cryptosuite_check(proof: &Proof) -> CheckResult {
    match proof.cryptosuite.as_deref() {
        Some(suite) => match classify_suite(suite) {
            SuiteSupport::Standard => CheckResult::pass(PROOF_CRYPTOSUITE).with_detail("cryptosuite", suite),
            SuiteSupport::Deprecated => CheckResult::pass(PROOF_CRYPTOSUITE)
                .with_detail("cryptosuite", suite)
                .with_detail("deprecated", true),
            SuiteSupport::Unknown => {
                CheckResult::fail(PROOF_CRYPTOSUITE, format!("unrecognized cryptosuite: {}", suite))
                    .with_detail("cryptosuite", suite)
            }
        },
        None if proof.proof_type.as_deref() == Some(ED25519_SIGNATURE_2020) => {
            CheckResult::pass(PROOF_CRYPTOSUITE).with_detail("legacy", true)
        }
        None => CheckResult::fail(PROOF_CRYPTOSUITE, "proof has no cryptosuite"),
    }
}

#[async_trait]
impl Stage for ProofStage {
    fn category(&self) -> CheckCategory {
        CheckCategory::Proof
    }

    async fn run(&self, credential: &Credential, options: &VerificationOptions) -> Vec<CheckResult> {
        if options.skip_proof_verification {
            return Vec::new();
        }
        match credential.envelope.as_ref() {
            Some(envelope) => self.jws(credential, envelope),
            None => self.data_integrity(credential),
        }
    }
}
