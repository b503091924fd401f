use std::sync::Arc;
use std::time::Duration;

use badge_keys::{IssuerResolver, KeyStore, LocalIssuerResolver};
use serde_json::Value;

use crate::collaborators::{StatusChecker, DEFAULT_COLLABORATOR_TIMEOUT};
use crate::format::{self, CredentialInput, PartialIdentity};
use crate::options::{VerificationOptions, VerificationRequest};
use crate::result::{Checks, ResultFormatter, VerificationResult};
use crate::stages::{IssuerStage, ProofStage, Stage, StatusStage, TemporalStage};

/// Runs the verification pipeline.
///
/// Verification never fails: structural problems yield a result with
/// `status = "error"`, everything else a result with `status = "success"`
/// whose checks carry the outcome.
pub struct CredentialVerifier {
    keys: Arc<KeyStore>,
    issuer_resolver: Arc<dyn IssuerResolver>,
    status_checker: Option<Arc<dyn StatusChecker>>,
    timeout: Duration,
}

impl CredentialVerifier {
    /// A verifier resolving proofs and issuers against `keys`, without a
    /// status checker.
    ///
    /// `keys` need not be initialized: persisted keys are loaded before the
    /// first credential is checked.
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self {
            issuer_resolver: Arc::new(LocalIssuerResolver::for_store(keys.clone())),
            keys,
            status_checker: None,
            timeout: DEFAULT_COLLABORATOR_TIMEOUT,
        }
    }

    pub fn with_issuer_resolver(mut self, resolver: Arc<dyn IssuerResolver>) -> Self {
        self.issuer_resolver = resolver;
        self
    }

    pub fn with_status_checker(mut self, checker: Arc<dyn StatusChecker>) -> Self {
        self.status_checker = Some(checker);
        self
    }

    /// Bound on each issuer-resolver and status-checker call.
    pub fn with_collaborator_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn stages(&self) -> Vec<Box<dyn Stage>> {
        vec![
            Box::new(TemporalStage),
            Box::new(ProofStage::new(self.keys.clone())),
            Box::new(IssuerStage::new(self.issuer_resolver.clone(), self.timeout)),
            Box::new(StatusStage::new(self.status_checker.clone(), self.timeout)),
        ]
    }

    /// Verify a credential.
    pub async fn verify(&self, request: VerificationRequest) -> VerificationResult {
        self.verify_credential(&request.credential, &request.options)
            .await
    }

    pub async fn verify_credential(
        &self,
        input: &CredentialInput,
        options: &VerificationOptions,
    ) -> VerificationResult {
        let formatter = ResultFormatter::start();

        let credential = match format::resolve(input) {
            Ok(credential) => credential,
            Err(e) => {
                let partial = format::partial_identity(input);
                tracing::info!(
                    format = ?input.format(),
                    issuer = partial.issuer.as_deref().unwrap_or_default(),
                    error = %e,
                    "credential rejected"
                );
                return formatter.rejected(e, partial);
            }
        };

        if let Err(e) = self.keys.load().await {
            tracing::error!(did = %self.keys.did(), error = %e, "failed to load signing keys");
        }

        let mut checks = Checks::default();
        for stage in self.stages() {
            let results = stage.run(&credential, options).await;
            checks.set(stage.category(), results);
        }

        let result = formatter.completed(&credential, checks);
        tracing::info!(
            credential_id = result.credential_id.as_deref().unwrap_or_default(),
            issuer = result.issuer.as_deref().unwrap_or_default(),
            is_valid = result.is_valid,
            duration_ms = result.metadata.duration_ms,
            "credential verified"
        );
        result
    }

    /// Verify a raw `{credential, options?}` request body. Malformed options
    /// produce an error result rather than a failed call.
    pub async fn verify_json(&self, body: Value) -> VerificationResult {
        match VerificationRequest::from_json(body) {
            Ok(request) => self.verify(request).await,
            Err((e, credential)) => {
                let partial = credential
                    .as_ref()
                    .map(format::partial_identity)
                    .unwrap_or_else(PartialIdentity::default);
                ResultFormatter::start().rejected(e, partial)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::RevocationRegistry;
    use crate::result::VerificationStatus;
    use crate::stages::{ISSUER_RESOLVABLE, PROOF_PRESENT, STATUS_REVOCATION};
    use badge_crypto::base64url_encode;
    use badge_keys::{MemoryKeyStorage, TrustedIssuerRegistry};
    use serde_json::json;

    fn verifier() -> CredentialVerifier {
        let keys = Arc::new(KeyStore::new("example.com", Arc::new(MemoryKeyStorage::new())));
        CredentialVerifier::new(keys)
    }

    fn scenario_a() -> Value {
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "issuer": "did:web:example.com",
            "issuanceDate": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_unsigned_credential_is_invalid() {
        let result = verifier().verify(VerificationRequest::new(scenario_a())).await;
        assert_eq!(result.status, VerificationStatus::Success);
        assert!(!result.is_valid);
        assert_eq!(result.checks.proof.len(), 1);
        assert_eq!(result.checks.proof[0].check, PROOF_PRESENT);
        assert!(!result.checks.proof[0].passed);
        assert_eq!(result.issuer.as_deref(), Some("did:web:example.com"));
    }

    #[tokio::test]
    async fn test_skip_proof_leaves_other_categories() {
        let options = VerificationOptions {
            skip_proof_verification: true,
            ..Default::default()
        };
        let verifier = verifier()
            .with_issuer_resolver(Arc::new(TrustedIssuerRegistry::from_issuers(["did:web:example.com"])));
        let result = verifier
            .verify(VerificationRequest::new(scenario_a()).with_options(options))
            .await;
        assert!(result.checks.proof.is_empty());
        assert_eq!(result.checks.temporal.len(), 2);
        assert_eq!(result.checks.issuer.len(), 1);
        assert_eq!(result.checks.status.len(), 1);
        assert!(result.is_valid);
    }

    #[tokio::test]
    async fn test_all_categories_skipped_is_vacuously_valid() {
        let options = VerificationOptions {
            skip_proof_verification: true,
            skip_status_check: true,
            skip_temporal_validation: true,
            skip_issuer_verification: true,
            ..Default::default()
        };
        let result = verifier()
            .verify(VerificationRequest::new(scenario_a()).with_options(options))
            .await;
        assert!(result.checks.is_empty());
        assert!(result.is_valid);
    }

    #[tokio::test]
    async fn test_structural_error_result() {
        let mut credential = scenario_a();
        credential.as_object_mut().unwrap().remove("issuer");
        let result = verifier().verify(VerificationRequest::new(credential)).await;
        assert_eq!(result.status, VerificationStatus::Error);
        assert!(!result.is_valid);
        assert!(result.checks.is_empty());
        assert!(result.error.unwrap().contains("issuer"));
    }

    #[tokio::test]
    async fn test_jwt_partial_identity_on_error() {
        let token = format!(
            "{}.{}.signature",
            base64url_encode(br#"{"alg":"EdDSA"}"#),
            base64url_encode(br#"{"vc":{"issuer":"did:web:example.com"}}"#)
        );
        let result = verifier().verify(VerificationRequest::new(json!(token))).await;
        assert!(!result.is_valid);
        assert_eq!(result.issuer.as_deref(), Some("did:web:example.com"));
    }

    #[tokio::test]
    async fn test_status_checker_wired() {
        let registry = Arc::new(RevocationRegistry::new());
        registry.revoke("urn:uuid:revoked");
        let verifier = verifier().with_status_checker(registry);

        let mut credential = scenario_a();
        credential["id"] = json!("urn:uuid:revoked");
        credential["credentialStatus"] = json!({"id": "https://example.com/status#5", "type": "StatusList2021Entry"});
        let result = verifier.verify(VerificationRequest::new(credential)).await;
        let status = result.checks.find(STATUS_REVOCATION).unwrap();
        assert!(!status.passed);
        assert_eq!(result.credential_id.as_deref(), Some("urn:uuid:revoked"));
    }

    #[tokio::test]
    async fn test_local_issuer_resolution() {
        let keys = Arc::new(KeyStore::new("example.com", Arc::new(MemoryKeyStorage::new())));
        keys.initialize().await.unwrap();
        let verifier = CredentialVerifier::new(keys);

        let result = verifier.verify(VerificationRequest::new(scenario_a())).await;
        assert!(result.checks.find(ISSUER_RESOLVABLE).unwrap().passed);

        let mut foreign = scenario_a();
        foreign["issuer"] = json!("did:web:unknown.org");
        let result = verifier.verify(VerificationRequest::new(foreign)).await;
        assert!(!result.checks.find(ISSUER_RESOLVABLE).unwrap().passed);
    }

    #[tokio::test]
    async fn test_uninitialized_store_loads_persisted_keys() {
        let storage = Arc::new(MemoryKeyStorage::new());
        let signer = Arc::new(KeyStore::new("example.com", storage.clone()));
        signer.initialize().await.unwrap();
        let issued = crate::issuer::CredentialIssuer::new(signer)
            .issue(
                json!({"type": ["VerifiableCredential"]}),
                badge_core::CredentialFormat::JsonLd,
                None,
            )
            .unwrap();

        let keys = Arc::new(KeyStore::new("example.com", storage));
        let result = CredentialVerifier::new(keys.clone())
            .verify(VerificationRequest::new(issued))
            .await;
        assert!(result.is_valid, "{:?}", result.checks);
        assert_eq!(keys.list_keys().len(), 1);
    }

    #[tokio::test]
    async fn test_verify_json_rejects_unknown_options() {
        let result = verifier()
            .verify_json(json!({"credential": scenario_a(), "options": {"skipAll": true}}))
            .await;
        assert_eq!(result.status, VerificationStatus::Error);
        assert!(result.error.unwrap().contains("skipAll"));
        assert_eq!(result.issuer.as_deref(), Some("did:web:example.com"));
    }

    #[tokio::test]
    async fn test_verify_json_success() {
        let result = verifier()
            .verify_json(json!({"credential": scenario_a(), "options": {"skipProofVerification": true}}))
            .await;
        assert_eq!(result.status, VerificationStatus::Success);
        assert!(result.checks.proof.is_empty());
    }
}
