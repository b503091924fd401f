use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use badge_core::Credential;

use super::{Stage, STATUS_REVOCATION};
use crate::collaborators::{guarded, StatusChecker};
use crate::options::VerificationOptions;
use crate::result::{CheckCategory, CheckResult};

/// Consults a [`StatusChecker`] when the credential declares
/// `credentialStatus`.
pub struct StatusStage {
    checker: Option<Arc<dyn StatusChecker>>,
    timeout: Duration,
}

impl StatusStage {
    pub fn new(checker: Option<Arc<dyn StatusChecker>>, timeout: Duration) -> Self {
        Self { checker, timeout }
    }
}

#[async_trait]
impl Stage for StatusStage {
    fn category(&self) -> CheckCategory {
        CheckCategory::Status
    }

    async fn run(&self, credential: &Credential, options: &VerificationOptions) -> Vec<CheckResult> {
        if options.skip_status_check {
            return Vec::new();
        }
        if credential.credential_status.is_none() {
            return vec![CheckResult::pass(STATUS_REVOCATION).with_detail("applicable", false)];
        }
        let Some(checker) = self.checker.as_ref() else {
            return vec![CheckResult::fail(
                STATUS_REVOCATION,
                "credential declares a status but no status checker is configured",
            )];
        };

        let check = match guarded(self.timeout, checker.check(credential)).await {
            Ok(status) if !status.revoked => CheckResult::pass(STATUS_REVOCATION).with_detail("revoked", false),
            Ok(_) if options.allow_revoked => CheckResult::pass(STATUS_REVOCATION)
                .with_detail("revoked", true)
                .with_detail("allowRevoked", true),
            Ok(_) => CheckResult::fail(STATUS_REVOCATION, "credential has been revoked")
                .with_detail("revoked", true),
            Err(failure) => {
                tracing::warn!(
                    credential_id = credential.id.as_deref().unwrap_or_default(),
                    error = %failure,
                    "status checker failed"
                );
                CheckResult::fail(STATUS_REVOCATION, format!("status check failed: {}", failure))
            }
        };
        vec![check]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{RevocationRegistry, StatusCheck};
    use crate::error::VerifierError;
    use crate::format::{resolve, CredentialInput};
    use serde_json::{json, Value};

    struct BrokenChecker;

    #[async_trait]
    impl StatusChecker for BrokenChecker {
        async fn check(&self, _credential: &Credential) -> Result<StatusCheck, VerifierError> {
            Err(VerifierError::Collaborator("status list unavailable".into()))
        }
    }

    fn credential(status: Option<Value>) -> Credential {
        let mut v = json!({
            "@context": ["https://www.w3.org/ns/credentials/v2"],
            "id": "urn:uuid:42",
            "type": ["VerifiableCredential"],
            "issuer": "did:web:example.com"
        });
        if let Some(status) = status {
            v["credentialStatus"] = status;
        }
        resolve(&CredentialInput::from(v)).unwrap()
    }

    fn status_entry() -> Value {
        json!({"id": "https://example.com/status#1", "type": "BitstringStatusListEntry"})
    }

    fn stage(registry: Arc<RevocationRegistry>) -> StatusStage {
        let checker: Arc<dyn StatusChecker> = registry;
        StatusStage::new(Some(checker), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_no_status_not_applicable() {
        let checks = stage(Arc::new(RevocationRegistry::new()))
            .run(&credential(None), &VerificationOptions::default())
            .await;
        assert_eq!(checks.len(), 1);
        assert!(checks[0].passed);
        assert_eq!(checks[0].detail("applicable"), Some(&json!(false)));
    }

    #[tokio::test]
    async fn test_not_revoked() {
        let checks = stage(Arc::new(RevocationRegistry::new()))
            .run(&credential(Some(status_entry())), &VerificationOptions::default())
            .await;
        assert!(checks[0].passed);
    }

    #[tokio::test]
    async fn test_revoked_fails() {
        let registry = Arc::new(RevocationRegistry::new());
        registry.revoke("urn:uuid:42");
        let checks = stage(registry)
            .run(&credential(Some(status_entry())), &VerificationOptions::default())
            .await;
        assert!(!checks[0].passed);
    }

    #[tokio::test]
    async fn test_allow_revoked_is_recorded() {
        let registry = Arc::new(RevocationRegistry::new());
        registry.revoke("urn:uuid:42");
        let options = VerificationOptions {
            allow_revoked: true,
            ..Default::default()
        };
        let checks = stage(registry)
            .run(&credential(Some(status_entry())), &options)
            .await;
        assert!(checks[0].passed);
        assert_eq!(checks[0].detail("allowRevoked"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_checker_error_is_failed_check() {
        let checker: Arc<dyn StatusChecker> = Arc::new(BrokenChecker);
        let stage = StatusStage::new(Some(checker), Duration::from_secs(1));
        let checks = stage
            .run(&credential(Some(status_entry())), &VerificationOptions::default())
            .await;
        assert!(!checks[0].passed);
        assert!(checks[0]
            .detail("reason")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("status list unavailable"));
    }

    #[tokio::test]
    async fn test_no_checker_configured() {
        let stage = StatusStage::new(None, Duration::from_secs(1));
        let checks = stage
            .run(&credential(Some(status_entry())), &VerificationOptions::default())
            .await;
        assert!(!checks[0].passed);
    }

    #[tokio::test]
    async fn test_skip() {
        let options = VerificationOptions {
            skip_status_check: true,
            ..Default::default()
        };
        let checks = stage(Arc::new(RevocationRegistry::new()))
            .run(&credential(Some(status_entry())), &options)
            .await;
        assert!(checks.is_empty());
    }
}
