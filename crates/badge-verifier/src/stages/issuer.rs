use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use badge_core::Credential;
use badge_keys::IssuerResolver;

use super::{Stage, ISSUER_RESOLVABLE};
use crate::collaborators::guarded;
use crate::options::VerificationOptions;
use crate::result::{CheckCategory, CheckResult};

/// Resolves the credential issuer through an [`IssuerResolver`].
pub struct IssuerStage {
    resolver: Arc<dyn IssuerResolver>,
    timeout: Duration,
}

impl IssuerStage {
    pub fn new(resolver: Arc<dyn IssuerResolver>, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }
}

#[async_trait]
impl Stage for IssuerStage {
    fn category(&self) -> CheckCategory {
        CheckCategory::Issuer
    }

    async fn run(&self, credential: &Credential, options: &VerificationOptions) -> Vec<CheckResult> {
        if options.skip_issuer_verification {
            return Vec::new();
        }
        let issuer = credential.issuer_id();
        let check = match guarded(self.timeout, self.resolver.resolve(issuer)).await {
            Ok(true) => CheckResult::pass(ISSUER_RESOLVABLE),
            Ok(false) => CheckResult::fail(ISSUER_RESOLVABLE, "issuer could not be resolved"),
            Err(failure) => {
                tracing::warn!(issuer = issuer, error = %failure, "issuer resolver failed");
                CheckResult::fail(
                    ISSUER_RESOLVABLE,
                    format!("issuer resolution failed: {}", failure),
                )
            }
        };
        vec![check.with_detail("issuer", issuer)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{resolve, CredentialInput};
    use badge_keys::{KeyStoreError, TrustedIssuerRegistry};
    use serde_json::json;

    struct SlowResolver;

    #[async_trait]
    impl IssuerResolver for SlowResolver {
        async fn resolve(&self, _issuer_id: &str) -> Result<bool, KeyStoreError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(true)
        }
    }

    struct PanickingResolver;

    #[async_trait]
    impl IssuerResolver for PanickingResolver {
        async fn resolve(&self, issuer_id: &str) -> Result<bool, KeyStoreError> {
            panic!("resolver bug for {}", issuer_id);
        }
    }

    fn credential() -> Credential {
        resolve(&CredentialInput::from(json!({
            "@context": "https://www.w3.org/2018/credentials/v1",
            "type": "VerifiableCredential",
            "issuer": {"id": "did:web:university.edu", "name": "University"}
        })))
        .unwrap()
    }

    #[tokio::test]
    async fn test_trusted_issuer_passes() {
        let registry = Arc::new(TrustedIssuerRegistry::from_issuers(["did:web:university.edu"]));
        let stage = IssuerStage::new(registry, Duration::from_secs(1));
        let checks = stage.run(&credential(), &VerificationOptions::default()).await;
        assert_eq!(checks.len(), 1);
        assert!(checks[0].passed);
        assert_eq!(checks[0].detail("issuer"), Some(&json!("did:web:university.edu")));
    }

    #[tokio::test]
    async fn test_unknown_issuer_fails() {
        let stage = IssuerStage::new(Arc::new(TrustedIssuerRegistry::new()), Duration::from_secs(1));
        let checks = stage.run(&credential(), &VerificationOptions::default()).await;
        assert!(!checks[0].passed);
    }

    #[tokio::test]
    async fn test_timeout_is_failed_check() {
        let stage = IssuerStage::new(Arc::new(SlowResolver), Duration::from_millis(20));
        let checks = stage.run(&credential(), &VerificationOptions::default()).await;
        assert!(!checks[0].passed);
        let reason = checks[0].detail("reason").unwrap().as_str().unwrap();
        assert!(reason.contains("timed out"));
    }

    #[tokio::test]
    async fn test_panic_is_failed_check() {
        let stage = IssuerStage::new(Arc::new(PanickingResolver), Duration::from_secs(1));
        let checks = stage.run(&credential(), &VerificationOptions::default()).await;
        assert!(!checks[0].passed);
        assert!(checks[0]
            .detail("reason")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("panicked"));
    }

    #[tokio::test]
    async fn test_skip() {
        let stage = IssuerStage::new(Arc::new(PanickingResolver), Duration::from_secs(1));
        let options = VerificationOptions {
            skip_issuer_verification: true,
            ..Default::default()
        };
        assert!(stage.run(&credential(), &options).await.is_empty());
    }
}
