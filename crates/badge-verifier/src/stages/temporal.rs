use async_trait::async_trait;
use badge_core::Credential;
use chrono::{DateTime, Utc};

use super::{Stage, TEMPORAL_EXPIRATION, TEMPORAL_ISSUANCE};
use crate::options::VerificationOptions;
use crate::result::{CheckCategory, CheckResult};

/// Issuance and expiration checks against the current time.
#[derive(Debug, Default)]
pub struct TemporalStage;

impl TemporalStage {
    /// Run both checks against a fixed instant.
    pub fn evaluate(
        credential: &Credential,
        options: &VerificationOptions,
        now: DateTime<Utc>,
    ) -> Vec<CheckResult> {
        let tolerance = options.clock_tolerance();
        vec![
            issuance_check(credential.issuance, now, tolerance),
            expiration_check(credential.expiration, now, tolerance, options.allow_expired),
        ]
    }
}

fn issuance_check(
    issuance: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    tolerance: chrono::Duration,
) -> CheckResult {
    let Some(issued) = issuance else {
        return CheckResult::pass(TEMPORAL_ISSUANCE).with_detail("present", false);
    };
    let latest = now.checked_add_signed(tolerance).unwrap_or(DateTime::<Utc>::MAX_UTC);
    if issued > latest {
        CheckResult::fail(TEMPORAL_ISSUANCE, "credential is not yet valid")
            .with_detail("issuanceDate", issued.to_rfc3339())
    } else {
        CheckResult::pass(TEMPORAL_ISSUANCE).with_detail("issuanceDate", issued.to_rfc3339())
    }
}

fn expiration_check(
    expiration: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    tolerance: chrono::Duration,
    allow_expired: bool,
) -> CheckResult {
    let Some(expires) = expiration else {
        return CheckResult::pass(TEMPORAL_EXPIRATION).with_detail("present", false);
    };
    let earliest = now.checked_sub_signed(tolerance).unwrap_or(DateTime::<Utc>::MIN_UTC);
    if expires >= earliest {
        return CheckResult::pass(TEMPORAL_EXPIRATION)
            .with_detail("expirationDate", expires.to_rfc3339());
    }
    if allow_expired {
        CheckResult::pass(TEMPORAL_EXPIRATION)
            .with_detail("expirationDate", expires.to_rfc3339())
            .with_detail("expired", true)
            .with_detail("allowExpired", true)
    } else {
        CheckResult::fail(TEMPORAL_EXPIRATION, "credential has expired")
            .with_detail("expirationDate", expires.to_rfc3339())
    }
}

#[async_trait]
impl Stage for TemporalStage {
    fn category(&self) -> CheckCategory {
        CheckCategory::Temporal
    }

    async fn run(&self, credential: &Credential, options: &VerificationOptions) -> Vec<CheckResult> {
        if options.skip_temporal_validation {
            return Vec::new();
        }
        let checks = Self::evaluate(credential, options, Utc::now());
        tracing::debug!(
            passed = checks.iter().all(|c| c.passed),
            "temporal checks evaluated"
        );
        checks
    }
}
