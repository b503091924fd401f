//! Verification results and their assembly.

use std::time::Instant;

use badge_core::Credential;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::format::PartialIdentity;

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check name, e.g. `temporal.expiration`.
    pub check: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl CheckResult {
    pub fn pass(check: &str) -> Self {
        Self {
            check: check.to_string(),
            passed: true,
            details: None,
        }
    }

    /// A failed check with `details.reason`.
    pub fn fail(check: &str, reason: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            passed: false,
            details: None,
        }
        .with_detail("reason", Value::String(reason.into()))
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// The value of a detail member, if present.
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref().and_then(|d| d.get(key))
    }
}

/// The four check categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckCategory {
    Temporal,
    Proof,
    Issuer,
    Status,
}

impl CheckCategory {
    pub const ALL: [CheckCategory; 4] = [Self::Temporal, Self::Proof, Self::Issuer, Self::Status];
}

/// Check results grouped by category. A skipped category is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checks {
    pub temporal: Vec<CheckResult>,
    pub proof: Vec<CheckResult>,
    pub issuer: Vec<CheckResult>,
    pub status: Vec<CheckResult>,
}

impl Checks {
    pub fn get(&self, category: CheckCategory) -> &[CheckResult] {
        match category {
            CheckCategory::Temporal => &self.temporal,
            CheckCategory::Proof => &self.proof,
            CheckCategory::Issuer => &self.issuer,
            CheckCategory::Status => &self.status,
        }
    }

    pub fn set(&mut self, category: CheckCategory, results: Vec<CheckResult>) {
        match category {
            CheckCategory::Temporal => self.temporal = results,
            CheckCategory::Proof => self.proof = results,
            CheckCategory::Issuer => self.issuer = results,
            CheckCategory::Status => self.status = results,
        }
    }

    /// Every check that ran, in category order.
    pub fn iter(&self) -> impl Iterator<Item = &CheckResult> {
        CheckCategory::ALL.into_iter().flat_map(move |c| self.get(c).iter())
    }

    /// Whether every check that ran passed. Vacuously true when none ran.
    pub fn all_passed(&self) -> bool {
        self.iter().all(|c| c.passed)
    }

    /// Find a check by name.
    pub fn find(&self, name: &str) -> Option<&CheckResult> {
        self.iter().find(|c| c.check == name)
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// The pipeline ran; see `isValid`.
    Success,
    /// The credential was rejected before any check ran.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub duration_ms: u64,
}

/// The verification result returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub status: VerificationStatus,
    pub is_valid: bool,
    pub checks: Checks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub verified_at: DateTime<Utc>,
    pub metadata: ResultMetadata,
}

impl VerificationResult {
    pub fn is_error(&self) -> bool {
        self.status == VerificationStatus::Error
    }
}

/// Builds the final result envelope. Created when a verification call
/// starts so the reported duration covers format resolution too.
#[derive(Debug, Clone, Copy)]
pub struct ResultFormatter {
    started: Instant,
}

impl ResultFormatter {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Result for a credential that went through the pipeline.
    pub fn completed(&self, credential: &Credential, checks: Checks) -> VerificationResult {
        VerificationResult {
            status: VerificationStatus::Success,
            is_valid: checks.all_passed(),
            checks,
            credential_id: credential.id.clone(),
            issuer: Some(credential.issuer_id().to_string()),
            error: None,
            verified_at: Utc::now(),
            metadata: self.metadata(),
        }
    }

    /// Result for a credential rejected before the pipeline.
    pub fn rejected(&self, error: impl ToString, partial: PartialIdentity) -> VerificationResult {
        VerificationResult {
            status: VerificationStatus::Error,
            is_valid: false,
            checks: Checks::default(),
            credential_id: partial.credential_id,
            issuer: partial.issuer,
            error: Some(error.to_string()),
            verified_at: Utc::now(),
            metadata: self.metadata(),
        }
    }

    fn metadata(&self) -> ResultMetadata {
        ResultMetadata {
            duration_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}
