//! External collaborators consulted by the pipeline, and the guard every
//! call to them goes through.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use badge_core::Credential;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::FutureExt;
use serde_json::Value;

use crate::error::VerifierError;

/// Default bound on a single collaborator call.
pub const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(5);

/// `credentialStatus` type of entries pointing into a [`RevocationRegistry`].
pub const REVOCATION_LIST_ENTRY: &str = "1EdTechRevocationList";

/// Revocation state reported by a [`StatusChecker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCheck {
    pub revoked: bool,
}

/// Checks a credential's declared status mechanism.
#[async_trait]
pub trait StatusChecker: Send + Sync {
    async fn check(&self, credential: &Credential) -> Result<StatusCheck, VerifierError>;
}

/// In-memory registry of revoked credentials.
///
/// A credential is revoked when its `id`, or the `id` of its
/// `credentialStatus` entry, has been revoked here.
#[derive(Default)]
pub struct RevocationRegistry {
    revoked: DashMap<String, DateTime<Utc>>,
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self, id: impl Into<String>) {
        let id = id.into();
        tracing::info!(credential_id = %id, "credential revoked");
        self.revoked.insert(id, Utc::now());
    }

    /// Undo a revocation. Returns whether the id was revoked.
    pub fn reinstate(&self, id: &str) -> bool {
        self.revoked.remove(id).is_some()
    }

    pub fn is_revoked(&self, id: &str) -> bool {
        self.revoked.contains_key(id)
    }

    /// When `id` was revoked.
    pub fn revoked_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.revoked.get(id).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

#[async_trait]
impl StatusChecker for RevocationRegistry {
    async fn check(&self, credential: &Credential) -> Result<StatusCheck, VerifierError> {
        let status_id = credential
            .credential_status
            .as_ref()
            .and_then(|s| s.get("id"))
            .and_then(Value::as_str);
        let revoked = [credential.id.as_deref(), status_id]
            .into_iter()
            .flatten()
            .any(|id| self.is_revoked(id));
        Ok(StatusCheck { revoked })
    }
}

/// Why a collaborator call produced no answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorFailure {
    #[error("timed out after {0} ms")]
    TimedOut(u128),

    #[error("panicked")]
    Panicked,

    #[error("{0}")]
    Failed(String),
}

/// Run a collaborator call under a timeout, converting errors and panics
/// into a [`CollaboratorFailure`].
pub async fn guarded<T, E, F>(timeout: Duration, call: F) -> Result<T, CollaboratorFailure>
where
    E: std::fmt::Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, AssertUnwindSafe(call).catch_unwind()).await {
        Err(_) => Err(CollaboratorFailure::TimedOut(timeout.as_millis())),
        Ok(Err(_)) => Err(CollaboratorFailure::Panicked),
        Ok(Ok(Err(e))) => Err(CollaboratorFailure::Failed(e.to_string())),
        Ok(Ok(Ok(value))) => Ok(value),
    }
}
