//! Check categories.
//!
//! Each stage consults its own skip flag and returns no checks when skipped,
//! so the pipeline never branches on options itself.

mod issuer;
mod proof;
mod status;
mod temporal;

pub use issuer::IssuerStage;
pub use proof::ProofStage;
pub use status::StatusStage;
pub use temporal::TemporalStage;

use async_trait::async_trait;
use badge_core::Credential;

use crate::options::VerificationOptions;
use crate::result::{CheckCategory, CheckResult};

/// One check category of the verification pipeline.
///
/// Implementations never fail: every problem is reported as a failed
/// [`CheckResult`].
#[async_trait]
pub trait Stage: Send + Sync {
    fn category(&self) -> CheckCategory;

    async fn run(&self, credential: &Credential, options: &VerificationOptions) -> Vec<CheckResult>;
}

pub const TEMPORAL_ISSUANCE: &str = "temporal.issuance";
pub const TEMPORAL_EXPIRATION: &str = "temporal.expiration";
pub const PROOF_PRESENT: &str = "proof.present";
pub const PROOF_TYPE: &str = "proof.type";
pub const PROOF_CRYPTOSUITE: &str = "proof.cryptosuite";
pub const PROOF_PURPOSE: &str = "proof.purpose";
pub const PROOF_SIGNATURE: &str = "proof.signature";
pub const PROOF_JWS: &str = "proof.jws";
pub const ISSUER_RESOLVABLE: &str = "issuer.resolvable";
pub const STATUS_REVOCATION: &str = "status.revocation";
