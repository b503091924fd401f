use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StructuralError;
use crate::format::CredentialInput;

/// Per-call verification switches. Unknown members are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct VerificationOptions {
    pub skip_proof_verification: bool,
    pub skip_status_check: bool,
    pub skip_temporal_validation: bool,
    pub skip_issuer_verification: bool,
    pub allow_expired: bool,
    pub allow_revoked: bool,
    /// Allowed clock skew in seconds.
    pub clock_tolerance: u64,
}

impl VerificationOptions {
    /// Clock tolerance as a signed duration, saturating at the largest
    /// representable value.
    pub fn clock_tolerance(&self) -> chrono::Duration {
        let secs = i64::try_from(self.clock_tolerance).unwrap_or(i64::MAX);
        chrono::Duration::seconds(secs.min(i64::MAX / 1000))
    }
}

/// A `{credential, options?}` verification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub credential: CredentialInput,
    #[serde(default)]
    pub options: VerificationOptions,
}

impl VerificationRequest {
    pub fn new(credential: impl Into<CredentialInput>) -> Self {
        Self {
            credential: credential.into(),
            options: VerificationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: VerificationOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse a request body.
    ///
    /// On failure the credential, if one was present, is returned alongside
    /// the error so the caller can still report its identity.
    pub fn from_json(value: Value) -> Result<Self, (StructuralError, Option<CredentialInput>)> {
        let Value::Object(mut body) = value else {
            return Err((
                StructuralError::InvalidOptions("request must be a JSON object".into()),
                None,
            ));
        };
        let credential = match body.remove("credential") {
            Some(credential) => CredentialInput::from(credential),
            None => {
                return Err((
                    StructuralError::InvalidOptions("request is missing credential".into()),
                    None,
                ))
            }
        };
        let options = match body.remove("options") {
            None | Some(Value::Null) => VerificationOptions::default(),
            Some(raw) => match serde_json::from_value(raw) {
                Ok(options) => options,
                Err(e) => {
                    return Err((StructuralError::InvalidOptions(e.to_string()), Some(credential)))
                }
            },
        };
        Ok(Self {
            credential,
            options,
        })
    }
}
