use std::sync::Arc;

use badge_core::{CoreError, CredentialFormat, Proof, VC_CONTEXT_V1, VC_CONTEXT_V2, VERIFIABLE_CREDENTIAL};
use badge_crypto::multibase_encode;
use badge_keys::{KeyRecord, KeyStore};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::collaborators::REVOCATION_LIST_ENTRY;
use crate::error::VerifierError;
use crate::format::{self, CredentialInput};
use crate::jwt;
use crate::proof::{signing_input, suite_for, ASSERTION_METHOD, DATA_INTEGRITY_PROOF};

/// Signs credentials with keys from the local key store.
pub struct CredentialIssuer {
    keys: Arc<KeyStore>,
    revocation_list: Option<String>,
}

impl CredentialIssuer {
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self {
            keys,
            revocation_list: None,
        }
    }

    /// Attach a `credentialStatus` entry pointing into `list_id` to every
    /// credential that does not declare one, so the credential can later be
    /// revoked by its id.
    pub fn with_revocation_list(mut self, list_id: impl Into<String>) -> Self {
        self.revocation_list = Some(list_id.into());
        self
    }

    /// Sign `credential` in the requested format.
    ///
    /// Missing `@context`, `type`, `issuer`, `id` and issuance date are
    /// filled in. Any existing proof is discarded. The issuer must be this
    /// store's DID. `key_id` selects the signing key, otherwise the most
    /// recently created Active key is used.
    pub fn issue(
        &self,
        credential: Value,
        format: CredentialFormat,
        key_id: Option<&str>,
    ) -> Result<CredentialInput, VerifierError> {
        let Value::Object(mut document) = credential else {
            return Err(VerifierError::InvalidRequest(
                "credential must be a JSON object".into(),
            ));
        };
        document.remove("proof");
        self.fill_defaults(&mut document);

        let normalized = format::resolve(&CredentialInput::JsonLd(Value::Object(document.clone())))?;
        let did = self.keys.did();
        if normalized.issuer_id() != did.uri() {
            return Err(VerifierError::InvalidRequest(format!(
                "issuer {} is not {}",
                normalized.issuer_id(),
                did
            )));
        }

        let key = self.keys.signing_key(key_id)?;
        let verification_method = did.with_fragment(&key.id);

        let issued = match format {
            CredentialFormat::JsonLd => {
                CredentialInput::JsonLd(Value::Object(sign_document(document, &key, &verification_method)?))
            }
            CredentialFormat::Jwt => CredentialInput::Jwt(sign_jwt(
                document,
                &key,
                &verification_method,
                normalized.id.as_deref(),
                normalized.issuance,
                normalized.expiration,
            )?),
        };

        tracing::info!(
            credential_id = normalized.id.as_deref().unwrap_or_default(),
            format = ?format,
            key_id = %key.id,
            "credential issued"
        );
        Ok(issued)
    }

    fn fill_defaults(&self, document: &mut Map<String, Value>) {
        let context = document
            .entry("@context")
            .or_insert_with(|| json!([VC_CONTEXT_V2]))
            .clone();
        document
            .entry("type")
            .or_insert_with(|| json!([VERIFIABLE_CREDENTIAL]));
        document
            .entry("issuer")
            .or_insert_with(|| Value::String(self.keys.did().uri().to_string()));
        let id = document
            .entry("id")
            .or_insert_with(|| Value::String(format!("urn:uuid:{}", uuid::Uuid::now_v7())))
            .clone();

        if let (Some(list), Some(id)) = (self.revocation_list.as_deref(), id.as_str()) {
            document.entry("credentialStatus").or_insert_with(|| {
                json!({
                    "id": format!("{}#{}", list, id),
                    "type": REVOCATION_LIST_ENTRY,
                })
            });
        }

        if !document.contains_key("validFrom") && !document.contains_key("issuanceDate") {
            let field = if declares_v1(&context) { "issuanceDate" } else { "validFrom" };
            document.insert(field.to_string(), Value::String(now_rfc3339()));
        }
    }
}

fn declares_v1(context: &Value) -> bool {
    match context {
        Value::String(s) => s == VC_CONTEXT_V1,
        Value::Array(entries) => entries.iter().any(|e| e.as_str() == Some(VC_CONTEXT_V1)),
        _ => false,
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn sign_document(
    mut document: Map<String, Value>,
    key: &KeyRecord,
    verification_method: &str,
) -> Result<Map<String, Value>, VerifierError> {
    let proof = Proof {
        proof_type: Some(DATA_INTEGRITY_PROOF.to_string()),
        cryptosuite: Some(suite_for(key.key_type).to_string()),
        verification_method: Some(verification_method.to_string()),
        created: Some(now_rfc3339()),
        proof_purpose: Some(ASSERTION_METHOD.to_string()),
        ..Proof::default()
    };
    let input = signing_input(&document, &proof)?;
    let proof = Proof {
        proof_value: Some(multibase_encode(key.sign(&input))),
        ..proof
    };
    document.insert(
        "proof".to_string(),
        serde_json::to_value(proof).map_err(CoreError::from)?,
    );
    Ok(document)
}

fn sign_jwt(
    document: Map<String, Value>,
    key: &KeyRecord,
    verification_method: &str,
    id: Option<&str>,
    issuance: Option<DateTime<Utc>>,
    expiration: Option<DateTime<Utc>>,
) -> Result<String, VerifierError> {
    let mut header = Map::new();
    header.insert("alg".into(), Value::from(key.key_type.jws_algorithm()));
    header.insert("typ".into(), Value::from("JWT"));
    header.insert("kid".into(), Value::from(verification_method));

    let mut claims = Map::new();
    if let Some(issuer) = document.get("issuer") {
        let iss = issuer.get("id").unwrap_or(issuer);
        claims.insert("iss".into(), iss.clone());
    }
    if let Some(id) = id {
        claims.insert("jti".into(), Value::from(id));
    }
    if let Some(subject) = document
        .get("credentialSubject")
        .and_then(|s| s.get("id"))
        .and_then(Value::as_str)
    {
        claims.insert("sub".into(), Value::from(subject));
    }
    if let Some(issued) = issuance {
        claims.insert("nbf".into(), Value::from(issued.timestamp()));
    }
    if let Some(expires) = expiration {
        claims.insert("exp".into(), Value::from(expires.timestamp()));
    }
    claims.insert("vc".into(), Value::Object(document));

    jwt::encode_compact(&header, &claims, |input| key.sign(input))
        .map_err(|e| VerifierError::Core(CoreError::from(e)))
}
