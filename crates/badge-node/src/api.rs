//! HTTP API server for the badge node.
//!
//! Provides credential verification and issuance, key management, a
//! revocation registry and the `did:web` well-known documents.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use badge_core::{CredentialFormat, KeyStatus, KeyType};
use badge_keys::{KeyStoreError, KeySummary, WellKnownResponse};
use badge_verifier::{CredentialInput, VerifierError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::state::AppState;

// --- Request / response types ---

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub did: String,
    pub active_key: bool,
    pub trusted_issuers: usize,
    pub uptime_secs: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub credential: Value,
    #[serde(default = "default_format")]
    pub format: CredentialFormat,
    #[serde(default)]
    pub key_id: Option<String>,
}

fn default_format() -> CredentialFormat {
    CredentialFormat::JsonLd
}

#[derive(Serialize)]
pub struct IssueResponse {
    pub credential: CredentialInput,
}

#[derive(Serialize)]
pub struct KeysResponse {
    pub did: String,
    pub keys: Vec<KeySummary>,
}

#[derive(Deserialize)]
pub struct GenerateKeyRequest {
    pub id: String,
    #[serde(rename = "type", default = "default_key_type")]
    pub key_type: KeyType,
}

fn default_key_type() -> KeyType {
    KeyType::Ed25519
}

#[derive(Deserialize)]
pub struct KeyStatusRequest {
    pub status: KeyStatus,
}

#[derive(Deserialize)]
pub struct RevocationRequest {
    pub id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationResponse {
    pub id: String,
    pub revoked: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn key_error(e: KeyStoreError) -> ApiError {
    let status = match &e {
        KeyStoreError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        KeyStoreError::DuplicateKey(_) => StatusCode::CONFLICT,
        KeyStoreError::InvalidKeyId(_)
        | KeyStoreError::KeyInactive(_)
        | KeyStoreError::NoActiveKey => StatusCode::BAD_REQUEST,
        KeyStoreError::Closed => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %e, "key store request failed");
    }
    error(status, e)
}

fn issue_error(e: VerifierError) -> ApiError {
    match e {
        VerifierError::KeyStore(e) => key_error(e),
        VerifierError::InvalidCredential(_) | VerifierError::InvalidRequest(_) => {
            error(StatusCode::BAD_REQUEST, e)
        }
        other => {
            tracing::error!(error = %other, "credential issuance failed");
            error(StatusCode::INTERNAL_SERVER_ERROR, other)
        }
    }
}

fn well_known<T: Serialize>(response: WellKnownResponse<T>) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}

// --- Handlers ---

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        did: state.keys.did().to_string(),
        active_key: state.keys.has_active_key(),
        trusted_issuers: state.trusted_issuers.len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn handle_verify(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Response {
    let result = state.verifier.verify_json(body).await;
    let status = if result.is_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(result)).into_response()
}

async fn handle_issue(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IssueRequest>,
) -> Result<Json<IssueResponse>, ApiError> {
    let credential = state
        .issuer
        .issue(req.credential, req.format, req.key_id.as_deref())
        .map_err(issue_error)?;
    Ok(Json(IssueResponse { credential }))
}

async fn handle_list_keys(State(state): State<Arc<AppState>>) -> Json<KeysResponse> {
    Json(KeysResponse {
        did: state.keys.did().to_string(),
        keys: state.keys.list_keys(),
    })
}

async fn handle_generate_key(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateKeyRequest>,
) -> Result<(StatusCode, Json<KeySummary>), ApiError> {
    let record = state
        .keys
        .generate_key_pair(&req.id, req.key_type)
        .await
        .map_err(key_error)?;
    Ok((StatusCode::CREATED, Json(record.summary())))
}

async fn handle_set_key_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<KeyStatusRequest>,
) -> Result<Json<KeySummary>, ApiError> {
    let record = state
        .keys
        .set_key_status(&id, req.status)
        .await
        .map_err(key_error)?;
    Ok(Json(record.summary()))
}

async fn handle_revoke(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RevocationRequest>,
) -> Json<RevocationResponse> {
    state.revocations.revoke(req.id.clone());
    Json(RevocationResponse {
        id: req.id,
        revoked: true,
    })
}

async fn handle_reinstate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RevocationRequest>,
) -> Result<Json<RevocationResponse>, ApiError> {
    if !state.revocations.reinstate(&req.id) {
        return Err(error(
            StatusCode::NOT_FOUND,
            format!("credential {} is not revoked", req.id),
        ));
    }
    Ok(Json(RevocationResponse {
        id: req.id,
        revoked: false,
    }))
}

async fn handle_did_document(State(state): State<Arc<AppState>>) -> Response {
    well_known(state.keys.get_did_document().await)
}

async fn handle_jwks(State(state): State<Arc<AppState>>) -> Response {
    well_known(state.keys.jwks_response().await)
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/v1/credentials/verify", post(handle_verify))
        .route("/api/v1/credentials/issue", post(handle_issue))
        .route("/api/v1/credentials/revoke", post(handle_revoke))
        .route("/api/v1/credentials/reinstate", post(handle_reinstate))
        .route("/api/v1/keys", get(handle_list_keys).post(handle_generate_key))
        .route("/api/v1/keys/{id}/status", put(handle_set_key_status))
        .route("/.well-known/did.json", get(handle_did_document))
        .route("/.well-known/jwks.json", get(handle_jwks))
        .with_state(state)
}

pub async fn start_api_server(
    listen_addr: &str,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
