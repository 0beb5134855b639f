use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::services::auth::{AdminIdentity, Credential};

pub const LOGIN_REQUIRED_FIELDS: &str = "Username and password are required";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Credential>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let (username, password) = match (request.username, request.password) {
        (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => (u, p),
        _ => return Err(ApiError::bad_request(LOGIN_REQUIRED_FIELDS)),
    };

    let credential = state.auth.login(&username, &password).map_err(|e| {
        tracing::warn!("Failed login for {}: {}", username.trim(), e);
        e
    })?;

    tracing::info!("Admin {} logged in", credential.user.username);
    Ok(Json(credential))
}

/// Tokens are stateless, so there is nothing to revoke here.
pub async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logged out successfully" }))
}

pub async fn verify(Extension(identity): Extension<AdminIdentity>) -> Json<Value> {
    Json(json!({ "valid": true, "user": identity }))
}
