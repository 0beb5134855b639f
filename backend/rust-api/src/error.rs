use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::image_host::UploadError;
use crate::services::auth::AuthError;
use crate::store::StoreError;

/// Route-boundary error. Every handler failure ends up here and leaves as a JSON body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{error}")]
    Internal { error: String, detail: Option<String> },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// `action` is the user-facing summary, e.g. "Failed to create event".
    pub fn from_store(action: &str, err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) => ApiError::BadRequest(message),
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Database(e) => {
                tracing::error!("{}: {:?}", action, e);
                ApiError::Internal {
                    error: action.to_string(),
                    detail: Some(e.to_string()),
                }
            }
        }
    }

    pub fn from_upload(action: &str, err: UploadError) -> Self {
        tracing::error!("{}: {}", action, err);
        ApiError::Internal {
            error: action.to_string(),
            detail: Some(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "Not found" })),
            ApiError::Auth(err) => {
                let status = match err {
                    AuthError::MissingToken | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    AuthError::InvalidToken => StatusCode::FORBIDDEN,
                    AuthError::Signing(_) | AuthError::PasswordHash(_) => {
                        tracing::error!("Auth failure: {:?}", err);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, json!({ "message": err.to_string() }))
            }
            ApiError::Internal { error, detail } => {
                let body = match detail {
                    Some(detail) => json!({ "error": error, "detail": detail }),
                    None => json!({ "error": error }),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_status_codes() {
        let validation = ApiError::from_store("Failed to create blog", StoreError::Validation("Title and excerpt are required".into()));
        assert_eq!(validation.into_response().status(), StatusCode::BAD_REQUEST);

        let missing = ApiError::from_store("Failed to update blog", StoreError::NotFound);
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(ApiError::from(AuthError::MissingToken).into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::InvalidCredentials).into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::InvalidToken).into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn upload_errors_are_internal() {
        let err = ApiError::from_upload("Failed to create event", UploadError::InvalidResponse);
        match &err {
            ApiError::Internal { error, detail } => {
                assert_eq!(error, "Failed to create event");
                assert_eq!(detail.as_deref(), Some("invalid provider response"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
