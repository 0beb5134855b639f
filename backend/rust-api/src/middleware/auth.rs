use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::error::ApiError;

/// Reads stay public; every write on a record collection and the token check itself need a
/// valid admin token.
pub fn requires_auth(method: &Method, path: &str) -> bool {
    if path == "/auth/verify" {
        return true;
    }
    let is_collection = ["/events", "/blogs"]
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")));
    is_collection && matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}

/// `Authorization: Bearer <token>`; anything else counts as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

pub async fn auth_middleware(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if !requires_auth(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    match state.auth.verify(bearer_token(req.headers())) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!("Rejected {} {}: {}", req.method(), req.uri().path(), err);
            ApiError::from(err).into_response()
        }
    }
}
