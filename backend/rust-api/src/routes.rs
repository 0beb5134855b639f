use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::handlers;
use crate::handlers::events::MAX_EVENT_IMAGES;
use crate::middleware::auth_middleware;

/// Body limit for everything except event creation.
pub const JSON_BODY_LIMIT: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let event_body_limit = state.uploader.max_bytes().saturating_mul(MAX_EVENT_IMAGES);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/events",
            get(handlers::list_events)
                .post(handlers::create_event)
                .layer(DefaultBodyLimit::max(event_body_limit)),
        )
        .route(
            "/events/:id",
            get(handlers::get_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route("/blogs", get(handlers::list_blogs).post(handlers::create_blog))
        .route(
            "/blogs/:id",
            get(handlers::get_blog)
                .put(handlers::update_blog)
                .delete(handlers::delete_blog),
        )
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/verify", get(handlers::verify))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
