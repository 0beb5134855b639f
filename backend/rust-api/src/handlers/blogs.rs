use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::{parse_record_id, BlogDraft, BlogPatch, BlogPost};
use crate::store::BlogRecords;

pub async fn create_blog(
    State(state): State<AppState>,
    payload: Result<Json<BlogDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    let Json(draft) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let post = state
        .store
        .create_blog(draft)
        .await
        .map_err(|e| ApiError::from_store("Failed to create blog", e))?;

    tracing::info!("Created blog {} ({})", post.id, post.title);
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let blogs = state
        .store
        .list_blogs()
        .await
        .map_err(|e| ApiError::from_store("Failed to fetch blogs", e))?;
    Ok(Json(blogs))
}

pub async fn get_blog(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<BlogPost>, ApiError> {
    let id = parse_record_id(&id).ok_or(ApiError::NotFound)?;
    let post = state
        .store
        .get_blog(id)
        .await
        .map_err(|e| ApiError::from_store("Failed to fetch blog", e))?;
    Ok(Json(post))
}

pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BlogPatch>, JsonRejection>,
) -> Result<Json<BlogPost>, ApiError> {
    let id = parse_record_id(&id).ok_or(ApiError::NotFound)?;
    let Json(patch) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let post = state
        .store
        .update_blog(id, patch)
        .await
        .map_err(|e| ApiError::from_store("Failed to update blog", e))?;

    tracing::info!("Updated blog {}", post.id);
    Ok(Json(post))
}

pub async fn delete_blog(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_record_id(&id).ok_or(ApiError::NotFound)?;
    state
        .store
        .delete_blog(id)
        .await
        .map_err(|e| ApiError::from_store("Failed to delete blog", e))?;

    tracing::info!("Deleted blog {}", id);
    Ok(Json(json!({ "ok": true })))
}
