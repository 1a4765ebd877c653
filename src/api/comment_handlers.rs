use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};

use crate::api::error::ApiError;
use crate::api::extract::{EntityId, ValidatedJson};
use crate::api::handlers::AppState;
use crate::api::params::WindowParams;
use crate::model::{Comment, CommentPatch};
use crate::store::Store;

pub async fn list_comments<S: Store>(
    State(state): State<AppState<S>>,
    WindowParams { skip, limit }: WindowParams,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(state.store.list_comments(skip, limit).await?))
}

pub async fn get_comment<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
) -> Result<Json<Comment>, ApiError> {
    Ok(Json(state.store.get_comment(&id).await?))
}

pub async fn update_comment<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
    ValidatedJson(patch): ValidatedJson<CommentPatch>,
) -> Result<Json<Comment>, ApiError> {
    Ok(Json(state.store.update_comment(&id, patch).await?))
}

pub async fn delete_comment<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    state.store.delete_comment(&id).await?;
    log::info!("Deleted comment {}", id);
    Ok(StatusCode::NO_CONTENT)
}
