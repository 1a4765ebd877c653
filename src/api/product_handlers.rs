use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};

use crate::api::error::ApiError;
use crate::api::extract::{EntityId, ValidatedJson};
use crate::api::handlers::{AppState, ProductListResponse};
use crate::api::params::{CursorParams, ListParams};
use crate::logic::{create_under_parent, paginate_comments, CommentPage};
use crate::model::{Comment, NewComment, NewProduct, ParentRef, Product, ProductDetail, ProductPatch};
use crate::store::Store;

pub async fn create_product<S: Store>(
    State(state): State<AppState<S>>,
    ValidatedJson(new_product): ValidatedJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.store.create_product(new_product).await?;
    log::info!("Created product {}", product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
) -> Result<Json<ProductDetail>, ApiError> {
    Ok(Json(state.store.get_product(&id).await?))
}

pub async fn list_products<S: Store>(
    State(state): State<AppState<S>>,
    ListParams(query): ListParams,
) -> Result<Json<ProductListResponse>, ApiError> {
    let listing = state.store.list_products(&query).await?;
    Ok(Json(listing.into()))
}

pub async fn update_product<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
    ValidatedJson(patch): ValidatedJson<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.store.update_product(&id, patch).await?))
}

pub async fn delete_product<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    state.store.delete_product(&id).await?;
    log::info!("Deleted product {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_product_comment<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
    ValidatedJson(new_comment): ValidatedJson<NewComment>,
) -> Result<(StatusCode, Json<Vec<Comment>>), ApiError> {
    let comments =
        create_under_parent(state.store.as_ref(), &ParentRef::Product(id), new_comment).await?;
    Ok((StatusCode::CREATED, Json(comments)))
}

pub async fn list_product_comments<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
    CursorParams(request): CursorParams,
) -> Result<Json<CommentPage>, ApiError> {
    let page = paginate_comments(state.store.as_ref(), &ParentRef::Product(id), &request).await?;
    Ok(Json(page))
}
