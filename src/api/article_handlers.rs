use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};

use crate::api::error::ApiError;
use crate::api::extract::{EntityId, ValidatedJson};
use crate::api::handlers::{AppState, ArticleListResponse};
use crate::api::params::{CursorParams, ListParams};
use crate::logic::{create_under_parent, paginate_comments, CommentPage};
use crate::model::{Article, ArticleDetail, ArticlePatch, Comment, NewArticle, NewComment, ParentRef};
use crate::store::Store;

pub async fn create_article<S: Store>(
    State(state): State<AppState<S>>,
    ValidatedJson(new_article): ValidatedJson<NewArticle>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let article = state.store.create_article(new_article).await?;
    log::info!("Created article {}", article.id);
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn get_article<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
) -> Result<Json<ArticleDetail>, ApiError> {
    Ok(Json(state.store.get_article(&id).await?))
}

pub async fn list_articles<S: Store>(
    State(state): State<AppState<S>>,
    ListParams(query): ListParams,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let listing = state.store.list_articles(&query).await?;
    Ok(Json(listing.into()))
}

pub async fn update_article<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
    ValidatedJson(patch): ValidatedJson<ArticlePatch>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.store.update_article(&id, patch).await?))
}

pub async fn delete_article<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    state.store.delete_article(&id).await?;
    log::info!("Deleted article {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_article_comment<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
    ValidatedJson(new_comment): ValidatedJson<NewComment>,
) -> Result<(StatusCode, Json<Vec<Comment>>), ApiError> {
    let comments =
        create_under_parent(state.store.as_ref(), &ParentRef::Article(id), new_comment).await?;
    Ok((StatusCode::CREATED, Json(comments)))
}

pub async fn list_article_comments<S: Store>(
    State(state): State<AppState<S>>,
    EntityId(id): EntityId,
    CursorParams(request): CursorParams,
) -> Result<Json<CommentPage>, ApiError> {
    let page = paginate_comments(state.store.as_ref(), &ParentRef::Article(id), &request).await?;
    Ok(Json(page))
}
