use axum::{
    extract::Request,
    http::{Method, Uri},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::time::Instant;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};

use crate::api::error::{panic_response, ApiError};
use crate::api::handlers::{self, AppState};
use crate::api::{article_handlers, comment_handlers, product_handlers};
use crate::store::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Products
        .route(
            "/products",
            get(product_handlers::list_products::<S>).post(product_handlers::create_product::<S>),
        )
        .route(
            "/products/:id",
            get(product_handlers::get_product::<S>)
                .patch(product_handlers::update_product::<S>)
                .delete(product_handlers::delete_product::<S>),
        )
        .route(
            "/products/:id/comments",
            get(product_handlers::list_product_comments::<S>)
                .post(product_handlers::create_product_comment::<S>),
        )
        // Articles
        .route(
            "/articles",
            get(article_handlers::list_articles::<S>).post(article_handlers::create_article::<S>),
        )
        .route(
            "/articles/:id",
            get(article_handlers::get_article::<S>)
                .patch(article_handlers::update_article::<S>)
                .delete(article_handlers::delete_article::<S>),
        )
        .route(
            "/articles/:id/comments",
            get(article_handlers::list_article_comments::<S>)
                .post(article_handlers::create_article_comment::<S>),
        )
        // Comments
        .route("/comments", get(comment_handlers::list_comments::<S>))
        .route(
            "/comments/:id",
            get(comment_handlers::get_comment::<S>)
                .patch(comment_handlers::update_comment::<S>)
                .delete(comment_handlers::delete_comment::<S>),
        )
        // a known path with the wrong method is treated like an unknown route
        .method_not_allowed_fallback(route_not_found)
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_requests))
}

async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
