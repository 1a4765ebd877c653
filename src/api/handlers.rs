use axum::response::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::config::PaginationConfig;
use crate::model::{ArticleSummary, Listing, ProductSummary};
use crate::store::Store;

/// Shared state handed to every handler
pub struct AppState<S> {
    pub store: Arc<S>,
    pub pagination: PaginationConfig,
}

impl<S> AppState<S> {
    pub fn new(store: Arc<S>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }
}

impl<S: Store> AppState<S> {
    pub fn with_default_pagination(store: Arc<S>) -> Self {
        Self::new(store, PaginationConfig::default())
    }
}

// derive(Clone) would require S: Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            pagination: self.pagination,
        }
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub search_count: usize,
    pub products: Vec<ProductSummary>,
}

impl From<Listing<ProductSummary>> for ProductListResponse {
    fn from(listing: Listing<ProductSummary>) -> Self {
        Self {
            search_count: listing.search_count,
            products: listing.items,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListResponse {
    pub search_count: usize,
    pub articles: Vec<ArticleSummary>,
}

impl From<Listing<ArticleSummary>> for ArticleListResponse {
    fn from(listing: Listing<ArticleSummary>) -> Self {
        Self {
            search_count: listing.search_count,
            articles: listing.items,
        }
    }
}
