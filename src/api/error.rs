//! Classification of every request failure into a status code and a
//! `{ "message": ... }` body.
//!
//! Handlers return [`ApiError`]; extractors, the fallback route and the panic
//! layer produce one too, so all failures go through [`classify`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::logic::ValidationError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Body or query string that could not be read at all
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    ShapeViolation,
    NotFound,
    Unclassified,
}

impl FailureClass {
    pub fn status(self) -> StatusCode {
        match self {
            FailureClass::ShapeViolation => StatusCode::BAD_REQUEST,
            FailureClass::NotFound => StatusCode::NOT_FOUND,
            FailureClass::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn class(&self) -> FailureClass {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => FailureClass::ShapeViolation,
            ApiError::Store(StoreError::InvalidInput(_)) => FailureClass::ShapeViolation,
            ApiError::Store(StoreError::NotFound { .. }) | ApiError::RouteNotFound { .. } => {
                FailureClass::NotFound
            }
            ApiError::Store(StoreError::Backend(_)) | ApiError::Internal(_) => {
                FailureClass::Unclassified
            }
        }
    }
}

/// Map a failure to its status and client-facing body.
///
/// For unclassified failures only the outermost message is exposed; the
/// underlying cause chain stays in the logs.
pub fn classify(error: &ApiError) -> (StatusCode, ErrorResponse) {
    let class = error.class();
    (class.status(), ErrorResponse::new(&error.to_string()))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = classify(&self);
        match self.class() {
            FailureClass::Unclassified => log::error!("Request failed: {:#}", DisplayChain(&self)),
            FailureClass::NotFound => log::debug!("Not found: {}", body.message),
            FailureClass::ShapeViolation => log::warn!("Rejected request: {}", body.message),
        }
        (status, Json(body)).into_response()
    }
}

/// Formats the error followed by its source chain
struct DisplayChain<'a>(&'a ApiError);

impl std::fmt::Display for DisplayChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.0 {
            ApiError::Store(StoreError::Backend(inner)) => write!(f, "{:#}", inner),
            other => write!(f, "{}", other),
        }
    }
}

/// Turn a panic inside a handler into an unclassified failure response
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };
    log::error!("Handler panicked: {}", detail);
    ApiError::Internal("Internal server error".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Violation;
    use crate::model::EntityKind;

    fn validation_error() -> ApiError {
        ApiError::Validation(ValidationError {
            shape: "CreateProduct",
            field: "description".to_string(),
            violation: Violation::TooShort { min: 10, actual: 5 },
        })
    }

    #[test]
    fn test_validation_failures_are_bad_requests() {
        let (status, body) = classify(&validation_error());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.message.contains("description"));
        assert!(body.message.contains("at least 10"));
    }

    #[test]
    fn test_storage_input_rejection_is_bad_request() {
        let error = ApiError::from(StoreError::InvalidInput(
            "new row violates check constraint".to_string(),
        ));
        assert_eq!(classify(&error).0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let error = ApiError::from(StoreError::not_found(EntityKind::Product, "abc"));
        let (status, body) = classify(&error);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "product 'abc' not found");

        let route = ApiError::RouteNotFound {
            method: "GET".to_string(),
            path: "/nowhere".to_string(),
        };
        assert_eq!(classify(&route).0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_backend_failure_exposes_only_outer_context() {
        let inner = anyhow::anyhow!("password authentication failed for user \"admin\"")
            .context("Failed to fetch product");
        let error = ApiError::from(StoreError::Backend(inner));
        let (status, body) = classify(&error);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Failed to fetch product");
        assert!(DisplayChain(&error).to_string().contains("password"));
    }

    #[test]
    fn test_error_response_serializes_message_only() {
        let json = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "boom" }));
    }

    #[test]
    fn test_panic_response_is_500() {
        let response = panic_response(Box::new("kaboom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
