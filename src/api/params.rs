//! Query-string parameters for listings.
//!
//! Values arrive as strings. Numbers must be non-negative integers, `limit`
//! must be at least 1 and is clamped to the configured maximum. A parameter
//! given with an empty value counts as absent.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use std::collections::HashMap;

use crate::api::error::ApiError;
use crate::api::handlers::AppState;
use crate::config::PaginationConfig;
use crate::logic::PageRequest;
use crate::model::{ListQuery, SortOrder};
use crate::store::Store;

type RawParams = HashMap<String, String>;

/// `?sort&skip&limit&keyword` for product and article listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams(pub ListQuery);

/// `?cursor&limit` for comments under a parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorParams(pub PageRequest);

/// `?skip&limit` for the flat comment listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    pub skip: usize,
    pub limit: usize,
}

fn present<'a>(raw: &'a RawParams, name: &str) -> Option<&'a str> {
    raw.get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_count(raw: &RawParams, name: &str) -> Result<Option<usize>, ApiError> {
    present(raw, name)
        .map(|value| {
            value.parse::<usize>().map_err(|_| {
                ApiError::bad_request(format!(
                    "Query parameter `{}` must be a non-negative integer, got '{}'",
                    name, value
                ))
            })
        })
        .transpose()
}

fn parse_limit(raw: &RawParams, config: &PaginationConfig) -> Result<usize, ApiError> {
    match parse_count(raw, "limit")? {
        None => Ok(config.default_limit),
        Some(0) => Err(ApiError::bad_request(
            "Query parameter `limit` must be at least 1",
        )),
        Some(limit) => Ok(limit.min(config.max_limit)),
    }
}

impl ListParams {
    pub fn parse(raw: &RawParams, config: &PaginationConfig) -> Result<Self, ApiError> {
        let sort = match present(raw, "sort") {
            Some(value) => value.parse::<SortOrder>().map_err(ApiError::BadRequest)?,
            None => SortOrder::default(),
        };
        let skip = parse_count(raw, "skip")?.unwrap_or(0);
        let limit = parse_limit(raw, config)?;

        let mut query = ListQuery::new(sort, skip, limit);
        if let Some(keyword) = present(raw, "keyword") {
            query = query.with_keyword(keyword);
        }
        Ok(Self(query))
    }
}

impl CursorParams {
    pub fn parse(raw: &RawParams, config: &PaginationConfig) -> Result<Self, ApiError> {
        let limit = parse_limit(raw, config)?;
        let request = match present(raw, "cursor") {
            Some(cursor) => PageRequest::after(cursor, limit),
            None => PageRequest::first(limit),
        };
        Ok(Self(request))
    }
}

impl WindowParams {
    pub fn parse(raw: &RawParams, config: &PaginationConfig) -> Result<Self, ApiError> {
        Ok(Self {
            skip: parse_count(raw, "skip")?.unwrap_or(0),
            limit: parse_limit(raw, config)?,
        })
    }
}

async fn raw_params<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<RawParams, ApiError> {
    let Query(raw) = Query::<RawParams>::from_request_parts(parts, state)
        .await
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    Ok(raw)
}

#[async_trait]
impl<S: Store + 'static> FromRequestParts<AppState<S>> for ListParams {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let raw = raw_params(parts, state).await?;
        Self::parse(&raw, &state.pagination)
    }
}

#[async_trait]
impl<S: Store + 'static> FromRequestParts<AppState<S>> for CursorParams {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let raw = raw_params(parts, state).await?;
        Self::parse(&raw, &state.pagination)
    }
}

#[async_trait]
impl<S: Store + 'static> FromRequestParts<AppState<S>> for WindowParams {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let raw = raw_params(parts, state).await?;
        Self::parse(&raw, &state.pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::FailureClass;

    fn raw(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config() -> PaginationConfig {
        PaginationConfig {
            default_limit: 10,
            max_limit: 100,
        }
    }

    #[test]
    fn test_list_defaults() {
        let ListParams(query) = ListParams::parse(&raw(&[]), &config()).unwrap();
        assert_eq!(query, ListQuery::new(SortOrder::Recent, 0, 10));
    }

    #[test]
    fn test_list_parses_all_parameters() {
        let ListParams(query) = ListParams::parse(
            &raw(&[
                ("sort", "favorite"),
                ("skip", "20"),
                ("limit", "5"),
                ("keyword", "chair"),
            ]),
            &config(),
        )
        .unwrap();
        assert_eq!(query.sort, SortOrder::Favorite);
        assert_eq!(query.skip, 20);
        assert_eq!(query.limit, 5);
        assert_eq!(query.keyword.as_deref(), Some("chair"));
    }

    #[test]
    fn test_empty_keyword_means_no_filter() {
        let ListParams(query) = ListParams::parse(&raw(&[("keyword", "")]), &config()).unwrap();
        assert_eq!(query.keyword, None);
    }

    #[test]
    fn test_non_numeric_values_are_rejected() {
        for (name, value) in [("skip", "abc"), ("limit", "-1"), ("limit", "1.5")] {
            let err = ListParams::parse(&raw(&[(name, value)]), &config()).unwrap_err();
            assert_eq!(err.class(), FailureClass::ShapeViolation);
            assert!(err.to_string().contains(name));
        }
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let err = CursorParams::parse(&raw(&[("limit", "0")]), &config()).unwrap_err();
        assert_eq!(err.class(), FailureClass::ShapeViolation);
    }

    #[test]
    fn test_limit_is_clamped_to_maximum() {
        let WindowParams { limit, .. } =
            WindowParams::parse(&raw(&[("limit", "5000")]), &config()).unwrap();
        assert_eq!(limit, 100);
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        let err = ListParams::parse(&raw(&[("sort", "cheapest")]), &config()).unwrap_err();
        assert_eq!(err.class(), FailureClass::ShapeViolation);
        assert!(err.to_string().contains("cheapest"));
    }

    #[test]
    fn test_empty_cursor_counts_as_absent() {
        let CursorParams(request) =
            CursorParams::parse(&raw(&[("cursor", ""), ("limit", "3")]), &config()).unwrap();
        assert_eq!(request, PageRequest::first(3));

        let CursorParams(request) =
            CursorParams::parse(&raw(&[("cursor", "abc")]), &config()).unwrap();
        assert_eq!(request, PageRequest::after("abc", 10));
    }
}
