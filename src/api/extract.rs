use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::logic::Payload;
use crate::model::Id;

/// JSON body checked against the payload's shape before it is deserialized.
///
/// Unreadable bodies, shape violations and deserialization failures are all
/// rejected as bad requests.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: Payload,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        let shape = T::shape();
        shape.normalize(&mut value);
        shape.validate(&value)?;

        let payload = serde_json::from_value(value).map_err(|e| {
            ApiError::bad_request(format!("{}: invalid payload: {}", shape.name, e))
        })?;
        Ok(ValidatedJson(payload))
    }
}

/// Entity id taken from the `:id` path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityId(pub Id);

#[async_trait]
impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Id>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(EntityId(id))
    }
}
