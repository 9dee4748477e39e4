//! Deal id path extractor

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::error::ApiError;

/// The `:id` segment of a deal route. An id that does not parse names no
/// deal, so it is rejected as `NOT_FOUND` like any other unknown id.
#[derive(Debug, Clone, Copy)]
pub struct DealId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for DealId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<Uuid>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(DealId(id)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Unparseable deal id in path");
                Err(ApiError::deal_not_found())
            }
        }
    }
}
