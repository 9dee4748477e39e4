//! Authentication extractors
//!
//! Resolve the bearer session token to a user. Role wrappers reject callers
//! of the wrong role with 403 before any handler code runs.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::access::Actor;
use crate::auth::AuthService;
use crate::error::ApiError;
use crate::models::UserRole;

/// Authenticated user resolved from a live session
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub session_id: Uuid,
}

impl AuthenticatedUser {
    /// Identity handed to the access guard
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role, self.name.clone())
    }
}

/// Extractor for authenticated users
///
/// Reads `Authorization: Bearer <token>` and looks the session up by the
/// token hash. Missing, unknown, expired and revoked tokens all reject with
/// `UNAUTHENTICATED`.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(user: AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, {}", user.name)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthenticated)?;

        let auth_service = Arc::<AuthService>::from_ref(state);
        let (user, session) = auth_service.resolve_session(bearer.token()).await?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            session_id: session.id,
        })
    }
}

/// Authenticated user holding the broker role
#[derive(Debug, Clone)]
pub struct BrokerUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for BrokerUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if user.role != UserRole::Broker {
            return Err(ApiError::AccessDenied("Broker access required".to_string()));
        }

        Ok(BrokerUser(user))
    }
}

/// Authenticated user holding the lender role
#[derive(Debug, Clone)]
pub struct LenderUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for LenderUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if user.role != UserRole::Lender {
            return Err(ApiError::AccessDenied("Lender access required".to_string()));
        }

        Ok(LenderUser(user))
    }
}
