//! Authentication HTTP handlers
//!
//! Endpoints for email/password accounts and bearer sessions.

use axum::{extract::State, Json};

use super::AuthenticatedUser;
use crate::error::ApiError;
use crate::middleware::ValidatedJson;
use crate::models::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserResponse};
use crate::state::AppState;

/// POST /auth/register - Create a broker or lender account
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.register(req).await?;

    Ok(Json(MessageResponse::new("User registered successfully")))
}

/// POST /auth/login - Verify credentials and issue a session token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = state.auth_service.login(req).await?;
    Ok(Json(response))
}

/// GET /auth/profile - Public profile of the caller
pub async fn profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_service.get_user_by_id(user.user_id).await?;
    Ok(Json(user.into()))
}

/// POST /auth/logout - Revoke the current session
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.logout(user.session_id).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}
