//! Authentication models for DealBridge

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::UserRole;

/// Issued session. Only the SHA-256 hash of the bearer token is kept.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether this session can still authenticate requests at `now`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 120, message = "name must be 1-120 characters"))]
    pub name: String,
    /// Parsed by the service so an unknown role is reported as invalid input
    #[serde(alias = "user_type")]
    pub role: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    pub password: String,
    #[serde(alias = "user_type")]
    pub role: String,
}

/// Login response carrying the bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

/// User response (sanitized for API)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}
