//! Authentication service
//!
//! Registration, login and session resolution.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, Session, User, UserRole};
use crate::store::Store;

use super::password::{hash_password, verify_password};
use super::token::{generate_session_token, hash_token};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    session_ttl: Duration,
    single_session: bool,
    bcrypt_cost: u32,
    min_password_length: usize,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        store: Arc<dyn Store>,
        session_ttl_hours: i64,
        single_session: bool,
        bcrypt_cost: u32,
        min_password_length: usize,
    ) -> Self {
        Self {
            store,
            session_ttl: Duration::hours(session_ttl_hours),
            single_session,
            bcrypt_cost,
            min_password_length,
        }
    }

    pub fn from_config(store: Arc<dyn Store>, config: &Config) -> Self {
        Self::new(
            store,
            config.session_ttl_hours,
            config.single_session,
            config.bcrypt_cost,
            config.min_password_length,
        )
    }

    /// Register a new account
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<User> {
        let role: UserRole = request.role.parse()?;

        if request.password.chars().count() < self.min_password_length {
            return Err(ApiError::InvalidInput(format!(
                "password must be at least {} characters",
                self.min_password_length
            )));
        }

        let email = normalize_email(&request.email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ApiError::DuplicateIdentity);
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            name: request.name.trim().to_string(),
            role,
            password_hash: hash_password(&request.password, self.bcrypt_cost).await?,
            created_at: Utc::now(),
        };

        // The unique index still guards a concurrent registration of the same email
        self.store.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue a session token
    pub async fn login(&self, request: LoginRequest) -> ApiResult<LoginResponse> {
        let role: UserRole = request
            .role
            .parse()
            .map_err(|_| ApiError::AuthenticationFailed)?;

        let user = self
            .store
            .find_user_by_email(&normalize_email(&request.email))
            .await?
            .filter(|u| u.role == role)
            .ok_or(ApiError::AuthenticationFailed)?;

        if !verify_password(&request.password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(ApiError::AuthenticationFailed);
        }

        if self.single_session {
            let revoked = self.store.revoke_user_sessions(user.id).await?;
            if revoked > 0 {
                tracing::debug!(user_id = %user.id, revoked, "Revoked previous sessions");
            }
        }

        let token = generate_session_token();
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: hash_token(&token),
            issued_at: now,
            expires_at: now + self.session_ttl,
            revoked: false,
            revoked_at: None,
        };
        self.store.insert_session(&session).await?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "User logged in");

        Ok(LoginResponse {
            user: user.into(),
            session_token: token,
            expires_at: session.expires_at,
        })
    }

    /// Find the user owning an active session with this token
    pub async fn resolve_session(&self, token: &str) -> ApiResult<(User, Session)> {
        let session = self
            .store
            .find_session_by_token_hash(&hash_token(token))
            .await?
            .filter(|s| s.is_active(Utc::now()))
            .ok_or(ApiError::Unauthenticated)?;

        let user = self
            .store
            .find_user_by_id(session.user_id)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        Ok((user, session))
    }

    /// Revoke a session (logout)
    pub async fn logout(&self, session_id: Uuid) -> ApiResult<()> {
        if !self.store.revoke_session(session_id).await? {
            return Err(ApiError::Unauthenticated);
        }
        tracing::info!(session_id = %session_id, "Session revoked");
        Ok(())
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, user_id: Uuid) -> ApiResult<User> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service(single_session: bool) -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()), 24, single_session, 4, 8)
    }

    fn register_request(email: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
            name: "Pat".to_string(),
            role: role.to_string(),
        }
    }

    fn login_request(email: &str, role: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            role: role.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let auth = service(true);
        auth.register(register_request("pat@example.com", "broker"))
            .await
            .unwrap();

        let dup = auth
            .register(register_request("PAT@example.com ", "lender"))
            .await;
        assert!(matches!(dup, Err(ApiError::DuplicateIdentity)));

        let bad_role = auth.register(register_request("x@example.com", "admin")).await;
        assert!(matches!(bad_role, Err(ApiError::InvalidInput(_))));

        let mut short = register_request("y@example.com", "broker");
        short.password = "short".to_string();
        assert!(matches!(
            auth.register(short).await,
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_login_requires_matching_role_and_password() {
        let auth = service(true);
        auth.register(register_request("pat@example.com", "broker"))
            .await
            .unwrap();

        let wrong_role = auth
            .login(login_request("pat@example.com", "lender", "hunter2hunter2"))
            .await;
        assert!(matches!(wrong_role, Err(ApiError::AuthenticationFailed)));

        let wrong_password = auth
            .login(login_request("pat@example.com", "broker", "nope"))
            .await;
        assert!(matches!(wrong_password, Err(ApiError::AuthenticationFailed)));

        let unknown = auth
            .login(login_request("nobody@example.com", "broker", "hunter2hunter2"))
            .await;
        assert!(matches!(unknown, Err(ApiError::AuthenticationFailed)));

        let ok = auth
            .login(login_request("pat@example.com", "broker", "hunter2hunter2"))
            .await
            .unwrap();
        assert_eq!(ok.user.role, UserRole::Broker);
        assert_eq!(ok.user.email, "pat@example.com");
    }

    #[tokio::test]
    async fn test_new_login_invalidates_previous_token() {
        let auth = service(true);
        auth.register(register_request("pat@example.com", "lender"))
            .await
            .unwrap();

        let first = auth
            .login(login_request("pat@example.com", "lender", "hunter2hunter2"))
            .await
            .unwrap();
        let second = auth
            .login(login_request("pat@example.com", "lender", "hunter2hunter2"))
            .await
            .unwrap();

        assert!(matches!(
            auth.resolve_session(&first.session_token).await,
            Err(ApiError::Unauthenticated)
        ));
        let (user, _) = auth.resolve_session(&second.session_token).await.unwrap();
        assert_eq!(user.id, second.user.id);
    }

    #[tokio::test]
    async fn test_multi_session_mode_keeps_both_tokens() {
        let auth = service(false);
        auth.register(register_request("pat@example.com", "lender"))
            .await
            .unwrap();

        let first = auth
            .login(login_request("pat@example.com", "lender", "hunter2hunter2"))
            .await
            .unwrap();
        let second = auth
            .login(login_request("pat@example.com", "lender", "hunter2hunter2"))
            .await
            .unwrap();

        assert!(auth.resolve_session(&first.session_token).await.is_ok());
        assert!(auth.resolve_session(&second.session_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_fabricated_and_revoked_tokens_are_rejected() {
        let auth = service(true);
        assert!(matches!(
            auth.resolve_session("deadbeef").await,
            Err(ApiError::Unauthenticated)
        ));

        auth.register(register_request("pat@example.com", "broker"))
            .await
            .unwrap();
        let login = auth
            .login(login_request("pat@example.com", "broker", "hunter2hunter2"))
            .await
            .unwrap();
        let (_, session) = auth.resolve_session(&login.session_token).await.unwrap();

        auth.logout(session.id).await.unwrap();
        assert!(auth.resolve_session(&login.session_token).await.is_err());
        assert!(matches!(
            auth.logout(session.id).await,
            Err(ApiError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let auth = AuthService::new(store.clone(), 24, true, 4, 8);
        let user = auth
            .register(register_request("pat@example.com", "broker"))
            .await
            .unwrap();

        let token = generate_session_token();
        let issued = Utc::now() - Duration::hours(48);
        store
            .insert_session(&Session {
                id: Uuid::new_v4(),
                user_id: user.id,
                token_hash: hash_token(&token),
                issued_at: issued,
                expires_at: issued + Duration::hours(24),
                revoked: false,
                revoked_at: None,
            })
            .await
            .unwrap();

        assert!(matches!(
            auth.resolve_session(&token).await,
            Err(ApiError::Unauthenticated)
        ));
    }
}
