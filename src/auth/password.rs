//! Password hashing
//!
//! bcrypt is CPU-bound, so hashing and verification run on the blocking pool.

use crate::error::{ApiError, ApiResult};

/// Hash a password with a fresh salt
pub async fn hash_password(password: &str, cost: u32) -> ApiResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::InternalError(format!("password hashing task failed: {}", e)))?
        .map_err(|e| ApiError::InternalError(format!("password hashing failed: {}", e)))
}

/// Check a password against a stored hash. A malformed hash never verifies.
pub async fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("password check task failed: {}", e)))?;

    Ok(verified.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the tests fast
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("correct horse", TEST_COST).await.unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash).await.unwrap());
        assert!(!verify_password("wrong horse", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let a = hash_password("same", TEST_COST).await.unwrap();
        let b = hash_password("same", TEST_COST).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_malformed_hash_does_not_verify() {
        assert!(!verify_password("pw", "not-a-bcrypt-hash").await.unwrap());
    }
}
