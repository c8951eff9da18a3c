//! Password hashing utilities
//!
//! bcrypt is CPU bound; async callers go through the `*_blocking` variants,
//! which hop onto tokio's blocking pool.

use bcrypt::{hash, verify};

use crate::shared::InfraError;

fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, InfraError> {
    tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
        .await
        .map_err(|e| InfraError::Crypto(format!("hashing task failed: {}", e)))?
        .map_err(|e| InfraError::Crypto(e.to_string()))
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, InfraError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash).unwrap_or(false))
        .await
        .map_err(|e| InfraError::Crypto(format!("verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifies() {
        let a = hash_password_with_cost("Secret123", 4).unwrap();
        let b = hash_password_with_cost("Secret123", 4).unwrap();

        assert_ne!(a, "Secret123");
        assert_ne!(a, b);
        assert!(verify_password("Secret123", &a).unwrap());
        assert!(!verify_password("secret123", &a).unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_a_mismatch() {
        let ok = verify_password_blocking("x".into(), "not-a-bcrypt-hash".into())
            .await
            .unwrap();
        assert!(!ok);
    }
}
