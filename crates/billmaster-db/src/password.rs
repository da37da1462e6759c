//! # Password Hashing
//!
//! Argon2id hashes stored as PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so parameters travel with
//! the hash and can be raised later without a migration.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;

use crate::error::{DbError, DbResult};

/// Hashes a password for storage in `users.password_hash`.
///
/// ## Example
/// ```rust
/// use billmaster_db::password::{hash_password, verify_password};
///
/// let hash = hash_password("admin123").unwrap();
/// assert!(verify_password("admin123", &hash));
/// assert!(!verify_password("admin124", &hash));
/// ```
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt_bytes: [u8; 16] = rand::thread_rng().gen();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| DbError::Internal(format!("Failed to encode salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored hash.
///
/// A malformed hash verifies as `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("staff123").unwrap();
        let b = hash_password("staff123").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
        assert!(verify_password("staff123", &a));
        assert!(verify_password("staff123", &b));
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        assert!(!verify_password("admin123", "admin123"));
        assert!(!verify_password("admin123", ""));
    }
}
