//! Password hashing using argon2
//!
//! Provides secure password hashing and verification.
//!
//! New hashes are always Argon2id PHC strings. Accounts imported from the
//! previous storefront carry bcrypt hashes (`$2a$`, `$2b$`, `$2y$`); those still
//! verify and are flagged by [`PasswordService::needs_rehash`] so the login
//! flow can upgrade them.
//!
//! # Performance Considerations
//!
//! Argon2 is intentionally CPU-intensive. In async contexts use the `_async`
//! variants, which run on the blocking thread pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{debug, error};

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Argon2id record with the default cost parameters that matches no password
const DECOY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$XCNym6N7Dee2uHOKvpcIJQ$mRsBkKOgP/2bSOiqs71wEcR48MtKd4Z9lIk2viM4dAo";

/// Password hashing service
///
/// Uses Argon2id which is the recommended variant for password hashing.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using argon2 with a fresh random salt (blocking operation)
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Never fails: a malformed or unrecognised record simply does not match.
    pub fn verify(password: &str, hash: &str) -> bool {
        if Self::is_bcrypt(hash) {
            return bcrypt::verify(password, hash).unwrap_or_else(|e| {
                debug!("Unreadable bcrypt record: {}", e);
                false
            });
        }

        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                debug!("Unreadable password record: {}", e);
                false
            }
        }
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> bool {
        match tokio::task::spawn_blocking(move || Self::verify(&password, &hash)).await {
            Ok(valid) => valid,
            Err(e) => {
                error!("Password verification task failed: {}", e);
                false
            }
        }
    }

    /// Spend the cost of one verification without a stored record
    ///
    /// Lets a lookup miss take as long as a password mismatch.
    pub async fn verify_decoy_async(password: String) {
        let _ = Self::verify_async(password, DECOY_HASH.to_string()).await;
    }

    /// Whether a stored record should be replaced by a fresh argon2 hash
    pub fn needs_rehash(hash: &str) -> bool {
        Self::is_bcrypt(hash)
    }

    fn is_bcrypt(hash: &str) -> bool {
        BCRYPT_PREFIXES.iter().any(|p| hash.starts_with(p))
    }
}
