//! Error types for the Storefront application

use crate::validation::PasswordRule;
use thiserror::Error;

/// Authentication error taxonomy
///
/// Variants are deliberately coarse: `InvalidCredentials` does not say whether
/// the account exists, and `TokenInvalid` covers malformed, mis-signed,
/// expired and wrong-purpose tokens alike.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    TokenInvalid,

    #[error("Password does not meet the strength policy")]
    WeakPassword(Vec<PasswordRule>),

    #[error("Email already registered")]
    DuplicateEmail,
}
