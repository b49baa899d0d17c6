//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Email syntax checks are delegated to the `validator` crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidateEmail;

/// Minimum password length in characters
pub const MIN_PASSWORD_LEN: usize = 8;
/// Maximum password length in characters
pub const MAX_PASSWORD_LEN: usize = 128;
/// Maximum display name length in characters
pub const MAX_NAME_LEN: usize = 100;

/// Normalize an email for storage and lookup (trimmed, lower-cased)
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email.contains('.') || !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(format!("Name must be at most {} characters", MAX_NAME_LEN));
    }
    Ok(())
}

// ============================================================================
// Password Strength Policy
// ============================================================================

/// A single rule of the password strength policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordRule {
    MinLength,
    MaxLength,
    Uppercase,
    Lowercase,
    Digit,
    Special,
}

impl PasswordRule {
    /// Every rule, in the order they are reported
    pub const ALL: [PasswordRule; 6] = [
        PasswordRule::MinLength,
        PasswordRule::MaxLength,
        PasswordRule::Uppercase,
        PasswordRule::Lowercase,
        PasswordRule::Digit,
        PasswordRule::Special,
    ];

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            PasswordRule::MinLength => "min_length",
            PasswordRule::MaxLength => "max_length",
            PasswordRule::Uppercase => "uppercase",
            PasswordRule::Lowercase => "lowercase",
            PasswordRule::Digit => "digit",
            PasswordRule::Special => "special",
        }
    }

    /// Human-readable description for per-rule feedback
    pub fn message(&self) -> String {
        match self {
            PasswordRule::MinLength => {
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN)
            }
            PasswordRule::MaxLength => {
                format!("Password must be at most {} characters", MAX_PASSWORD_LEN)
            }
            PasswordRule::Uppercase => "Password must contain an uppercase letter".to_string(),
            PasswordRule::Lowercase => "Password must contain a lowercase letter".to_string(),
            PasswordRule::Digit => "Password must contain a digit".to_string(),
            PasswordRule::Special => "Password must contain a special character".to_string(),
        }
    }

    fn is_satisfied_by(&self, password: &str) -> bool {
        let len = password.chars().count();
        match self {
            PasswordRule::MinLength => len >= MIN_PASSWORD_LEN,
            PasswordRule::MaxLength => len <= MAX_PASSWORD_LEN,
            PasswordRule::Uppercase => password.chars().any(char::is_uppercase),
            PasswordRule::Lowercase => password.chars().any(char::is_lowercase),
            PasswordRule::Digit => password.chars().any(|c| c.is_ascii_digit()),
            PasswordRule::Special => password
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
        }
    }
}

impl fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Every policy rule the password violates (empty when it is acceptable)
pub fn password_violations(password: &str) -> Vec<PasswordRule> {
    PasswordRule::ALL
        .iter()
        .copied()
        .filter(|rule| !rule.is_satisfied_by(password))
        .collect()
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), Vec<PasswordRule>> {
    let violations = password_violations(password);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
