//! Storefront Shared Library
//!
//! This crate contains the wire types, domain models, error taxonomy and
//! input validation shared between the backend and its clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Role, User};
pub use types::*;
pub use validation::PasswordRule;
