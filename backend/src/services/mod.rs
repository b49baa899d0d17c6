//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the identity store and the auth core.

pub mod user;

pub use user::UserService;
