//! Identity store implementations
//!
//! Provides data access for user accounts.

pub mod memory;
pub mod user;

pub use memory::InMemoryUserStore;
pub use user::{NewUser, PgUserStore, StoreError, UserStore};
