//! Storefront Backend Library
//!
//! Authentication core of the storefront: credential hashing, signed session
//! tokens, cookie transport and the request gate, plus the HTTP surface that
//! ties them together.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
