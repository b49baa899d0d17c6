//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! Everything here is built once at startup and is read-only afterwards;
//! cloning is a handful of `Arc` increments.

use crate::auth::{AuthGate, SessionIssuer, SessionPolicy, TokenCodec, TransportBinder};
use crate::config::AppConfig;
use crate::repositories::UserStore;
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Identity store
    pub users: Arc<dyn UserStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token issuer with pre-computed keys
    pub sessions: SessionIssuer,
    /// Cookie transport
    pub cookies: TransportBinder,
    gate: AuthGate,
}

impl AppState {
    /// Create a new application state
    ///
    /// Derives the signing keys from the configured secret; call once at startup.
    pub fn new(users: Arc<dyn UserStore>, config: AppConfig) -> Self {
        let policy = SessionPolicy {
            access_token_expiry_secs: config.jwt.access_token_expiry_secs,
            refresh_token_expiry_secs: config.jwt.refresh_token_expiry_secs,
        };
        let codec = TokenCodec::new(config.jwt.secret.expose_secret().as_bytes());
        let sessions = SessionIssuer::new(codec, policy);
        let cookies = TransportBinder::new(
            config.cookie.secure,
            config.cookie.same_site,
            policy.access_token_expiry_secs,
            policy.refresh_token_expiry_secs,
        );
        let gate = AuthGate::new(sessions.clone(), cookies.clone());

        Self {
            users,
            config: Arc::new(config),
            sessions,
            cookies,
            gate,
        }
    }

    /// Get a reference to the identity store
    #[inline]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the session issuer
    #[inline]
    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }

    /// Get a reference to the auth gate
    #[inline]
    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }
}
