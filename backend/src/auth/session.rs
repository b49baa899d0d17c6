//! Session issuance
//!
//! Sessions are stateless: a session is nothing more than an access/refresh
//! token pair. Nothing is persisted, so a token stays valid until it expires
//! even after logout or a password change.

use super::jwt::{Identity, IdentityClaims, TokenCodec, TokenPurpose};
use anyhow::Result;
use storefront_shared::{AuthError, TokenPair};
use thiserror::Error;
use tracing::debug;

/// Token lifetimes
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

/// Mints access/refresh token pairs
#[derive(Clone)]
pub struct SessionIssuer {
    codec: TokenCodec,
    policy: SessionPolicy,
}

impl SessionIssuer {
    pub fn new(codec: TokenCodec, policy: SessionPolicy) -> Self {
        Self { codec, policy }
    }

    /// Issue a fresh token pair for `identity`
    pub fn issue(&self, identity: &Identity) -> Result<TokenPair> {
        let access_token = self.mint_access(identity)?;
        let refresh_token = self.codec.sign(
            identity,
            TokenPurpose::Refresh,
            self.policy.refresh_token_expiry_secs,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The identity store is not consulted: the embedded claims are trusted
    /// until the refresh token expires.
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String, RefreshError> {
        let claims = self
            .codec
            .verify(refresh_token, TokenPurpose::Refresh)
            .ok_or(RefreshError::Rejected(AuthError::TokenInvalid))?;

        debug!(user_id = %claims.user_id, "Refreshing access token");
        self.mint_access(&claims.identity())
            .map_err(RefreshError::Internal)
    }

    /// Verify an access token
    #[inline]
    pub fn verify_access(&self, token: &str) -> Option<IdentityClaims> {
        self.codec.verify(token, TokenPurpose::Access)
    }

    fn mint_access(&self, identity: &Identity) -> Result<String> {
        self.codec.sign(
            identity,
            TokenPurpose::Access,
            self.policy.access_token_expiry_secs,
        )
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}

/// Refresh failure
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Rejected(AuthError),

    #[error("Failed to mint access token")]
    Internal(#[source] anyhow::Error),
}
