//! Authentication gate
//!
//! Reads the `accessToken` cookie, verifies it and yields the embedded
//! claims. Every failure (no cookie, malformed, mis-signed, expired, wrong
//! purpose) becomes the same 401 so clients cannot probe which case applied.
//!
//! The gate only inspects requests; cookies are written by the route
//! handlers through [`TransportBinder`].

use super::cookie::{TransportBinder, ACCESS_COOKIE_NAME};
use super::jwt::IdentityClaims;
use super::session::SessionIssuer;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

const UNAUTHENTICATED: &str = "Authentication required";

/// Request guard over the session cookies
#[derive(Clone)]
pub struct AuthGate {
    sessions: SessionIssuer,
    cookies: TransportBinder,
}

impl AuthGate {
    pub fn new(sessions: SessionIssuer, cookies: TransportBinder) -> Self {
        Self { sessions, cookies }
    }

    /// Claims of the caller, or a uniform 401
    pub fn require_auth(&self, headers: &HeaderMap) -> Result<IdentityClaims, ApiError> {
        self.optional_auth(headers)
            .ok_or_else(|| ApiError::Unauthorized(UNAUTHENTICATED.to_string()))
    }

    /// Claims of the caller, or `None` for guests and invalid tokens
    pub fn optional_auth(&self, headers: &HeaderMap) -> Option<IdentityClaims> {
        let token = self.cookies.extract(headers, ACCESS_COOKIE_NAME)?;
        self.sessions.verify_access(&token)
    }

    /// Claims of an admin caller; non-admins get 403
    pub fn require_admin(&self, headers: &HeaderMap) -> Result<IdentityClaims, ApiError> {
        let claims = self.require_auth(headers)?;
        if !claims.is_admin() {
            debug!(user_id = %claims.user_id, "Admin access denied");
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(claims)
    }
}

/// Authenticated caller
///
/// Rejects with 401 when no valid access token is presented.
#[derive(Debug, Clone)]
pub struct AuthUser(pub IdentityClaims);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        let app_state = AppState::from_ref(state);
        app_state.gate().require_auth(&parts.headers).map(AuthUser)
    }
}

/// Caller identity when present; guests are `MaybeAuthUser(None)`
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<IdentityClaims>);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for MaybeAuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(MaybeAuthUser(app_state.gate().optional_auth(&parts.headers)))
    }
}

/// Middleware guarding a group of admin routes
///
/// On success the claims are stored in request extensions as [`AuthUser`].
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = state.gate().require_admin(request.headers())?;
    request.extensions_mut().insert(AuthUser(claims));
    Ok(next.run(request).await)
}
