//! Authentication routes
//!
//! Provides endpoints for registration, login, token refresh, logout and
//! password changes. Tokens are delivered both in the JSON body and as
//! `HttpOnly` cookies.

use crate::auth::{AuthUser, MaybeAuthUser, REFRESH_COOKIE_NAME};
use crate::error::{ApiError, ApiResult};
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use storefront_shared::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RefreshRequest, RefreshResponse,
    RegisterRequest, Role, UserProfile,
};
use uuid::Uuid;

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .route("/me", get(get_profile))
        .route("/session", get(session_status))
        .route("/password", put(change_password))
}

/// Register a new user
///
/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, HeaderMap, Json<AuthResponse>)> {
    let (user, tokens) = UserService::register(state.users(), state.sessions(), req).await?;

    let mut headers = HeaderMap::new();
    state.cookies.attach(&mut headers, &tokens)?;

    Ok((StatusCode::CREATED, headers, Json(AuthResponse { user, tokens })))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<AuthResponse>)> {
    let (user, tokens) = UserService::login(state.users(), state.sessions(), req).await?;

    let mut headers = HeaderMap::new();
    state.cookies.attach(&mut headers, &tokens)?;

    Ok((headers, Json(AuthResponse { user, tokens })))
}

/// Mint a new access token from the refresh token
///
/// POST /api/v1/auth/refresh
///
/// The `refreshToken` cookie takes precedence over the JSON body.
async fn refresh_token(
    State(state): State<AppState>,
    request_headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> ApiResult<(HeaderMap, Json<RefreshResponse>)> {
    let refresh_token = state
        .cookies
        .extract(&request_headers, REFRESH_COOKIE_NAME)
        .or_else(|| body.and_then(|Json(req)| req.refresh_token))
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let access_token = UserService::refresh(state.sessions(), &refresh_token)?;

    let mut headers = HeaderMap::new();
    state.cookies.attach_access(&mut headers, &access_token)?;

    Ok((headers, Json(RefreshResponse { access_token })))
}

/// Log out by expiring both session cookies
///
/// POST /api/v1/auth/logout
///
/// Outstanding tokens are not revoked; the browser simply stops sending them.
async fn logout(State(state): State<AppState>) -> ApiResult<(StatusCode, HeaderMap)> {
    let mut headers = HeaderMap::new();
    state.cookies.clear(&mut headers)?;
    Ok((StatusCode::NO_CONTENT, headers))
}

/// Get current user profile (requires authentication)
///
/// GET /api/v1/auth/me
async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::profile(state.users(), claims.user_id).await?;
    Ok(Json(profile))
}

/// Session summary for guests and logged-in users
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub authenticated: bool,
    pub user: Option<SessionUser>,
}

/// Identity as carried by the access token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Describe the caller's session without requiring one
///
/// GET /api/v1/auth/session
async fn session_status(MaybeAuthUser(claims): MaybeAuthUser) -> Json<SessionStatus> {
    let user = claims.map(|c| SessionUser {
        id: c.user_id,
        email: c.email,
        name: c.name,
        role: c.role,
    });

    Json(SessionStatus {
        authenticated: user.is_some(),
        user,
    })
}

/// Change the caller's password
///
/// PUT /api/v1/auth/password
async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    UserService::change_password(state.users(), claims.user_id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}
