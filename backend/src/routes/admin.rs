//! Admin routes
//!
//! Every route here sits behind [`admin_middleware`].

use crate::auth::{admin_middleware, AuthUser, IdentityClaims};
use crate::state::AppState;
use axum::{middleware, routing::get, Extension, Json, Router};

/// Create admin routes guarded by the admin check
pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/session", get(admin_session))
        .route_layer(middleware::from_fn_with_state(state, admin_middleware))
}

/// Claims of the calling admin
///
/// GET /api/v1/admin/session
async fn admin_session(Extension(AuthUser(claims)): Extension<AuthUser>) -> Json<IdentityClaims> {
    Json(claims)
}
