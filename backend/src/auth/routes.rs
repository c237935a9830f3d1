//! Defines the HTTP routes for registration, login, account management and
//! token handling. Designed to be merged into the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::require_access_token;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    let users = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout));

    let account = Router::new()
        .route("/update", put(update_profile))
        .route("/profile", get(profile))
        .route("/change-password", post(change_password))
        .route_layer(middleware::from_fn(require_access_token));

    let token = Router::new()
        .route("/refresh", get(refresh_token))
        .route("/validate", get(validate_token))
        .route("/revoke", get(revoke_token));

    Router::new()
        .nest("/users", users)
        .nest("/account", account)
        .nest("/token", token)
}
