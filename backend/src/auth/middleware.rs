//! Middleware for protecting authenticated routes.
//!
//! `require_access_token` accepts the access token from an
//! `Authorization: Bearer` header or the `accessToken` cookie, validates it
//! through the token service and exposes the subject to handlers as an
//! `AuthenticatedUser` extension.

use crate::api::common::{ApiError, service_error_to_http};
use crate::auth::cookies::access_token_from;
use crate::auth::state::AppState;
use crate::errors::ServiceError;
use axum::{Extension, extract::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;

/// Identity established by `require_access_token`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Access-token authentication middleware
pub async fn require_access_token(
    Extension(state): Extension<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = access_token_from(request.headers(), &jar).ok_or_else(|| {
        tracing::debug!("request without access token");
        service_error_to_http(ServiceError::Unauthenticated)
    })?;

    let user_id = state
        .auth
        .tokens()
        .validate_access_token(&token)
        .map_err(service_error_to_http)?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });
    Ok(next.run(request).await)
}
