//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse request data, call `AuthService` / `TokenService`,
//! and translate the outcome into `ApiResponse` bodies and token cookies.

use crate::api::common::{ApiError, ApiResponse, service_error_to_http};
use crate::auth::cookies::{ACCESS_COOKIE, REFRESH_COOKIE, access_token_from, refresh_token_from};
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::models::*;
use crate::auth::state::AppState;
use crate::database::models::User;
use crate::errors::ServiceError;
use axum::{
    extract::{Extension, Json},
    http::{HeaderMap, StatusCode},
};
use axum_extra::extract::cookie::CookieJar;

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = state
        .auth
        .register(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user, "User created successfully")),
    ))
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(state): Extension<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let outcome = state.auth.login(payload).await.map_err(service_error_to_http)?;

    let tokens = state.auth.tokens();
    let jar = jar
        .add(state.cookies.token_cookie(
            ACCESS_COOKIE,
            outcome.access_token,
            tokens.access_ttl(),
        ))
        .add(state.cookies.token_cookie(
            REFRESH_COOKIE,
            outcome.refresh_token,
            tokens.refresh_ttl(),
        ));

    let response = LoginResponse {
        user: outcome.user,
        expires_in: tokens.access_ttl().as_secs(),
    };

    Ok((
        jar,
        Json(ApiResponse::success(response, "User authenticated successfully")),
    ))
}

/// Handle logout request: revoke presented tokens and clear both cookies
#[axum::debug_handler]
pub async fn logout(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    let access_token = access_token_from(&headers, &jar);
    let refresh_token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    state
        .auth
        .logout(access_token.as_deref(), refresh_token.as_deref());

    let jar = state.cookies.clear(jar, ACCESS_COOKIE);
    let jar = state.cookies.clear(jar, REFRESH_COOKIE);
    (jar, Json(ApiResponse::message("Logged out successfully")))
}

/// Update the authenticated user's profile
#[axum::debug_handler]
pub async fn update_profile(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let updated = state
        .auth
        .update_profile(&user.user_id, payload)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(updated, "User updated successfully")))
}

/// Get current user information from token
#[axum::debug_handler]
pub async fn profile(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let profile = state
        .auth
        .get_profile(&user.user_id)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(profile, "Profile retrieved successfully")))
}

/// Change the authenticated user's password
#[axum::debug_handler]
pub async fn change_password(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_request(&payload).map_err(service_error_to_http)?;

    state
        .auth
        .change_password(&user.user_id, &payload.old_password, &payload.new_password)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::message("Password changed successfully")))
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<RefreshTokenResponse>>), ApiError> {
    let refresh_token = refresh_token_from(&headers, &jar)
        .ok_or_else(|| service_error_to_http(ServiceError::Unauthenticated))?;

    let access_token = state
        .auth
        .refresh(&refresh_token)
        .map_err(service_error_to_http)?;

    let ttl = state.auth.tokens().access_ttl();
    let jar = jar.add(state.cookies.token_cookie(ACCESS_COOKIE, access_token, ttl));

    Ok((
        jar,
        Json(ApiResponse::success(
            RefreshTokenResponse {
                expires_in: ttl.as_secs(),
            },
            "Token refreshed successfully",
        )),
    ))
}

/// Report whether the presented access token is valid
#[axum::debug_handler]
pub async fn validate_token(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Json<ApiResponse<TokenStatus>>, ApiError> {
    let access_token = access_token_from(&headers, &jar)
        .ok_or_else(|| service_error_to_http(ServiceError::Unauthenticated))?;

    let user_id = state
        .auth
        .tokens()
        .validate_access_token(&access_token)
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(
        TokenStatus {
            valid: true,
            user_id,
        },
        "Token is valid",
    )))
}

/// Revoke the presented access token and clear its cookie
#[axum::debug_handler]
pub async fn revoke_token(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>), ApiError> {
    let access_token = access_token_from(&headers, &jar)
        .ok_or_else(|| service_error_to_http(ServiceError::Unauthenticated))?;

    state
        .auth
        .tokens()
        .revoke(&access_token)
        .map_err(service_error_to_http)?;

    let jar = state.cookies.clear(jar, ACCESS_COOKIE);
    Ok((jar, Json(ApiResponse::message("Token revoked successfully"))))
}
