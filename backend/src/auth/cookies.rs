//! Token cookies.
//!
//! Tokens reach browsers only as `HttpOnly`, `SameSite=Strict` cookies whose
//! `Max-Age` matches the token lifetime. `Secure` is on unless disabled for
//! plain-HTTP local development.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::time::Duration;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
}

impl CookieSettings {
    pub fn token_cookie(&self, name: &'static str, token: String, ttl: Duration) -> Cookie<'static> {
        Cookie::build((name, token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .max_age(time::Duration::seconds(ttl.as_secs() as i64))
            .build()
    }

    /// Adds a removal cookie for `name` with the path it was set on.
    pub fn clear(&self, jar: CookieJar, name: &'static str) -> CookieJar {
        jar.remove(Cookie::build(name).path("/"))
    }
}

/// Extract the token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Access token from the bearer header, falling back to the cookie.
pub fn access_token_from(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_value(jar, ACCESS_COOKIE))
}

/// Refresh token from its cookie, falling back to the bearer header.
pub fn refresh_token_from(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    cookie_value(jar, REFRESH_COOKIE).or_else(|| bearer_token(headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::http::header::COOKIE;

    #[test]
    fn test_token_cookie_attributes() {
        let settings = CookieSettings { secure: true };
        let cookie = settings.token_cookie(ACCESS_COOKIE, "abc".to_string(), Duration::from_secs(10_800));
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("accessToken=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("SameSite=Strict"));
        assert!(rendered.contains("Max-Age=10800"));
        assert!(rendered.contains("Path=/"));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_token_sources_prefer_the_right_place() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(
            COOKIE,
            HeaderValue::from_static("accessToken=access-cookie; refreshToken=refresh-cookie"),
        );
        let jar = CookieJar::from_headers(&headers);

        assert_eq!(access_token_from(&headers, &jar).as_deref(), Some("from-header"));
        assert_eq!(refresh_token_from(&headers, &jar).as_deref(), Some("refresh-cookie"));

        let no_header = HeaderMap::new();
        assert_eq!(access_token_from(&no_header, &jar).as_deref(), Some("access-cookie"));
    }
}
