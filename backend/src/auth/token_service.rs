//! Issuance, validation, refresh and revocation of bearer tokens.
//!
//! Built on `TokenCodec`. Access tokens live for the access TTL (3 hours by
//! default) and refresh tokens for the refresh TTL (7 days by default). Every
//! token carries a random `jti`, which is what `revoke` records.
//!
//! Callers only ever see `ServiceError::Unauthenticated` for a bad token; the
//! precise reason (malformed, expired, wrong kind, revoked) is logged here.

use crate::auth::revocation::RevocationList;
use crate::config::TokenConfig;
use crate::errors::{ServiceError, ServiceResult};
use crate::utils::jwt::{Claims, TokenCodec, TokenKind};
use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

pub struct TokenService {
    codec: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
    revoked: RevocationList,
}

impl TokenService {
    /// Create a token service from explicit configuration.
    ///
    /// # Errors
    /// Returns `ServiceError::SigningFailure` for an empty secret or a TTL
    /// that is zero or does not fit in a timestamp.
    pub fn new(config: &TokenConfig) -> ServiceResult<Self> {
        let codec = TokenCodec::new(&config.secret)?;
        let access_ttl = to_chrono(config.access_ttl)?;
        let refresh_ttl = to_chrono(config.refresh_ttl)?;

        Ok(TokenService {
            codec,
            access_ttl,
            refresh_ttl,
            revoked: RevocationList::new(),
        })
    }

    pub fn access_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.access_ttl.num_seconds() as u64)
    }

    pub fn refresh_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_ttl.num_seconds() as u64)
    }

    /// Mint an access token for `subject`.
    pub fn issue_access_token(&self, subject: &str) -> ServiceResult<String> {
        let claims = Claims::new(subject, TokenKind::Access, Utc::now(), self.access_ttl);
        self.codec.encode(&claims)
    }

    /// Mint a refresh token for `subject` with a fresh `jti`.
    pub fn issue_refresh_token(&self, subject: &str) -> ServiceResult<String> {
        let claims = Claims::new(subject, TokenKind::Refresh, Utc::now(), self.refresh_ttl);
        self.codec.encode(&claims)
    }

    /// Validate an access token and return its subject.
    pub fn validate_access_token(&self, token: &str) -> ServiceResult<String> {
        let claims = self.decode_as(token, TokenKind::Access)?;
        Ok(claims.sub)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The subject must parse as a user id; the refresh token itself is left
    /// valid for further refreshes until it expires or is revoked.
    pub fn refresh(&self, refresh_token: &str) -> ServiceResult<String> {
        let claims = self.decode_as(refresh_token, TokenKind::Refresh)?;

        if Uuid::parse_str(&claims.sub).is_err() {
            debug!(subject = %claims.sub, "refresh token subject is not a user id");
            return Err(ServiceError::Unauthenticated);
        }

        let access_token = self.issue_access_token(&claims.sub)?;
        debug!(user_id = %claims.sub, "issued access token from refresh token");
        Ok(access_token)
    }

    /// Revoke a token of either kind. Takes effect before this returns.
    pub fn revoke(&self, token: &str) -> ServiceResult<()> {
        let claims = self.codec.decode(token).map_err(|e| {
            debug!(error = %e, "refusing to revoke undecodable token");
            ServiceError::Unauthenticated
        })?;

        self.revoked.revoke(&claims.jti, claims.exp, Utc::now().timestamp());
        info!(
            user_id = %claims.sub,
            kind = %claims.kind,
            revoked = self.revoked.len(),
            "token revoked"
        );
        Ok(())
    }

    fn decode_as(&self, token: &str, expected: TokenKind) -> ServiceResult<Claims> {
        let claims = self.codec.decode(token).map_err(|e| {
            debug!(error = %e, expected = %expected, "token rejected");
            ServiceError::Unauthenticated
        })?;

        if claims.kind != expected {
            debug!(found = %claims.kind, expected = %expected, "token kind mismatch");
            return Err(ServiceError::Unauthenticated);
        }

        if self.revoked.is_revoked(&claims.jti) {
            debug!(user_id = %claims.sub, "revoked token presented");
            return Err(ServiceError::Unauthenticated);
        }

        Ok(claims)
    }
}

fn to_chrono(ttl: std::time::Duration) -> ServiceResult<Duration> {
    let ttl = Duration::from_std(ttl)
        .map_err(|e| ServiceError::signing_failure(format!("token lifetime out of range: {e}")))?;
    if ttl <= Duration::zero() {
        return Err(ServiceError::signing_failure("token lifetime must be positive"));
    }
    Ok(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn config(secret: &str) -> TokenConfig {
        TokenConfig {
            secret: secret.to_string(),
            access_ttl: StdDuration::from_secs(3 * 60 * 60),
            refresh_ttl: StdDuration::from_secs(7 * 24 * 60 * 60),
        }
    }

    fn service() -> TokenService {
        TokenService::new(&config("test-secret-key-12345")).unwrap()
    }

    fn subject() -> String {
        Uuid::now_v7().to_string()
    }

    fn decode(token: &str) -> Claims {
        TokenCodec::new("test-secret-key-12345").unwrap().decode(token).unwrap()
    }

    #[test]
    fn test_issued_access_token_validates_to_subject() {
        let service = service();
        let user_id = subject();

        let token = service.issue_access_token(&user_id).unwrap();
        assert_eq!(service.validate_access_token(&token).unwrap(), user_id);
    }

    #[test]
    fn test_ttl_policy() {
        let service = service();
        let access = decode(&service.issue_access_token(&subject()).unwrap());
        let refresh = decode(&service.issue_refresh_token(&subject()).unwrap());

        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.exp - access.iat, 3 * 60 * 60);
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_refresh_tokens_have_unique_jti() {
        let service = service();
        let user_id = subject();
        let a = decode(&service.issue_refresh_token(&user_id).unwrap());
        let b = decode(&service.issue_refresh_token(&user_id).unwrap());
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let service = service();
        let refresh = service.issue_refresh_token(&subject()).unwrap();

        assert!(matches!(
            service.validate_access_token(&refresh),
            Err(ServiceError::Unauthenticated)
        ));
    }

    #[test]
    fn test_access_token_cannot_refresh() {
        let service = service();
        let access = service.issue_access_token(&subject()).unwrap();

        assert!(matches!(service.refresh(&access), Err(ServiceError::Unauthenticated)));
    }

    #[test]
    fn test_refresh_mints_access_token_for_same_subject() {
        let service = service();
        let user_id = subject();
        let refresh = service.issue_refresh_token(&user_id).unwrap();
        let refresh_claims = decode(&refresh);

        let access = service.refresh(&refresh).unwrap();
        let access_claims = decode(&access);

        assert_eq!(access_claims.sub, user_id);
        assert_eq!(access_claims.kind, TokenKind::Access);
        assert!(access_claims.exp > refresh_claims.iat);
        assert_eq!(service.validate_access_token(&access).unwrap(), user_id);
    }

    #[test]
    fn test_refresh_requires_user_id_subject() {
        let service = service();
        let refresh = service.issue_refresh_token("not-a-uuid").unwrap();

        assert!(matches!(service.refresh(&refresh), Err(ServiceError::Unauthenticated)));
    }

    #[test]
    fn test_expired_token_is_unauthenticated() {
        let service = service();
        let codec = TokenCodec::new("test-secret-key-12345").unwrap();
        let stale = Claims::new(
            &subject(),
            TokenKind::Access,
            Utc::now() - Duration::hours(4),
            Duration::hours(3),
        );
        let token = codec.encode(&stale).unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(ServiceError::Unauthenticated)
        ));
    }

    #[test]
    fn test_foreign_secret_is_unauthenticated() {
        let other = TokenService::new(&config("another-secret")).unwrap();
        let token = other.issue_access_token(&subject()).unwrap();

        assert!(matches!(
            service().validate_access_token(&token),
            Err(ServiceError::Unauthenticated)
        ));
    }

    #[test]
    fn test_revoked_access_token_is_rejected() {
        let service = service();
        let user_id = subject();
        let token = service.issue_access_token(&user_id).unwrap();
        let untouched = service.issue_access_token(&user_id).unwrap();

        service.revoke(&token).unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(ServiceError::Unauthenticated)
        ));
        assert_eq!(service.validate_access_token(&untouched).unwrap(), user_id);
    }

    #[test]
    fn test_revoked_refresh_token_cannot_refresh() {
        let service = service();
        let refresh = service.issue_refresh_token(&subject()).unwrap();

        service.revoke(&refresh).unwrap();
        assert!(matches!(service.refresh(&refresh), Err(ServiceError::Unauthenticated)));
    }

    #[test]
    fn test_revoking_garbage_is_unauthenticated() {
        assert!(matches!(
            service().revoke("invalid.token.here"),
            Err(ServiceError::Unauthenticated)
        ));
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let mut config = config("test-secret-key-12345");
        config.access_ttl = StdDuration::ZERO;
        assert!(matches!(
            TokenService::new(&config),
            Err(ServiceError::SigningFailure { .. })
        ));
    }
}
