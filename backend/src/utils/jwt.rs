//! JWT encoding and decoding.
//!
//! `TokenCodec` only knows how to sign claims and how to check a signature and
//! expiry. It does not care whether a token is an access or a refresh token;
//! that policy belongs to `auth::token_service`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ServiceError, ServiceResult};

/// Which flow a token was minted for. Serialized as the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims carried inside every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Token kind
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

impl Claims {
    /// Build claims issued at `issued_at` and expiring `ttl` later, with a
    /// random `jti`.
    pub fn new(subject: &str, kind: TokenKind, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let exp = issued_at + ttl;
        Claims {
            sub: subject.to_string(),
            kind,
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// HS256 signer/verifier bound to one secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec for `secret`.
    ///
    /// # Errors
    /// Returns `ServiceError::SigningFailure` for an empty secret.
    pub fn new(secret: &str) -> ServiceResult<Self> {
        if secret.is_empty() {
            return Err(ServiceError::signing_failure("signing secret is empty"));
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Ok(TokenCodec {
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Sign `claims` into a compact JWT.
    pub fn encode(&self, claims: &Claims) -> ServiceResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ServiceError::signing_failure(format!("Token generation failed: {e}")))
    }

    /// Verify the signature, then the expiry, and return the claims.
    ///
    /// # Errors
    /// - `ServiceError::ExpiredToken` when the signature is good but `exp` passed
    /// - `ServiceError::MalformedToken` for anything else
    pub fn decode(&self, token: &str) -> ServiceResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ServiceError::ExpiredToken,
                other => ServiceError::malformed_token(format!("{other:?}")),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(secret).unwrap()
    }

    fn claims(kind: TokenKind, issued_at: DateTime<Utc>, ttl: Duration) -> Claims {
        Claims::new("0190c2a4-user", kind, issued_at, ttl)
    }

    #[test]
    fn test_encode_and_decode() {
        let codec = codec("test-secret-key-12345");
        let original = claims(TokenKind::Access, Utc::now(), Duration::hours(3));

        let token = codec.encode(&original).unwrap();
        let decoded = codec.decode(&token).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.sub, "0190c2a4-user");
        assert_eq!(decoded.exp - decoded.iat, 3 * 60 * 60);
    }

    #[test]
    fn test_kind_is_serialized_as_type_claim() {
        let value = serde_json::to_value(claims(TokenKind::Refresh, Utc::now(), Duration::days(7))).unwrap();
        assert_eq!(value["type"], "refresh");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_codec_accepts_either_kind() {
        let codec = codec("test-secret-key-12345");
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            let token = codec.encode(&claims(kind, Utc::now(), Duration::hours(1))).unwrap();
            assert_eq!(codec.decode(&token).unwrap().kind, kind);
        }
    }

    #[test]
    fn test_expired_token_is_expired_not_malformed() {
        let codec = codec("test-secret-key-12345");
        let stale = claims(TokenKind::Access, Utc::now() - Duration::hours(4), Duration::hours(3));
        assert!(stale.exp < Utc::now().timestamp());

        let token = codec.encode(&stale).unwrap();
        assert!(matches!(codec.decode(&token), Err(ServiceError::ExpiredToken)));
    }

    #[test]
    fn test_different_secret_is_malformed() {
        let token = codec("secret1")
            .encode(&claims(TokenKind::Access, Utc::now(), Duration::hours(3)))
            .unwrap();

        let result = codec("secret2").decode(&token);
        assert!(matches!(result, Err(ServiceError::MalformedToken { .. })));
    }

    #[test]
    fn test_expired_token_with_wrong_secret_is_malformed() {
        let stale = claims(TokenKind::Access, Utc::now() - Duration::hours(4), Duration::hours(3));
        let token = codec("secret1").encode(&stale).unwrap();

        assert!(matches!(
            codec("secret2").decode(&token),
            Err(ServiceError::MalformedToken { .. })
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = codec("test-secret-key-12345");
        for input in ["", "invalid.token.here", "not a jwt"] {
            assert!(matches!(codec.decode(input), Err(ServiceError::MalformedToken { .. })));
        }
    }

    #[test]
    fn test_tampered_payload_is_malformed() {
        let codec = codec("test-secret-key-12345");
        let token = codec
            .encode(&claims(TokenKind::Access, Utc::now(), Duration::hours(3)))
            .unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = codec
            .encode(&Claims::new("someone-else", TokenKind::Access, Utc::now(), Duration::hours(3)))
            .unwrap();
        parts[1] = forged.split('.').nth(1).unwrap().to_string();

        assert!(matches!(
            codec.decode(&parts.join(".")),
            Err(ServiceError::MalformedToken { .. })
        ));
    }

    #[test]
    fn test_empty_secret_is_signing_failure() {
        assert!(matches!(
            TokenCodec::new(""),
            Err(ServiceError::SigningFailure { .. })
        ));
    }

    #[test]
    fn test_each_claim_set_gets_a_fresh_jti() {
        let now = Utc::now();
        let a = claims(TokenKind::Refresh, now, Duration::days(7));
        let b = claims(TokenKind::Refresh, now, Duration::days(7));
        assert_ne!(a.jti, b.jti);
    }
}
