//! Access and refresh token signing and verification.
//!
//! Tokens are HS256 JWTs. Access and refresh tokens use distinct secrets, so a
//! token of one kind never verifies as the other. `iat` and `exp` are added on
//! signing and stripped on verification; expiry is checked with zero leeway.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

/// Identity carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    payload: TokenPayload,
    iat: i64,
    exp: i64,
}

/// Freshly issued access/refresh pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid: {0}")]
    Invalid(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Signs and verifies tokens with one secret and lifetime.
struct TokenKind {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKind {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    fn sign(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("token lifetime is out of range".to_string()))?;
        let claims = Claims {
            payload: payload.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.payload)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

/// Token service for the access guard and the refresh endpoint.
pub struct TokenService {
    access: TokenKind,
    refresh: TokenKind,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        access_ttl: Duration,
        refresh_secret: &str,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access: TokenKind::new(access_secret, access_ttl),
            refresh: TokenKind::new(refresh_secret, refresh_ttl),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_access_secret,
            config.jwt_access_expires_in.as_chrono(),
            &config.jwt_refresh_secret,
            config.jwt_refresh_expires_in.as_chrono(),
        )
    }

    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn sign_access(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        self.access.sign(payload)
    }

    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn sign_refresh(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        self.refresh.sign(payload)
    }

    /// Verifies an access token and returns its payload.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Expired`] if `exp` has passed
    /// - [`TokenError::Invalid`] for a bad signature, wrong secret or malformed token
    pub fn verify_access(&self, token: &str) -> Result<TokenPayload, TokenError> {
        self.access.verify(token)
    }

    /// Verifies a refresh token and returns its payload.
    ///
    /// # Errors
    ///
    /// Same as [`Self::verify_access`], checked against the refresh secret.
    pub fn verify_refresh(&self, token: &str) -> Result<TokenPayload, TokenError> {
        self.refresh.verify(token)
    }

    /// Signs both tokens for `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if either token fails to encode.
    pub fn issue_pair(&self, payload: &TokenPayload) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign_access(payload)?,
            refresh_token: self.sign_refresh(payload)?,
            expires_in: self.access.ttl.num_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            "access-secret",
            Duration::hours(1),
            "refresh-secret",
            Duration::days(30),
        )
    }

    fn payload() -> TokenPayload {
        TokenPayload {
            sub: "user-1".to_string(),
            email: Some("user@example.com".to_string()),
        }
    }

    #[test]
    fn test_out_of_range_lifetime_fails_to_sign() {
        let svc = TokenService::new(
            "access-secret",
            Duration::milliseconds(i64::MAX),
            "refresh-secret",
            Duration::days(30),
        );

        assert!(matches!(svc.sign_access(&payload()), Err(TokenError::Signing(_))));
        assert!(svc.sign_refresh(&payload()).is_ok());
    }

    #[test]
    fn test_access_roundtrip_strips_claims() {
        let svc = service();
        let token = svc.sign_access(&payload()).unwrap();
        assert_eq!(svc.verify_access(&token).unwrap(), payload());
    }

    #[test]
    fn test_refresh_roundtrip_without_email() {
        let svc = service();
        let p = TokenPayload {
            sub: "42".to_string(),
            email: None,
        };
        let token = svc.sign_refresh(&p).unwrap();
        assert_eq!(svc.verify_refresh(&token).unwrap(), p);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let svc = TokenService::new(
            "access-secret",
            Duration::seconds(-30),
            "refresh-secret",
            Duration::seconds(-30),
        );
        let token = svc.sign_access(&payload()).unwrap();
        assert_eq!(svc.verify_access(&token), Err(TokenError::Expired));

        let token = svc.sign_refresh(&payload()).unwrap();
        assert_eq!(svc.verify_refresh(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_kinds_do_not_cross_verify() {
        let svc = service();
        let access = svc.sign_access(&payload()).unwrap();
        let refresh = svc.sign_refresh(&payload()).unwrap();

        assert!(matches!(
            svc.verify_refresh(&access),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(
            svc.verify_access(&refresh),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_tampered_and_garbage_tokens() {
        let svc = service();
        let mut token = svc.sign_access(&payload()).unwrap();
        token.push('x');
        assert!(matches!(svc.verify_access(&token), Err(TokenError::Invalid(_))));
        assert!(matches!(
            svc.verify_access("not-a-jwt"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_issue_pair_reports_access_lifetime() {
        let pair = service().issue_pair(&payload()).unwrap();
        assert_eq!(pair.expires_in, 3600);
        assert_ne!(pair.access_token, pair.refresh_token);

        let json = serde_json::to_value(&pair).unwrap();
        assert!(json.get("accessToken").is_some());
        assert!(json.get("refreshToken").is_some());
    }
}
