// ABOUTME: JWT authentication for chat API access
// ABOUTME: Validates HS256 bearer tokens and extracts the calling user's identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! Bearer-token authentication.
//!
//! Every chat route requires an `Authorization: Bearer <jwt>` header signed
//! with the shared `AUTH_JWT_SECRET`. The token's `sub` claim is the user id
//! that scopes all conversation and task access.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier (subject)
    pub sub: String,
    /// User email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued-at timestamp (seconds since epoch)
    pub iat: i64,
    /// Expiry timestamp (seconds since epoch)
    pub exp: i64,
}

/// Detailed JWT validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired,
    /// Token signature or claims are invalid
    TokenInvalid,
    /// Token could not be parsed at all
    TokenMalformed,
}

impl JwtValidationError {
    const fn message(&self) -> &'static str {
        match self {
            Self::TokenExpired => "token has expired",
            Self::TokenInvalid => "token signature is invalid",
            Self::TokenMalformed => "token is malformed",
        }
    }
}

impl From<JwtValidationError> for AppError {
    fn from(err: JwtValidationError) -> Self {
        match err {
            JwtValidationError::TokenExpired => Self::auth_expired(),
            JwtValidationError::TokenInvalid | JwtValidationError::TokenMalformed => {
                Self::auth_invalid(err.message())
            }
        }
    }
}

/// Clock skew tolerated when checking issued-at
const IAT_LEEWAY_SECS: i64 = 60;

/// Verifies and mints HS256 access tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthManager {
    /// Create an auth manager from the shared signing secret
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Validate a raw token and return its claims
    ///
    /// # Errors
    /// Returns a [`JwtValidationError`] describing why the token was rejected.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    JwtValidationError::TokenExpired
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => JwtValidationError::TokenMalformed,
                _ => JwtValidationError::TokenInvalid,
            })?;

        // The subject scopes every storage query; an empty one must never
        // authenticate.
        if claims.sub.trim().is_empty() {
            return Err(JwtValidationError::TokenInvalid);
        }
        if claims.iat > Utc::now().timestamp() + IAT_LEEWAY_SECS {
            return Err(JwtValidationError::TokenInvalid);
        }

        Ok(claims)
    }

    /// Mint a token for the given user, valid for `ttl_secs` seconds.
    ///
    /// Used by integration tests and local tooling; production tokens come
    /// from the identity service that shares the secret.
    ///
    /// # Errors
    /// Returns [`AppError`] if token encoding fails.
    pub fn generate_token(
        &self,
        user_id: &str,
        email: Option<&str>,
        ttl_secs: i64,
    ) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_owned(),
            email: email.map(str::to_owned),
            iat: now,
            exp: now + ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("failed to encode token: {e}")))
    }

    /// Authenticate an `Authorization` header value and return the claims
    ///
    /// # Errors
    /// Returns 401-class [`AppError`] when the header is missing, not a
    /// bearer credential, or carries an invalid token.
    pub fn authenticate(&self, auth_header: Option<&str>) -> AppResult<Claims> {
        let header = auth_header.ok_or_else(AppError::auth_required)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("authorization header must use bearer scheme"))?;
        Ok(self.validate_token(token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn manager() -> AuthManager {
        AuthManager::new("test-secret-for-auth-tests")
    }

    #[test]
    fn test_round_trip_token() {
        let auth = manager();
        let token = auth
            .generate_token("user-1", Some("u@example.com"), 3600)
            .unwrap();
        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_deref(), Some("u@example.com"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = manager();
        let token = auth.generate_token("user-1", None, -120).unwrap();
        assert_eq!(
            auth.validate_token(&token),
            Err(JwtValidationError::TokenExpired)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let auth = manager();
        let token = auth.generate_token("user-1", None, 3600).unwrap();
        let other = AuthManager::new("a-different-secret");
        assert_eq!(
            other.validate_token(&token),
            Err(JwtValidationError::TokenInvalid)
        );
    }

    fn encode_claims(auth: &AuthManager, claims: &Claims) -> String {
        encode(&Header::new(Algorithm::HS256), claims, &auth.encoding_key).unwrap()
    }

    #[test]
    fn test_empty_subject_rejected() {
        let auth = manager();
        let now = Utc::now().timestamp();
        for sub in ["", "   "] {
            let token = encode_claims(
                &auth,
                &Claims {
                    sub: sub.to_owned(),
                    email: None,
                    iat: now,
                    exp: now + 3600,
                },
            );
            assert_eq!(
                auth.validate_token(&token),
                Err(JwtValidationError::TokenInvalid)
            );
        }
    }

    #[test]
    fn test_future_issued_at_rejected() {
        let auth = manager();
        let now = Utc::now().timestamp();
        let token = encode_claims(
            &auth,
            &Claims {
                sub: "user-1".to_owned(),
                email: None,
                iat: now + 3600,
                exp: now + 7200,
            },
        );
        assert_eq!(
            auth.validate_token(&token),
            Err(JwtValidationError::TokenInvalid)
        );

        // Small skew stays within the leeway
        let token = encode_claims(
            &auth,
            &Claims {
                sub: "user-1".to_owned(),
                email: None,
                iat: now + 5,
                exp: now + 3600,
            },
        );
        assert!(auth.validate_token(&token).is_ok());
    }

    #[test]
    fn test_garbage_token_malformed() {
        let auth = manager();
        assert_eq!(
            auth.validate_token("not-a-jwt"),
            Err(JwtValidationError::TokenMalformed)
        );
    }

    #[test]
    fn test_authenticate_header_parsing() {
        let auth = manager();
        let token = auth.generate_token("user-1", None, 3600).unwrap();

        let claims = auth
            .authenticate(Some(&format!("Bearer {token}")))
            .unwrap();
        assert_eq!(claims.sub, "user-1");

        let missing = auth.authenticate(None).unwrap_err();
        assert_eq!(missing.code, ErrorCode::AuthRequired);

        let basic = auth.authenticate(Some("Basic abc123")).unwrap_err();
        assert_eq!(basic.code, ErrorCode::AuthInvalid);
    }
}
