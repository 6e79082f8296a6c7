// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuing and verification.
//!
//! Tokens are RS256 JWTs with a minimal claim set: `sub` (user id),
//! `iat`, and `exp`. The signing keys are loaded once at startup and the
//! service is immutable afterwards; key rotation means restarting with
//! new key files.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Tokens are valid for one day.
pub const TOKEN_VALIDITY_SECS: i64 = 86_400;

/// Claims carried by an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// An issued token plus the human-readable validity advertised to clients.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Full header value, `Bearer ` prefix included.
    pub token: String,
    /// Advertised validity, e.g. `1d`.
    pub expires_in: &'static str,
}

/// RS256 token service built from an injected key pair.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Build the service from PEM-encoded RSA keys.
    pub fn new(private_key_pem: &[u8], public_key_pem: &[u8]) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem)
            .map_err(|e| AuthError::InternalError(format!("invalid private key: {e}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem)
            .map_err(|e| AuthError::InternalError(format!("invalid public key: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        // Expiry is exact; no clock leeway.
        validation.leeway = 0;
        validation.validate_aud = false;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Issue a token for the given user, valid from now.
    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    /// Issue a token with an explicit issue time. Used by tests to mint
    /// already-expired tokens.
    pub(crate) fn issue_at(&self, user_id: i64, iat: i64) -> Result<IssuedToken, AuthError> {
        let claims = Claims {
            sub: user_id,
            iat,
            exp: iat + TOKEN_VALIDITY_SECS,
        };
        let jwt = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token signing failed: {e}")))?;
        Ok(IssuedToken {
            token: format!("Bearer {jwt}"),
            expires_in: "1d",
        })
    }

    /// Verify a bare JWT (without the `Bearer ` prefix) and return its
    /// claims.
    pub fn verify(&self, jwt: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(jwt, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/keys/jwt_test.pem"));
    const PUBLIC_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/keys/jwt_test.pub.pem"));
    const OTHER_PRIVATE_PEM: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/keys/jwt_other.pem"));

    fn service() -> TokenService {
        TokenService::new(PRIVATE_PEM.as_bytes(), PUBLIC_PEM.as_bytes()).unwrap()
    }

    fn bare(token: &IssuedToken) -> &str {
        token.token.strip_prefix("Bearer ").unwrap()
    }

    #[test]
    fn issued_token_round_trips() {
        let service = service();
        let issued = service.issue(42).unwrap();

        assert!(issued.token.starts_with("Bearer "));
        assert_eq!(issued.expires_in, "1d");

        let claims = service.verify(bare(&issued)).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.exp, claims.iat + TOKEN_VALIDITY_SECS);
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = service();
        let issued = service
            .issue_at(42, Utc::now().timestamp() - 2 * TOKEN_VALIDITY_SECS)
            .unwrap();

        let result = service.verify(bare(&issued));
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let service = service();
        let other = TokenService::new(OTHER_PRIVATE_PEM.as_bytes(), PUBLIC_PEM.as_bytes()).unwrap();

        let issued = other.issue(42).unwrap();
        let result = service.verify(bare(&issued));
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let service = service();
        let result = service.verify("not-a-jwt");
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn invalid_key_material_is_an_internal_error() {
        let result = TokenService::new(b"nope", PUBLIC_PEM.as_bytes());
        assert!(matches!(result, Err(AuthError::InternalError(_))));
    }
}
