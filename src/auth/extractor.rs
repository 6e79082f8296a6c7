// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(caller): Auth) -> impl IntoResponse {
//!     // caller is a verified Caller
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, Caller};
use crate::state::AppState;
use crate::storage::UserRepository;

/// Extractor for authenticated callers.
///
/// Verifies the bearer token from the Authorization header, then resolves
/// the token's subject against the user store. A token whose subject no
/// longer exists is rejected, so deleting a user invalidates their
/// outstanding tokens immediately.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(
///     Auth(caller): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<UserView>, ApiError> {
///     // caller.id is the authenticated user's id
/// }
/// ```
pub struct Auth(pub Caller);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Extract Bearer token
        let jwt = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = state.tokens.verify(jwt)?;

        // Resolve the subject against the store
        let user = UserRepository::new(&state.db)
            .find_by_id(claims.sub)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .ok_or(AuthError::UnknownUser)?;

        Ok(Auth(Caller {
            id: user.id,
            email: user.email,
            role: user.role,
        }))
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if no valid authentication is present, instead of
/// rejecting. Used by endpoints that serve both guests and registered
/// users.
pub struct OptionalAuth(pub Option<Caller>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Try to authenticate, but don't fail if it doesn't work
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(caller)) => Ok(OptionalAuth(Some(caller))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_user, test_state};
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp_dir) = test_state();
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_header() {
        let (state, _temp_dir) = test_state();
        let mut parts = parts_with_header(Some("Basic dXNlcjpwYXNz"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_resolves_caller() {
        let (state, _temp_dir) = test_state();
        let user = create_user(&state, "alice@example.com");
        let token = state.tokens.issue(user.id).unwrap();
        let mut parts = parts_with_header(Some(&token.token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        let Auth(caller) = result.expect("extractor should succeed");
        assert_eq!(caller.id, user.id);
        assert_eq!(caller.email, "alice@example.com");
    }

    #[tokio::test]
    async fn auth_extractor_rejects_unknown_subject() {
        let (state, _temp_dir) = test_state();
        // Valid signature, but the subject was never registered.
        let token = state.tokens.issue(999).unwrap();
        let mut parts = parts_with_header(Some(&token.token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::UnknownUser)));
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_token() {
        let (state, _temp_dir) = test_state();
        let mut parts = parts_with_header(None);

        let result = OptionalAuth::from_request_parts(&mut parts, &state).await;
        assert!(result.unwrap().0.is_none());
    }

    #[tokio::test]
    async fn optional_auth_returns_caller_with_token() {
        let (state, _temp_dir) = test_state();
        let user = create_user(&state, "bob@example.com");
        let token = state.tokens.issue(user.id).unwrap();
        let mut parts = parts_with_header(Some(&token.token));

        let result = OptionalAuth::from_request_parts(&mut parts, &state).await;
        let caller = result.unwrap().0.expect("caller should be present");
        assert_eq!(caller.id, user.id);
    }
}
