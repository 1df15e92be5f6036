use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo_types::User;

/// The auth gate. A handler taking `AuthUser` only runs for requests whose
/// bearer token both verifies and equals the token currently stored on the
/// user row. A signed, unexpired token that was since replaced by a newer
/// login or cleared by logout fails the second check, which is what makes
/// revocation work for stateless JWTs.
pub struct AuthUser(pub User);

/// Pulls the raw token out of an `Authorization` header value.
pub(crate) fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Session binding: the presented token must be exactly the one currently
/// stored on the user. Stored NULL (logged out) never matches, and a token
/// replaced by a newer login no longer matches even while its signature is
/// still valid.
pub(crate) fn is_current_session(stored: Option<&str>, presented: &str) -> bool {
    stored == Some(presented)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // No header: reject before the verifier is ever consulted.
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(ApiError::not_authorized)?;

        let token = bearer_token(header).ok_or_else(ApiError::not_authorized)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::not_authorized()
        })?;

        // A store failure here is a 500, not a 401.
        let user = User::find_by_id(&state.db, claims.sub)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(ApiError::not_authorized)?;

        if !is_current_session(user.token.as_deref(), token) {
            warn!(user_id = %user.id, "token is not the current session");
            return Err(ApiError::not_authorized());
        }

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts_with_auth(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/users/current");
        if let Some(value) = header {
            builder = builder.header(axum::http::header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn gate_rejects_missing_header() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn gate_rejects_non_bearer_scheme() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn gate_rejects_garbage_token_before_store_lookup() {
        // The fake state's pool is lazy and never connects; reaching the
        // store would turn this into a 500, so a 401 proves the request
        // died at signature verification.
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Bearer not.a.jwt"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bearer_token_strips_scheme() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc.def.ghi"), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn session_matches_only_the_stored_token() {
        assert!(is_current_session(Some("tok-1"), "tok-1"));
    }

    #[test]
    fn logged_out_user_matches_no_token() {
        // Logout stores NULL; even the token that was valid a moment ago
        // must no longer pass the gate.
        assert!(!is_current_session(None, "tok-1"));
    }

    #[test]
    fn second_login_invalidates_the_first_token() {
        // Login overwrites the single token slot; a request still bearing
        // the earlier, correctly signed token is rejected.
        assert!(is_current_session(Some("tok-2"), "tok-2"));
        assert!(!is_current_session(Some("tok-2"), "tok-1"));
    }
}
