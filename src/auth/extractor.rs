//! Authenticated user extraction from `Authorization: Bearer` headers

use crate::core::error::ApiError;
use crate::core::model::User;
use crate::server::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

const INVALID_CREDENTIALS: &str = "Missing or invalid credentials";

/// The user behind a valid access token
///
/// Rejections:
/// - no `Authorization` header: 403 `Forbidden`
/// - malformed, expired or forged token, unknown or blocked user: 401
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Pull the bearer token out of the headers
///
/// Returns `None` when the header is absent; `Some("")` when present but not
/// a usable bearer credential.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?;
    let value = value.to_str().unwrap_or_default().trim();

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => Some(token.trim()),
        _ => Some(""),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| ApiError::Forbidden("Forbidden".to_string()))?;

        let claims = state.tokens.verify_access(token).map_err(|err| {
            tracing::debug!(error = %err, "rejected access token");
            ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
        })?;

        let user = state
            .users
            .get(&claims.id)
            .await
            .map_err(ApiError::storage)?
            .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if user.blocked {
            tracing::warn!(user_id = %user.id, "blocked user presented a valid access token");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(AuthUser(user))
    }
}
