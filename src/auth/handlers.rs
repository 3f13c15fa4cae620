//! HTTP handlers for the login callback and refresh-token redemption
//!
//! Login runs every account check (provider enabled, credentials, email
//! confirmation, blocked flag) before a single token is signed.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::auth::password::{verify_password, verify_without_hash};
use crate::auth::tokens::TokenPair;
use crate::core::error::{ApiError, AuthError, FieldIssue};
use crate::core::model::{LOCAL_PROVIDER, SanitizedUser, User};
use crate::core::service::grant_key;
use crate::server::state::AppState;

/// Message shared by every credential failure so accounts cannot be probed
pub const INVALID_CREDENTIALS: &str = "Invalid identifier or password";
pub const PROVIDER_DISABLED: &str = "This provider is disabled";
pub const EMAIL_NOT_CONFIRMED: &str = "Your account email is not confirmed";
pub const ACCOUNT_BLOCKED: &str = "Your account has been blocked by an administrator";

/// Request body for the local login callback
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        required(message = "identifier is a required field"),
        length(min = 1, message = "identifier is a required field")
    )]
    pub identifier: Option<String>,

    #[validate(
        required(message = "password is a required field"),
        length(min = 1, message = "password is a required field")
    )]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Validate the body and return `(identifier, password)`
    pub fn into_credentials(self) -> Result<(String, String), ApiError> {
        if let Err(errors) = self.validate() {
            let mut issues: Vec<FieldIssue> = errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |err| {
                        let message = err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid", field));
                        FieldIssue::new(field.to_string(), message)
                    })
                })
                .collect();
            issues.sort_by(|a, b| a.path.cmp(&b.path));
            return Err(ApiError::from_issues(issues));
        }

        match (self.identifier, self.password) {
            (Some(identifier), Some(password)) => Ok((identifier, password)),
            _ => Err(ApiError::validation("identifier and password are required")),
        }
    }
}

/// Successful login response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub status: String,
    pub jwt: String,
    pub user: SanitizedUser,
    pub refresh_token: String,
}

/// Request body for refresh-token redemption
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Local login callback
///
/// POST /auth/local
pub async fn local_callback(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    ensure_provider_enabled(&state, LOCAL_PROVIDER).await?;

    let Json(request) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    local_login(&state, request).await
}

/// Third-party provider callback
///
/// GET|POST /auth/{provider}/callback
pub async fn provider_callback(
    State(state): State<AppState>,
    provider: Result<Path<String>, PathRejection>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Path(provider) = provider.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let Query(query) = query.map_err(|rejection| ApiError::validation(rejection.body_text()))?;

    ensure_provider_enabled(&state, &provider).await?;

    if provider == LOCAL_PROVIDER {
        return local_login(&state, LoginRequest::default()).await;
    }

    let user = state
        .providers
        .connect(&provider, &query)
        .await
        .map_err(|err| {
            tracing::warn!(provider = %provider, error = %err, "provider exchange failed");
            ApiError::application(err.to_string())
        })?;

    respond_authenticated(&state, user).await
}

/// Redeem a refresh token for a new token pair
///
/// POST /token/refresh
///
/// Every failure is reported as a bad request.
pub async fn refresh_token(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let claims = state
        .tokens
        .verify_refresh(request.refresh_token.as_deref())
        .map_err(|err| {
            if err != AuthError::Missing {
                tracing::warn!(error = %err, "rejected refresh token");
            }
            ApiError::bad_request(err.to_string())
        })?;

    let user = state
        .users
        .get(&claims.id)
        .await
        .map_err(|err| ApiError::storage(err).into_bad_request())?
        .ok_or_else(|| ApiError::bad_request(INVALID_CREDENTIALS))?;

    ensure_account_active(&state, &user)
        .await
        .map_err(ApiError::into_bad_request)?;

    let pair = state
        .tokens
        .issue_pair(&user.id)
        .map_err(|err| ApiError::internal(err).into_bad_request())?;

    Ok(Json(pair))
}

async fn local_login(state: &AppState, request: LoginRequest) -> Result<Json<LoginResponse>, ApiError> {
    let (identifier, password) = request.into_credentials()?;

    let user = state
        .users
        .find_local(&identifier)
        .await
        .map_err(ApiError::storage)?;

    // Exactly one bcrypt check runs whether or not the account exists
    let matches = password_matches(user.as_ref(), &password);
    let user = match user {
        Some(user) if matches => user,
        _ => {
            tracing::warn!("local login rejected");
            return Err(ApiError::validation(INVALID_CREDENTIALS));
        }
    };

    respond_authenticated(state, user).await
}

fn password_matches(user: Option<&User>, password: &str) -> bool {
    // Provider-only accounts have no password and can never log in locally
    match user.and_then(|user| user.password.as_deref()) {
        Some(hash) => verify_password(password, hash),
        None => verify_without_hash(password),
    }
}

async fn ensure_provider_enabled(state: &AppState, provider: &str) -> Result<(), ApiError> {
    let grant = state
        .settings
        .grant(grant_key(provider))
        .await
        .map_err(ApiError::storage)?;

    match grant {
        Some(grant) if grant.enabled => Ok(()),
        _ => Err(ApiError::application(PROVIDER_DISABLED)),
    }
}

async fn ensure_account_active(state: &AppState, user: &User) -> Result<(), ApiError> {
    let advanced = state.settings.advanced().await.map_err(ApiError::storage)?;

    if advanced.email_confirmation && !user.confirmed {
        return Err(ApiError::application(EMAIL_NOT_CONFIRMED));
    }
    if user.blocked {
        return Err(ApiError::application(ACCOUNT_BLOCKED));
    }
    Ok(())
}

async fn respond_authenticated(state: &AppState, user: User) -> Result<Json<LoginResponse>, ApiError> {
    ensure_account_active(state, &user).await?;

    let pair = state.tokens.issue_pair(&user.id).map_err(ApiError::internal)?;
    tracing::info!(user_id = %user.id, provider = %user.provider, "user authenticated");

    Ok(Json(LoginResponse {
        status: "Authenticated".to_string(),
        jwt: pair.jwt,
        user: user.sanitize(),
        refresh_token: pair.refresh_token,
    }))
}
