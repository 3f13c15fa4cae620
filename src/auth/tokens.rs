//! Access and refresh token issuance
//!
//! Both token kinds carry the same [`Claims`] but are signed with separate
//! secrets, so a refresh token can never be presented as an access token and
//! vice versa. Nothing is stored server-side: a refresh token stays valid
//! until it expires, even after it has been rotated.

use crate::config::AuthConfig;
use crate::core::error::{AuthError, ConfigError};
use crate::core::model::{Claims, EntityId};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A freshly issued access/refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub jwt: String,
    pub refresh_token: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
}

impl SigningKeys {
    fn new(secret: &str, ttl: std::time::Duration, field: &str) -> Result<Self, ConfigError> {
        let ttl = TimeDelta::from_std(ttl).map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            value: format!("{:?}", ttl),
            message: e.to_string(),
        })?;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    fn sign(&self, user_id: &EntityId, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Signing("token expiry out of range".to_string()))?;

        let claims = Claims {
            id: user_id.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, validation: &Validation) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })
    }
}

/// Signs and verifies access and refresh tokens
pub struct TokenIssuer {
    access: SigningKeys,
    refresh: SigningKeys,
    validation: Validation,
}

impl TokenIssuer {
    /// Build an issuer from the auth configuration
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            access: SigningKeys::new(
                &config.jwt_secret,
                config.jwt_expires_in,
                "auth.jwt_expires_in",
            )?,
            refresh: SigningKeys::new(
                &config.refresh_secret,
                config.refresh_expires_in,
                "auth.refresh_expires_in",
            )?,
            validation,
        })
    }

    pub fn issue_access(&self, user_id: &EntityId) -> Result<String, AuthError> {
        self.issue_access_at(user_id, Utc::now())
    }

    /// Issue an access token as if it had been signed at `issued_at`
    pub fn issue_access_at(
        &self,
        user_id: &EntityId,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        self.access.sign(user_id, issued_at)
    }

    pub fn issue_refresh(&self, user_id: &EntityId) -> Result<String, AuthError> {
        self.issue_refresh_at(user_id, Utc::now())
    }

    /// Issue a refresh token as if it had been signed at `issued_at`
    pub fn issue_refresh_at(
        &self,
        user_id: &EntityId,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        self.refresh.sign(user_id, issued_at)
    }

    /// Issue a new access token and a new refresh token
    pub fn issue_pair(&self, user_id: &EntityId) -> Result<TokenPair, AuthError> {
        let pair = TokenPair {
            jwt: self.issue_access(user_id)?,
            refresh_token: self.issue_refresh(user_id)?,
        };
        tracing::debug!(user_id = %user_id, "issued token pair");
        Ok(pair)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Missing);
        }
        self.access.verify(token, &self.validation)
    }

    /// Verify a refresh token; `None` or an empty string is `Missing`
    pub fn verify_refresh(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        match token {
            Some(token) if !token.trim().is_empty() => {
                self.refresh.verify(token, &self.validation)
            }
            _ => Err(AuthError::Missing),
        }
    }

    pub fn access_ttl(&self) -> TimeDelta {
        self.access.ttl
    }

    pub fn refresh_ttl(&self) -> TimeDelta {
        self.refresh.ttl
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}
