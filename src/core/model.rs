//! Data model: users, posts and token claims
//!
//! Users and posts are owned by the storage backend; this crate only reads
//! them and rewrites a user's favorites list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Provider tag carried by accounts created with a username and password
pub const LOCAL_PROVIDER: &str = "local";

/// Opaque entity identifier
///
/// Serialized as a string. Deserializes from either a JSON string or a JSON
/// integer, since clients send numeric ids as often as string ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) if s.is_empty() => {
                Err(serde::de::Error::custom("identifier must not be empty"))
            }
            RawId::Text(s) => Ok(Self(s)),
            RawId::Signed(n) => Ok(Self(n.to_string())),
            RawId::Unsigned(n) => Ok(Self(n.to_string())),
        }
    }
}

/// A published (or draft) post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create an unpublished post with empty body fields
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            text: String::new(),
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Mark the post as published now
    pub fn published(mut self) -> Self {
        self.published_at = Some(Utc::now());
        self
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// Get a searchable text field by name
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "description" => Some(&self.description),
            "text" | "body" => Some(&self.text),
            _ => None,
        }
    }
}

/// A user account
///
/// `password` holds a bcrypt hash, or `None` for accounts created through a
/// third-party provider.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub blocked: bool,
    /// Ids of favorite posts, in the order they were added
    #[serde(default)]
    pub favorites_posts: Vec<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a confirmed local account from an already-hashed password
    pub fn new_local(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            username: username.into(),
            email: email.into(),
            provider: LOCAL_PROVIDER.to_string(),
            password: Some(password_hash.into()),
            confirmed: true,
            blocked: false,
            favorites_posts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an account owned by a third-party provider (no password)
    pub fn new_external(
        provider: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::generate(),
            username: username.into(),
            email: email.into(),
            provider: provider.into(),
            password: None,
            confirmed: true,
            blocked: false,
            favorites_posts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    pub fn with_blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    /// Project the user for output, dropping private fields
    pub fn sanitize(&self) -> SanitizedUser {
        SanitizedUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            provider: self.provider.clone(),
            confirmed: self.confirmed,
            blocked: self.blocked,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("provider", &self.provider)
            .field("confirmed", &self.confirmed)
            .field("blocked", &self.blocked)
            .field("favorites", &self.favorites_posts.len())
            .finish_non_exhaustive()
    }
}

/// User representation safe to return to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedUser {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub provider: String,
    pub confirmed: bool,
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of both access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id
    pub id: EntityId,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
    /// Unique token id, so two tokens minted in the same second differ
    pub jti: String,
}
