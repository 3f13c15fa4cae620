//! Service traits for users, posts and runtime settings
//!
//! Handlers never reach for global state: every backend is injected into the
//! application state as one of these traits. The crate is agnostic to the
//! underlying storage mechanism.

use crate::core::model::{EntityId, Post, User};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Service trait for user accounts
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a new user
    async fn create(&self, user: User) -> Result<User>;

    /// Get a user by ID
    async fn get(&self, id: &EntityId) -> Result<Option<User>>;

    /// Find a local-provider user by email (case-insensitive) or username
    async fn find_local(&self, identifier: &str) -> Result<Option<User>>;

    /// Replace an existing user
    async fn update(&self, user: User) -> Result<User>;

    /// Get the post ids in a user's favorites list, `None` if the user does
    /// not exist
    ///
    /// Only ids are stored; the posts themselves are read through
    /// [`PostService`] whenever the list is returned.
    async fn favorites(&self, id: &EntityId) -> Result<Option<Vec<EntityId>>>;

    /// Overwrite a user's favorites list and return what was stored
    async fn set_favorites(
        &self,
        id: &EntityId,
        favorites: Vec<EntityId>,
    ) -> Result<Vec<EntityId>>;
}

/// Service trait for posts (read-mostly)
#[async_trait]
pub trait PostService: Send + Sync {
    /// Create a new post
    async fn create(&self, post: Post) -> Result<Post>;

    /// Get a post by ID
    async fn get(&self, id: &EntityId) -> Result<Option<Post>>;

    /// List all posts
    async fn list(&self) -> Result<Vec<Post>>;
}

/// Per-provider sign-in settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSettings {
    pub enabled: bool,
    /// Where the provider redirects after a successful exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
}

impl GrantSettings {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            callback: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            callback: None,
        }
    }
}

/// Account policy settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedSettings {
    /// Require `confirmed` before issuing tokens
    #[serde(default)]
    pub email_confirmation: bool,
}

/// Runtime settings store
///
/// Grant settings are keyed by provider; the local provider is stored under
/// [`grant_key`]`("local")`, i.e. `"email"`.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Get sign-in settings for a provider key
    async fn grant(&self, key: &str) -> Result<Option<GrantSettings>>;

    /// Set sign-in settings for a provider key
    async fn set_grant(&self, key: &str, settings: GrantSettings) -> Result<()>;

    /// Get account policy settings
    async fn advanced(&self) -> Result<AdvancedSettings>;

    /// Set account policy settings
    async fn set_advanced(&self, settings: AdvancedSettings) -> Result<()>;
}

/// Map a provider name to its grant settings key
pub fn grant_key(provider: &str) -> &str {
    if provider == crate::core::model::LOCAL_PROVIDER {
        "email"
    } else {
        provider
    }
}
