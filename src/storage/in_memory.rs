//! In-memory implementations of the service traits for testing and development

use crate::core::model::{EntityId, LOCAL_PROVIDER, Post, User};
use crate::core::service::{
    AdvancedSettings, GrantSettings, PostService, SettingsStore, UserService, grant_key,
};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory user service
///
/// Uses RwLock for thread-safe access. Emails are stored lowercased.
#[derive(Clone, Default)]
pub struct InMemoryUserService {
    users: Arc<RwLock<HashMap<EntityId, User>>>,
}

impl InMemoryUserService {
    /// Create a new in-memory user service
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn create(&self, mut user: User) -> Result<User> {
        let mut users = self
            .users
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if users.contains_key(&user.id) {
            return Err(anyhow!("User '{}' already exists", user.id));
        }

        user.email = user.email.to_lowercase();
        users.insert(user.id.clone(), user.clone());

        Ok(user)
    }

    async fn get(&self, id: &EntityId) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(users.get(id).cloned())
    }

    async fn find_local(&self, identifier: &str) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let email = identifier.to_lowercase();

        // Lowest id wins when an email and a username collide
        Ok(users
            .values()
            .filter(|user| {
                user.provider == LOCAL_PROVIDER
                    && (user.email == email || user.username == identifier)
            })
            .min_by(|a, b| a.id.cmp(&b.id))
            .cloned())
    }

    async fn update(&self, mut user: User) -> Result<User> {
        let mut users = self
            .users
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if !users.contains_key(&user.id) {
            return Err(anyhow!("User not found"));
        }

        user.email = user.email.to_lowercase();
        user.updated_at = Utc::now();
        users.insert(user.id.clone(), user.clone());

        Ok(user)
    }

    async fn favorites(&self, id: &EntityId) -> Result<Option<Vec<EntityId>>> {
        let users = self
            .users
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(users.get(id).map(|user| user.favorites_posts.clone()))
    }

    async fn set_favorites(
        &self,
        id: &EntityId,
        favorites: Vec<EntityId>,
    ) -> Result<Vec<EntityId>> {
        let mut users = self
            .users
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let user = users.get_mut(id).ok_or_else(|| anyhow!("User not found"))?;
        user.favorites_posts = favorites;
        user.updated_at = Utc::now();

        Ok(user.favorites_posts.clone())
    }
}

/// In-memory post service
#[derive(Clone, Default)]
pub struct InMemoryPostService {
    posts: Arc<RwLock<HashMap<EntityId, Post>>>,
}

impl InMemoryPostService {
    /// Create a new in-memory post service
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostService for InMemoryPostService {
    async fn create(&self, post: Post) -> Result<Post> {
        let mut posts = self
            .posts
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        posts.insert(post.id.clone(), post.clone());

        Ok(post)
    }

    async fn get(&self, id: &EntityId) -> Result<Option<Post>> {
        let posts = self
            .posts
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(posts.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let posts = self
            .posts
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut all: Vec<Post> = posts.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(all)
    }
}

/// In-memory settings store
///
/// Starts with the local (`email`) provider enabled and email confirmation
/// off.
#[derive(Clone)]
pub struct InMemorySettingsStore {
    grants: Arc<RwLock<HashMap<String, GrantSettings>>>,
    advanced: Arc<RwLock<AdvancedSettings>>,
}

impl InMemorySettingsStore {
    /// Create a store with the default settings
    pub fn new() -> Self {
        let mut grants = HashMap::new();
        grants.insert(grant_key(LOCAL_PROVIDER).to_string(), GrantSettings::enabled());

        Self {
            grants: Arc::new(RwLock::new(grants)),
            advanced: Arc::new(RwLock::new(AdvancedSettings::default())),
        }
    }
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn grant(&self, key: &str) -> Result<Option<GrantSettings>> {
        let grants = self
            .grants
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(grants.get(key).cloned())
    }

    async fn set_grant(&self, key: &str, settings: GrantSettings) -> Result<()> {
        let mut grants = self
            .grants
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        grants.insert(key.to_string(), settings);

        Ok(())
    }

    async fn advanced(&self) -> Result<AdvancedSettings> {
        let advanced = self
            .advanced
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(advanced.clone())
    }

    async fn set_advanced(&self, settings: AdvancedSettings) -> Result<()> {
        let mut advanced = self
            .advanced
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        *advanced = settings;

        Ok(())
    }
}
