//! Shared test harness for HTTP-level tests
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod harness;
//! use harness::*;
//! ```

#![allow(dead_code)]

use axum::http::HeaderValue;
use axum_test::TestServer;
use depo::auth::password::hash_password_with_cost;
use depo::prelude::*;
use serde_json::{Value, json};

pub const ACCESS_SECRET: &str = "test-access-secret";
pub const REFRESH_SECRET: &str = "test-refresh-secret";
pub const PASSWORD: &str = "correct horse battery";

/// Lowest bcrypt cost, keeps the suite fast
const TEST_HASH_COST: u32 = 4;

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = ACCESS_SECRET.to_string();
    config.auth.refresh_secret = REFRESH_SECRET.to_string();
    config
}

/// A running app plus handles on its in-memory backends
pub struct TestApp {
    pub server: TestServer,
    pub users: InMemoryUserService,
    pub posts: InMemoryPostService,
    pub settings: InMemorySettingsStore,
    pub tokens: TokenIssuer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Self {
        let users = InMemoryUserService::new();
        let posts = InMemoryPostService::new();
        let settings = InMemorySettingsStore::new();
        let tokens = TokenIssuer::new(&config.auth).expect("Failed to build token issuer");

        let app = ServerBuilder::new()
            .with_config(config)
            .with_user_service(users.clone())
            .with_post_service(posts.clone())
            .with_settings_store(settings.clone())
            .build()
            .expect("Failed to build app");

        let server = TestServer::try_new(app).expect("Failed to create test server");

        Self {
            server,
            users,
            posts,
            settings,
            tokens,
        }
    }

    /// Store a confirmed local user whose password is [`PASSWORD`]
    pub async fn add_local_user(&self, id: &str, username: &str, email: &str) -> User {
        let hash = hash_password_with_cost(PASSWORD, TEST_HASH_COST).expect("Failed to hash");
        let user = User::new_local(username, email, hash).with_id(id);
        self.users.create(user).await.expect("Failed to create user")
    }

    pub async fn add_post(&self, post: Post) -> Post {
        self.posts.create(post).await.expect("Failed to create post")
    }

    pub async fn require_email_confirmation(&self) {
        self.settings
            .set_advanced(AdvancedSettings {
                email_confirmation: true,
            })
            .await
            .expect("Failed to update settings");
    }

    pub async fn set_blocked(&self, id: &str, blocked: bool) {
        let user = self
            .users
            .get(&EntityId::new(id))
            .await
            .expect("Failed to read user")
            .expect("User should exist");
        self.users
            .update(user.with_blocked(blocked))
            .await
            .expect("Failed to update user");
    }

    /// Log in through the local callback and return the response body
    pub async fn login(&self, identifier: &str, password: &str) -> (u16, Value) {
        let response = self
            .server
            .post("/api/auth/local")
            .json(&json!({ "identifier": identifier, "password": password }))
            .await;
        (response.status_code().as_u16(), response.json())
    }

    /// Access token for a user without going through login
    pub fn access_token(&self, id: &str) -> String {
        self.tokens
            .issue_access(&EntityId::new(id))
            .expect("Failed to sign access token")
    }
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).expect("Invalid header value")
}

/// `error.message` of an error envelope
pub fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}

/// Post ids of a favorites or search response
pub fn post_ids(body: &Value) -> Vec<String> {
    body.as_array()
        .map(|posts| {
            posts
                .iter()
                .filter_map(|post| post["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
