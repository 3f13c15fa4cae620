//! # Depo API
//!
//! HTTP backend for a blog-style content site: login with refresh tokens,
//! per-user favorite posts and fuzzy post search.
//!
//! ## Features
//!
//! - **Login callback**: local and provider sign-in returning an access token and a refresh token
//! - **Token refresh**: trade a refresh token for a new pair
//! - **Favorites**: add and remove posts on the authenticated user's list
//! - **Fuzzy search**: weighted, transliteration-aware search over published posts
//! - **Configuration**: YAML file plus environment overrides
//! - **Pluggable storage**: every backend is an injected trait object
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use depo::prelude::*;
//!
//! let config = AppConfig::load(Some("config.yaml"))?;
//!
//! ServerBuilder::new()
//!     .with_config(config.clone())
//!     .with_user_service(InMemoryUserService::new())
//!     .serve(&config.server.address())
//!     .await?;
//! ```

pub mod auth;
pub mod config;
pub mod core;
pub mod favorites;
pub mod search;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{ApiError, AuthError, ConfigError, FieldIssue},
        model::{Claims, EntityId, LOCAL_PROVIDER, Post, SanitizedUser, User},
        service::{AdvancedSettings, GrantSettings, PostService, SettingsStore, UserService},
    };

    // === Auth ===
    pub use crate::auth::{
        AuthUser, NoProviderConnector, ProviderConnector, TokenIssuer, TokenPair, hash_password,
        verify_password,
    };

    // === Search ===
    pub use crate::search::{SearchHit, fuzzy_score, search_posts, to_latin};

    // === Storage ===
    pub use crate::storage::{InMemoryPostService, InMemorySettingsStore, InMemoryUserService};

    // === Config ===
    pub use crate::config::{
        ApiConfig, AppConfig, AuthConfig, EmailConfig, SearchConfig, SearchContentType,
        SearchKey, ServerConfig, SmtpConfig,
    };

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
}
