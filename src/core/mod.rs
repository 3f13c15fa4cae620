//! Core module containing the data model, service traits and error types

pub mod error;
pub mod model;
pub mod service;

pub use error::{ApiError, AuthError, ConfigError, FieldIssue};
pub use model::{Claims, EntityId, LOCAL_PROVIDER, Post, SanitizedUser, User};
pub use service::{AdvancedSettings, GrantSettings, PostService, SettingsStore, UserService};
