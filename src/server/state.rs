//! Application state shared across handlers

use crate::auth::providers::ProviderConnector;
use crate::auth::tokens::TokenIssuer;
use crate::config::AppConfig;
use crate::core::service::{PostService, SettingsStore, UserService};
use std::sync::Arc;

/// Everything a handler may touch, injected once at build time
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenIssuer>,
    pub users: Arc<dyn UserService>,
    pub posts: Arc<dyn PostService>,
    pub settings: Arc<dyn SettingsStore>,
    pub providers: Arc<dyn ProviderConnector>,
}
