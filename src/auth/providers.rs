//! Third-party sign-in providers

use crate::core::model::User;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;

/// Exchanges a provider callback for a local user account
///
/// `query` holds the callback query string (typically `access_token`).
/// Implementations find or create the matching user.
#[async_trait]
pub trait ProviderConnector: Send + Sync {
    async fn connect(&self, provider: &str, query: &HashMap<String, String>) -> Result<User>;
}

/// Connector used when no third-party provider is wired in
///
/// Every exchange fails.
pub struct NoProviderConnector;

#[async_trait]
impl ProviderConnector for NoProviderConnector {
    async fn connect(&self, provider: &str, query: &HashMap<String, String>) -> Result<User> {
        if !query.contains_key("access_token") {
            return Err(anyhow!("No access_token."));
        }
        Err(anyhow!("Unknown provider: {}", provider))
    }
}
