//! ServerBuilder for fluent API to build HTTP servers

use super::router::build_router;
use super::state::AppState;
use crate::auth::providers::{NoProviderConnector, ProviderConnector};
use crate::auth::tokens::TokenIssuer;
use crate::config::AppConfig;
use crate::core::service::{PostService, SettingsStore, UserService};
use crate::storage::{InMemoryPostService, InMemorySettingsStore, InMemoryUserService};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the API server
///
/// Every backend is optional and falls back to its in-memory version; the
/// configuration is required.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(AppConfig::load(Some("config.yaml"))?)
///     .with_user_service(InMemoryUserService::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: Option<AppConfig>,
    users: Option<Arc<dyn UserService>>,
    posts: Option<Arc<dyn PostService>>,
    settings: Option<Arc<dyn SettingsStore>>,
    providers: Option<Arc<dyn ProviderConnector>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: None,
            users: None,
            posts: None,
            settings: None,
            providers: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the application configuration (required)
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the user service
    pub fn with_user_service(mut self, service: impl UserService + 'static) -> Self {
        self.users = Some(Arc::new(service));
        self
    }

    /// Set the post service
    pub fn with_post_service(mut self, service: impl PostService + 'static) -> Self {
        self.posts = Some(Arc::new(service));
        self
    }

    /// Set the settings store
    pub fn with_settings_store(mut self, store: impl SettingsStore + 'static) -> Self {
        self.settings = Some(Arc::new(store));
        self
    }

    /// Set the connector used for third-party provider callbacks
    pub fn with_provider_connector(mut self, connector: impl ProviderConnector + 'static) -> Self {
        self.providers = Some(Arc::new(connector));
        self
    }

    /// Add custom routes, merged at the root next to the API
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Validate the configuration and assemble the shared state
    pub fn build_state(&mut self) -> Result<AppState> {
        let config = self
            .config
            .take()
            .ok_or_else(|| anyhow::anyhow!("AppConfig is required. Call .with_config()"))?;
        config.validate()?;

        let tokens = TokenIssuer::new(&config.auth)?;

        Ok(AppState {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            users: self
                .users
                .take()
                .unwrap_or_else(|| Arc::new(InMemoryUserService::new())),
            posts: self
                .posts
                .take()
                .unwrap_or_else(|| Arc::new(InMemoryPostService::new())),
            settings: self
                .settings
                .take()
                .unwrap_or_else(|| Arc::new(InMemorySettingsStore::new())),
            providers: self
                .providers
                .take()
                .unwrap_or_else(|| Arc::new(NoProviderConnector)),
        })
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;
        let custom_routes = std::mem::take(&mut self.custom_routes);
        Ok(build_router(state, custom_routes))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
