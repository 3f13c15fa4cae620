//! Route table for the API

use crate::auth::handlers::{local_callback, provider_callback, refresh_token};
use crate::favorites::handlers::{add_to_favorites, remove_from_favorites};
use crate::search::handlers::search;
use crate::server::state::AppState;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the API routes
///
/// Mounted under the configured prefix:
/// - POST /auth/local - Local login, returns a token pair
/// - GET|POST /auth/{provider}/callback - Provider login
/// - POST /token/refresh - Redeem a refresh token
/// - PUT /users/{user}/addToFav - Append a favorite post
/// - PUT /users/{user}/delFav - Remove a favorite post
/// - GET /fuzzy-search/search - Fuzzy search over posts
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/local", post(local_callback))
        .route(
            "/auth/{provider}/callback",
            get(provider_callback).post(provider_callback),
        )
        .route("/token/refresh", post(refresh_token))
        .route("/users/{user}/addToFav", put(add_to_favorites))
        .route("/users/{user}/delFav", put(remove_from_favorites))
        .route("/fuzzy-search/search", get(search))
        .with_state(state)
}

/// Build the full application router
///
/// Health checks stay at the root; API routes are nested under the prefix
/// and custom routes are merged as given.
pub fn build_router(state: AppState, custom_routes: Vec<Router>) -> Router {
    let prefix = state.config.api.prefix.clone();
    let api_routes = build_api_routes(state);

    let mut app = health_routes();
    app = if prefix.is_empty() {
        app.merge(api_routes)
    } else {
        app.nest(&prefix, api_routes)
    };

    for custom_router in custom_routes {
        app = app.merge(custom_router);
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "depo-api"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::builder::ServerBuilder;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    fn app(prefix: &str) -> Router {
        let mut config = crate::config::AppConfig::default();
        config.api.prefix = prefix.to_string();
        config.auth.jwt_secret = "access".to_string();
        config.auth.refresh_secret = "refresh".to_string();
        tokio_test::assert_ok!(ServerBuilder::new().with_config(config).build())
    }

    async fn status(app: Router, method: Method, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_health_is_outside_the_prefix() {
        assert_eq!(status(app("/api"), Method::GET, "/health").await, StatusCode::OK);
        assert_eq!(status(app("/api"), Method::GET, "/healthz").await, StatusCode::OK);
        assert_eq!(
            status(app("/api"), Method::GET, "/api/health").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_routes_are_nested_under_prefix() {
        // Reaching the handler proves the route exists; the empty body is rejected
        assert_eq!(
            status(app("/api"), Method::POST, "/api/token/refresh").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(app("/api"), Method::POST, "/token/refresh").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_empty_prefix_mounts_at_root() {
        assert_eq!(
            status(app(""), Method::POST, "/token/refresh").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_favorites_routes_only_accept_put() {
        assert_eq!(
            status(app("/api"), Method::PUT, "/api/users/1/addToFav").await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(app("/api"), Method::POST, "/api/users/1/delFav").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
