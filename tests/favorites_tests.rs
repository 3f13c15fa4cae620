//! End-to-end tests for the favorites mutations

mod harness;

use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use depo::prelude::*;
use harness::*;
use serde_json::{Value, json};

async fn app_with_posts() -> TestApp {
    let app = TestApp::spawn().await;
    app.add_local_user("U1", "alice", "alice@example.com").await;
    app.add_post(Post::new("P1", "Ownership").published()).await;
    app.add_post(Post::new("P7", "Borrowing").published()).await;
    app
}

async fn add(app: &TestApp, token: &str, body: Value) -> axum_test::TestResponse {
    app.server
        .put("/api/users/U1/addToFav")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&body)
        .await
}

async fn remove(app: &TestApp, token: &str, body: Value) -> axum_test::TestResponse {
    app.server
        .put("/api/users/U1/delFav")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&body)
        .await
}

// =============================================================================
// Add Favorite Tests
// =============================================================================

mod add_tests {
    use super::*;

    #[tokio::test]
    async fn test_adding_the_same_post_twice_keeps_both() {
        let app = app_with_posts().await;
        let token = app.access_token("U1");

        let response = add(&app, &token, json!({ "data": "P7" })).await;
        response.assert_status_ok();
        assert_eq!(post_ids(&response.json()), vec!["P7"]);

        let response = add(&app, &token, json!({ "data": "P7" })).await;
        response.assert_status_ok();
        assert_eq!(post_ids(&response.json()), vec!["P7", "P7"]);
    }

    #[tokio::test]
    async fn test_added_posts_are_returned_in_full_and_persisted() {
        let app = app_with_posts().await;
        let token = app.access_token("U1");

        add(&app, &token, json!({ "data": "P1" })).await;
        let response = add(&app, &token, json!({ "data": "P7" })).await;

        let body: Value = response.json();
        assert_eq!(body[0]["title"], "Ownership");
        assert_eq!(body[1]["title"], "Borrowing");

        let stored = app.users.favorites(&EntityId::new("U1")).await.unwrap().unwrap();
        let ids: Vec<&str> = stored.iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P7"]);
    }

    #[tokio::test]
    async fn test_list_reflects_later_post_edits() {
        let app = app_with_posts().await;
        let token = app.access_token("U1");
        add(&app, &token, json!({ "data": "P1" })).await;

        app.add_post(Post::new("P1", "Ownership, revised").published())
            .await;

        let response = add(&app, &token, json!({ "data": "P7" })).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body[0]["title"], "Ownership, revised");
        assert_eq!(body[1]["title"], "Borrowing");
    }

    #[tokio::test]
    async fn test_numeric_post_ids_are_accepted() {
        let app = TestApp::spawn().await;
        app.add_local_user("U1", "alice", "alice@example.com").await;
        app.add_post(Post::new("42", "Numbers").published()).await;
        let token = app.access_token("U1");

        let response = add(&app, &token, json!({ "data": 42 })).await;
        response.assert_status_ok();
        assert_eq!(post_ids(&response.json()), vec!["42"]);
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let app = app_with_posts().await;
        let token = app.access_token("U1");

        let response = add(&app, &token, json!({ "data": "P404" })).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let stored = app.users.favorites(&EntityId::new("U1")).await.unwrap().unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_missing_post_id_is_a_validation_error() {
        let app = app_with_posts().await;
        let token = app.access_token("U1");

        let response = add(&app, &token, json!({ "id": "P1" })).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["error"]["name"], "ValidationError");
    }

    #[tokio::test]
    async fn test_undecodable_path_user_uses_the_error_envelope() {
        let app = app_with_posts().await;
        let token = app.access_token("U1");

        for route in ["/api/users/%FF/addToFav", "/api/users/%FF/delFav"] {
            let response = app
                .server
                .put(route)
                .add_header(AUTHORIZATION, bearer(&token))
                .json(&json!({ "data": "P1", "id": "P1" }))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);

            let body: Value = response.json();
            assert!(body["data"].is_null());
            assert_eq!(body["error"]["name"], "ValidationError");
        }

        let favorites = app.users.favorites(&EntityId::new("U1")).await.unwrap().unwrap();
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn test_path_user_does_not_select_the_subject() {
        let app = app_with_posts().await;
        app.add_local_user("U2", "bob", "bob@example.com").await;
        let token = app.access_token("U1");

        let response = app
            .server
            .put("/api/users/U2/addToFav")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "data": "P1" }))
            .await;
        response.assert_status_ok();

        let alice = app.users.favorites(&EntityId::new("U1")).await.unwrap().unwrap();
        let bob = app.users.favorites(&EntityId::new("U2")).await.unwrap().unwrap();
        assert_eq!(alice.len(), 1);
        assert!(bob.is_empty());
    }
}

// =============================================================================
// Remove Favorite Tests
// =============================================================================

mod remove_tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_excludes_the_matching_post() {
        let app = app_with_posts().await;
        let token = app.access_token("U1");
        add(&app, &token, json!({ "data": "P1" })).await;
        add(&app, &token, json!({ "data": "P7" })).await;

        let response = remove(&app, &token, json!({ "id": "P7" })).await;
        response.assert_status_ok();
        assert_eq!(post_ids(&response.json()), vec!["P1"]);

        let stored = app.users.favorites(&EntityId::new("U1")).await.unwrap().unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_drops_every_duplicate() {
        let app = app_with_posts().await;
        let token = app.access_token("U1");
        add(&app, &token, json!({ "data": "P7" })).await;
        add(&app, &token, json!({ "data": "P1" })).await;
        add(&app, &token, json!({ "data": "P7" })).await;

        let response = remove(&app, &token, json!({ "id": "P7" })).await;
        assert_eq!(post_ids(&response.json()), vec!["P1"]);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_leaves_the_list() {
        let app = app_with_posts().await;
        let token = app.access_token("U1");
        add(&app, &token, json!({ "data": "P1" })).await;

        let response = remove(&app, &token, json!({ "id": "P404" })).await;
        response.assert_status_ok();
        assert_eq!(post_ids(&response.json()), vec!["P1"]);
    }
}

// =============================================================================
// Authentication Tests
// =============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_authorization_is_forbidden() {
        let app = app_with_posts().await;

        let response = app
            .server
            .put("/api/users/U1/addToFav")
            .json(&json!({ "data": "P1" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_tokens_are_unauthorized() {
        let app = app_with_posts().await;
        let refresh = app.tokens.issue_refresh(&EntityId::new("U1")).unwrap();

        for token in ["garbage", refresh.as_str()] {
            let response = add(&app, token, json!({ "data": "P1" })).await;
            response.assert_status(StatusCode::UNAUTHORIZED);
        }

        let response = app
            .server
            .put("/api/users/U1/delFav")
            .add_header(AUTHORIZATION, axum::http::HeaderValue::from_static("Basic abc"))
            .json(&json!({ "id": "P1" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_unknown_user_is_unauthorized() {
        let app = app_with_posts().await;
        let token = app.access_token("ghost");

        let response = add(&app, &token, json!({ "data": "P1" })).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_blocked_user_is_unauthorized() {
        let app = app_with_posts().await;
        let token = app.access_token("U1");
        app.set_blocked("U1", true).await;

        let response = remove(&app, &token, json!({ "id": "P1" })).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_token_works_for_favorites() {
        let app = app_with_posts().await;
        let (_, login) = app.login("alice", PASSWORD).await;
        let token = login["jwt"].as_str().unwrap();

        let response = add(&app, token, json!({ "data": "P1" })).await;
        response.assert_status_ok();
    }
}
