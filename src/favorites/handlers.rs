//! HTTP handlers for favorites mutations
//!
//! The `{user}` path segment is accepted for URL compatibility, but the
//! subject is always the user behind the access token.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::core::error::ApiError;
use crate::core::model::{EntityId, Post};
use crate::favorites::{append_favorite, remove_favorite, resolve_favorites};
use crate::server::state::AppState;

/// Request body for adding a favorite: `{"data": <post id>}`
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub data: EntityId,
}

/// Request body for removing a favorite: `{"id": <post id>}`
#[derive(Debug, Deserialize)]
pub struct RemoveFavoriteRequest {
    pub id: EntityId,
}

/// Append a post to the current user's favorites
///
/// PUT /users/{user}/addToFav
pub async fn add_to_favorites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path_user: Result<Path<String>, PathRejection>,
    body: Result<Json<AddFavoriteRequest>, JsonRejection>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let Path(path_user) =
        path_user.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let Json(request) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;

    let favorites = load_favorites(&state, &user.id).await?;

    let post = state
        .posts
        .get(&request.data)
        .await
        .map_err(ApiError::storage)?
        .ok_or_else(|| ApiError::not_found(format!("Post '{}' not found", request.data)))?;

    let favorites = append_favorite(favorites, post.id);
    let stored = state
        .users
        .set_favorites(&user.id, favorites)
        .await
        .map_err(ApiError::storage)?;
    let stored = resolve_favorites(state.posts.as_ref(), &stored)
        .await
        .map_err(ApiError::storage)?;

    tracing::debug!(
        user_id = %user.id,
        path_user = %path_user,
        post_id = %request.data,
        count = stored.len(),
        "added favorite"
    );

    Ok(Json(stored))
}

/// Remove a post from the current user's favorites
///
/// PUT /users/{user}/delFav
pub async fn remove_from_favorites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path_user: Result<Path<String>, PathRejection>,
    body: Result<Json<RemoveFavoriteRequest>, JsonRejection>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let Path(path_user) =
        path_user.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let Json(request) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;

    let favorites = load_favorites(&state, &user.id).await?;
    let favorites = remove_favorite(favorites, &request.id);

    let stored = state
        .users
        .set_favorites(&user.id, favorites)
        .await
        .map_err(ApiError::storage)?;
    let stored = resolve_favorites(state.posts.as_ref(), &stored)
        .await
        .map_err(ApiError::storage)?;

    tracing::debug!(
        user_id = %user.id,
        path_user = %path_user,
        post_id = %request.id,
        count = stored.len(),
        "removed favorite"
    );

    Ok(Json(stored))
}

async fn load_favorites(state: &AppState, user_id: &EntityId) -> Result<Vec<EntityId>, ApiError> {
    state
        .users
        .favorites(user_id)
        .await
        .map_err(ApiError::storage)?
        .ok_or_else(|| ApiError::not_found("User not found"))
}
