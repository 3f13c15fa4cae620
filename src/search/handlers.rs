//! HTTP handler for fuzzy search

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::core::error::{ApiError, FieldIssue};
use crate::core::model::Post;
use crate::search::search_posts;
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

/// Search every configured content type
///
/// GET /fuzzy-search/search?query=...
///
/// Responds with one list per content type, keyed by its plural name.
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<BTreeMap<String, Vec<Post>>>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .ok_or_else(|| {
            ApiError::from_issues(vec![FieldIssue::new("query", "query is a required field")])
        })?;

    let posts = state.posts.list().await.map_err(ApiError::storage)?;

    let mut results = BTreeMap::new();
    for index in &state.config.search.content_types {
        let hits = search_posts(index, posts.clone(), query);
        tracing::debug!(content_type = %index.uid, query = %query, hits = hits.len(), "fuzzy search");
        results.insert(
            index.plural_name(),
            hits.into_iter().map(|hit| hit.post).collect(),
        );
    }

    Ok(Json(results))
}
