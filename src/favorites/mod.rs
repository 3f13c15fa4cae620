//! Favorite posts of the authenticated user
//!
//! Both mutations are read-modify-write of the whole list: concurrent
//! updates by the same user are last-write-wins. The list holds post ids and
//! is resolved against the post store every time it is returned.

pub mod handlers;

use crate::core::model::{EntityId, Post};
use crate::core::service::PostService;
use anyhow::Result;

/// Append a post id; duplicates are kept
pub fn append_favorite(mut favorites: Vec<EntityId>, id: EntityId) -> Vec<EntityId> {
    favorites.push(id);
    favorites
}

/// Drop every entry equal to `id`
pub fn remove_favorite(mut favorites: Vec<EntityId>, id: &EntityId) -> Vec<EntityId> {
    favorites.retain(|entry| entry != id);
    favorites
}

/// Load the current posts behind `ids`, keeping order and duplicates
///
/// Ids whose post no longer exists are skipped.
pub async fn resolve_favorites(posts: &dyn PostService, ids: &[EntityId]) -> Result<Vec<Post>> {
    let mut resolved = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(post) = posts.get(id).await? {
            resolved.push(post);
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryPostService;

    fn ids(values: &[&str]) -> Vec<EntityId> {
        values.iter().map(|v| EntityId::new(*v)).collect()
    }

    #[test]
    fn test_append_keeps_duplicates() {
        let favorites = append_favorite(Vec::new(), EntityId::new("P7"));
        assert_eq!(favorites, ids(&["P7"]));

        let favorites = append_favorite(favorites, EntityId::new("P7"));
        assert_eq!(favorites, ids(&["P7", "P7"]));
    }

    #[test]
    fn test_remove_excludes_matching_id() {
        let favorites = remove_favorite(ids(&["P1", "P2", "P3"]), &EntityId::new("P2"));
        assert_eq!(favorites, ids(&["P1", "P3"]));
    }

    #[test]
    fn test_remove_drops_all_duplicates() {
        let favorites = remove_favorite(ids(&["P7", "P1", "P7"]), &EntityId::new("P7"));
        assert_eq!(favorites, ids(&["P1"]));
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let favorites = remove_favorite(ids(&["P1"]), &EntityId::new("P9"));
        assert_eq!(favorites, ids(&["P1"]));
    }

    #[tokio::test]
    async fn test_resolve_reads_current_posts() {
        let posts = InMemoryPostService::new();
        posts.create(Post::new("P1", "Ownership")).await.unwrap();
        posts.create(Post::new("P7", "Borrowing")).await.unwrap();

        let favorites = ids(&["P7", "P1", "P7"]);
        let resolved = resolve_favorites(&posts, &favorites).await.unwrap();
        let titles: Vec<&str> = resolved.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Borrowing", "Ownership", "Borrowing"]);

        posts.create(Post::new("P1", "Ownership, revised")).await.unwrap();
        let resolved = resolve_favorites(&posts, &favorites).await.unwrap();
        assert_eq!(resolved[1].title, "Ownership, revised");
    }

    #[tokio::test]
    async fn test_resolve_skips_missing_posts() {
        let posts = InMemoryPostService::new();
        posts.create(Post::new("P1", "Ownership")).await.unwrap();

        let resolved = resolve_favorites(&posts, &ids(&["P404", "P1"])).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id.as_str(), "P1");
    }
}
