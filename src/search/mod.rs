//! Fuzzy search over configured content types
//!
//! Each configured key is scored on its own, the key weight is added and
//! the best key wins. Hits under the threshold are dropped, the rest are
//! ranked best first and cut to the configured limit.

pub mod handlers;
pub mod score;
pub mod transliterate;

use crate::config::SearchContentType;
use crate::core::model::Post;

pub use score::fuzzy_score;
pub use transliterate::{has_cyrillic, to_latin};

/// A ranked search result
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub post: Post,
    pub score: i64,
}

/// Rank `posts` against `query` using the settings of `index`
pub fn search_posts(index: &SearchContentType, posts: Vec<Post>, query: &str) -> Vec<SearchHit> {
    let latin_query = index.transliterate.then(|| to_latin(query));

    let mut hits: Vec<SearchHit> = posts
        .into_iter()
        .filter(|post| !index.published_only || post.is_published())
        .filter_map(|post| {
            let score = score_post(index, &post, query, latin_query.as_deref())?;
            (score >= index.threshold).then_some(SearchHit { post, score })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.post.id.as_str().cmp(b.post.id.as_str()))
    });
    hits.truncate(index.limit);
    hits
}

fn score_post(
    index: &SearchContentType,
    post: &Post,
    query: &str,
    latin_query: Option<&str>,
) -> Option<i64> {
    index
        .keys
        .iter()
        .filter_map(|key| {
            let text: String = post
                .field(&key.name)?
                .chars()
                .take(index.character_limit)
                .collect();

            let mut best = fuzzy_score(query, &text);
            if let Some(latin_query) = latin_query
                && (has_cyrillic(query) || has_cyrillic(&text))
            {
                best = best.max(fuzzy_score(latin_query, &to_latin(&text)));
            }
            best.map(|score| score + key.weight)
        })
        .max()
}
