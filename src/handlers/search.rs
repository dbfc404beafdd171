// src/handlers/search.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{community::Community, flair::LinkFlair, post::Post},
    store::DocStore,
    tree::traverse,
};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// A search hit: the post enriched with its community name and flair text,
/// plus how many of its comments matched.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub post: Post,
    pub community_name: Option<String>,
    pub link_flair: Option<String>,
    pub matching_comments: usize,
}

/// Multi-word, case-insensitive search.
///
/// A post is a hit when any term appears in its title or content, or in any
/// comment reachable from it (a matching reply surfaces the post even when
/// neither the post nor the reply's parent matches). Results keep store
/// order and are deduplicated by construction: each post is tested once.
pub async fn search(
    State(mut store): State<DocStore>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let terms = traverse::search_terms(&params.q);
    if terms.is_empty() {
        return Err(AppError::BadRequest("Search query is empty".to_string()));
    }

    let posts = store.list::<Post>().await?;
    let communities = store.list::<Community>().await?;
    let flairs = store.list::<LinkFlair>().await?;

    let mut results = Vec::new();
    for post in posts {
        let title = post.title.to_lowercase();
        let content = post.content.to_lowercase();
        let direct_hit = terms
            .iter()
            .any(|term| title.contains(term) || content.contains(term));

        let matching =
            traverse::find_matching_comments(&mut store, &post.comment_ids, &terms).await?;

        if !direct_hit && matching.is_empty() {
            continue;
        }

        let community_name = communities
            .iter()
            .find(|c| c.post_ids.iter().any(|id| id == &post.id))
            .map(|c| c.name.clone());
        let link_flair = post.link_flair_id.as_ref().and_then(|flair_id| {
            flairs
                .iter()
                .find(|f| &f.id == flair_id)
                .map(|f| f.content.clone())
        });

        results.push(SearchResult {
            post,
            community_name,
            link_flair,
            matching_comments: matching.len(),
        });
    }

    Ok(Json(results))
}
