// src/tree/resolve.rs

use std::collections::HashSet;

use crate::{
    error::AppError,
    models::{comment::Comment, post::Post},
    store::DocStore,
};

/// Resolves the post that ultimately contains `comment_id`.
///
/// Fast path: every comment written through the API records its owning post
/// id, so resolution is a single lookup. Documents inserted by external
/// tooling may lack the field; for those the resolver falls back to the
/// upward walk: find the structure referencing the id (a post's top-level
/// list or a parent comment's child list) and repeat with the parent.
///
/// Returns `None` when the comment does not exist or no post owns it.
pub async fn resolve_root_post(
    store: &DocStore,
    comment_id: &str,
) -> Result<Option<Post>, AppError> {
    let Some(comment) = store.get::<Comment>(comment_id).await? else {
        return Ok(None);
    };

    if let Some(post_id) = &comment.post_id {
        if let Some(post) = store.get::<Post>(post_id).await? {
            return Ok(Some(post));
        }
    }

    resolve_by_walk(store, comment_id).await
}

async fn resolve_by_walk(store: &DocStore, comment_id: &str) -> Result<Option<Post>, AppError> {
    let posts: Vec<Post> = store.list().await?;
    let comments: Vec<Comment> = store.list().await?;

    let mut current = comment_id.to_string();
    let mut visited: HashSet<String> = HashSet::new();

    loop {
        if !visited.insert(current.clone()) {
            // Parent chain loops back on itself; no post can own this.
            return Ok(None);
        }

        if let Some(post) = posts
            .iter()
            .find(|p| p.comment_ids.iter().any(|id| id == &current))
        {
            return Ok(Some(post.clone()));
        }

        match comments
            .iter()
            .find(|c| c.comment_ids.iter().any(|id| id == &current))
        {
            Some(parent) => current = parent.id.clone(),
            None => return Ok(None),
        }
    }
}
