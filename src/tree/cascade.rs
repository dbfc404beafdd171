// src/tree/cascade.rs

use crate::{
    error::AppError,
    models::{comment::Comment, community::Community, post::Post},
    store::StoreTx,
    tree::traverse,
};

/// Deletes every comment reachable from `roots`, children first, inside the
/// caller's transaction. Missing ids are skipped, so the operation is
/// idempotent; re-deleting an already-removed subtree is a no-op.
///
/// Returns the number of comments actually removed.
pub async fn delete_comment_trees(tx: &mut StoreTx, roots: &[String]) -> Result<u64, AppError> {
    // Discovery order puts every parent before its children; deleting in
    // reverse removes leaves first, so an interrupted transaction never
    // commits an orphaned subtree.
    let subtree = traverse::collect_subtree(tx, roots).await?;

    let mut deleted = 0;
    for comment in subtree.iter().rev() {
        if tx.delete::<Comment>(&comment.id).await? {
            deleted += 1;
        }
    }
    Ok(deleted)
}

/// Deletes one comment and its entire subtree, pruning the reference that
/// pointed at it (the owning post's top-level list or the direct parent's
/// child list). Returns the deleted comment.
pub async fn delete_comment(tx: &mut StoreTx, comment_id: &str) -> Result<Comment, AppError> {
    let comment: Comment = tx
        .get(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    let mut pruned = false;
    if let Some(post_id) = &comment.post_id {
        if let Some(mut post) = tx.get::<Post>(post_id).await? {
            if post.comment_ids.iter().any(|id| id == comment_id) {
                post.comment_ids.retain(|id| id != comment_id);
                tx.update(&post).await?;
                pruned = true;
            }
        }
    }

    if !pruned {
        // Not a top-level comment (or the owning-post id is missing):
        // the referrer is either some comment's child list or a post list.
        let parents: Vec<Comment> = tx.list().await?;
        if let Some(mut parent) = parents
            .into_iter()
            .find(|c| c.comment_ids.iter().any(|id| id == comment_id))
        {
            parent.comment_ids.retain(|id| id != comment_id);
            tx.update(&parent).await?;
        } else {
            let posts: Vec<Post> = tx.list().await?;
            if let Some(mut post) = posts
                .into_iter()
                .find(|p| p.comment_ids.iter().any(|id| id == comment_id))
            {
                post.comment_ids.retain(|id| id != comment_id);
                tx.update(&post).await?;
            }
        }
    }

    delete_comment_trees(tx, std::slice::from_ref(&comment.id)).await?;
    Ok(comment)
}

/// Deletes a post and all transitively reachable comments, then removes the
/// post's id from its owning community's post list. Returns the deleted post.
pub async fn delete_post(tx: &mut StoreTx, post_id: &str) -> Result<Post, AppError> {
    let post: Post = tx
        .get(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    delete_comment_trees(tx, &post.comment_ids).await?;
    tx.delete::<Post>(post_id).await?;

    // Community-boundary cleanup: drop the dangling post reference.
    let communities: Vec<Community> = tx.list().await?;
    if let Some(mut community) = communities
        .into_iter()
        .find(|c| c.post_ids.iter().any(|id| id == post_id))
    {
        community.post_ids.retain(|id| id != post_id);
        tx.update(&community).await?;
    }

    Ok(post)
}

/// Deletes a community, all of its posts and every comment those posts
/// reach. Returns the deleted community.
pub async fn delete_community(
    tx: &mut StoreTx,
    community_id: &str,
) -> Result<Community, AppError> {
    let community: Community = tx
        .get(community_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Community not found".to_string()))?;

    for post_id in &community.post_ids {
        let Some(post) = tx.get::<Post>(post_id).await? else {
            continue;
        };
        delete_comment_trees(tx, &post.comment_ids).await?;
        tx.delete::<Post>(post_id).await?;
    }
    tx.delete::<Community>(community_id).await?;

    Ok(community)
}
