// src/tree/traverse.rs

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::comment::{Comment, CommentNode},
    store::{DocStore, StoreTx},
};

/// The single verb the traversal engines need from storage: fetch one
/// comment by id. Implemented by the store, by store transactions, and by
/// plain maps in tests.
#[async_trait]
pub trait CommentLookup {
    async fn comment(&mut self, id: &str) -> Result<Option<Comment>, AppError>;
}

#[async_trait]
impl CommentLookup for DocStore {
    async fn comment(&mut self, id: &str) -> Result<Option<Comment>, AppError> {
        self.get(id).await
    }
}

#[async_trait]
impl CommentLookup for StoreTx {
    async fn comment(&mut self, id: &str) -> Result<Option<Comment>, AppError> {
        self.get(id).await
    }
}

#[cfg(test)]
#[async_trait]
impl CommentLookup for HashMap<String, Comment> {
    async fn comment(&mut self, id: &str) -> Result<Option<Comment>, AppError> {
        Ok(self.get(id).cloned())
    }
}

/// Collects every comment reachable from `roots` in depth-first discovery
/// order (a parent always precedes its children; siblings keep list order).
///
/// Dangling references are skipped. The visited set breaks reference cycles,
/// so arbitrarily malformed graphs terminate.
pub async fn collect_subtree<L>(lookup: &mut L, roots: &[String]) -> Result<Vec<Comment>, AppError>
where
    L: CommentLookup + Send,
{
    let mut found = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    // Children are pushed in reverse so siblings pop in list order.
    let mut stack: Vec<String> = roots.iter().rev().cloned().collect();

    while let Some(id) = stack.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        let Some(comment) = lookup.comment(&id).await? else {
            continue;
        };
        for child in comment.comment_ids.iter().rev() {
            stack.push(child.clone());
        }
        found.push(comment);
    }
    Ok(found)
}

/// Total number of comments reachable from a post's top-level list.
pub async fn count_comments<L>(lookup: &mut L, roots: &[String]) -> Result<u64, AppError>
where
    L: CommentLookup + Send,
{
    Ok(collect_subtree(lookup, roots).await?.len() as u64)
}

/// Most-recent-activity timestamp: the maximum of `floor` (the post's own
/// creation time) and every reachable comment's timestamp.
pub async fn latest_activity<L>(
    lookup: &mut L,
    floor: DateTime<Utc>,
    roots: &[String],
) -> Result<DateTime<Utc>, AppError>
where
    L: CommentLookup + Send,
{
    let mut latest = floor;
    for comment in collect_subtree(lookup, roots).await? {
        if comment.commented_date > latest {
            latest = comment.commented_date;
        }
    }
    Ok(latest)
}

/// Collects every reachable comment whose content contains (case-insensitive)
/// any of the query terms. Children are visited regardless of whether their
/// parent matched; the result preserves discovery order.
pub async fn find_matching_comments<L>(
    lookup: &mut L,
    roots: &[String],
    terms: &[String],
) -> Result<Vec<Comment>, AppError>
where
    L: CommentLookup + Send,
{
    let mut matches = collect_subtree(lookup, roots).await?;
    matches.retain(|comment| {
        let content = comment.content.to_lowercase();
        terms.iter().any(|term| content.contains(term))
    });
    Ok(matches)
}

/// Loads a post's full comment tree as nested nodes for threaded rendering.
pub async fn load_thread<L>(lookup: &mut L, roots: &[String]) -> Result<Vec<CommentNode>, AppError>
where
    L: CommentLookup + Send,
{
    let comments = collect_subtree(lookup, roots).await?;
    let by_id: HashMap<String, Comment> =
        comments.into_iter().map(|c| (c.id.clone(), c)).collect();
    let mut visited = HashSet::new();
    Ok(build_nodes(roots, &by_id, &mut visited))
}

fn build_nodes(
    ids: &[String],
    by_id: &HashMap<String, Comment>,
    visited: &mut HashSet<String>,
) -> Vec<CommentNode> {
    let mut nodes = Vec::new();
    for id in ids {
        if !visited.insert(id.clone()) {
            continue;
        }
        let Some(comment) = by_id.get(id) else {
            continue;
        };
        nodes.push(CommentNode {
            id: comment.id.clone(),
            content: comment.content.clone(),
            commented_by: comment.commented_by.clone(),
            commented_date: comment.commented_date,
            vote: comment.vote,
            replies: build_nodes(&comment.comment_ids, by_id, visited),
        });
    }
    nodes
}

/// Splits a raw search query into lowercase terms.
pub fn search_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|term| term.to_lowercase())
        .collect()
}
