// src/tree/rank.rs

use serde::Deserialize;
use std::str::FromStr;

use crate::{
    error::AppError,
    models::post::Post,
    tree::traverse::{self, CommentLookup},
};

/// Post listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    Active,
}

impl FromStr for SortMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortMode::Newest),
            "oldest" => Ok(SortMode::Oldest),
            "active" => Ok(SortMode::Active),
            other => Err(AppError::BadRequest(format!("Unknown sort order: {other}"))),
        }
    }
}

/// Orders posts by the requested mode.
///
/// `active` ranks by most-recent-activity timestamp (the post's creation
/// time or its latest reachable comment, whichever is newer), tie-broken by
/// descending creation time. The sort is stable, so ties beyond that keep
/// their input order.
pub async fn sort_posts<L>(
    lookup: &mut L,
    mut posts: Vec<Post>,
    mode: SortMode,
) -> Result<Vec<Post>, AppError>
where
    L: CommentLookup + Send,
{
    match mode {
        SortMode::Newest => {
            posts.sort_by(|a, b| b.posted_date.cmp(&a.posted_date));
            Ok(posts)
        }
        SortMode::Oldest => {
            posts.sort_by(|a, b| a.posted_date.cmp(&b.posted_date));
            Ok(posts)
        }
        SortMode::Active => {
            let mut keyed = Vec::with_capacity(posts.len());
            for post in posts {
                let activity =
                    traverse::latest_activity(lookup, post.posted_date, &post.comment_ids).await?;
                keyed.push((activity, post));
            }
            keyed.sort_by(|a, b| {
                b.0.cmp(&a.0)
                    .then_with(|| b.1.posted_date.cmp(&a.1.posted_date))
            });
            Ok(keyed.into_iter().map(|(_, post)| post).collect())
        }
    }
}
