// src/models/post.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::Document;

/// Post document in the 'posts' collection.
///
/// Total comment count and latest-activity timestamp are derived on demand
/// by the traversal engine; they are never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,

    pub title: String,
    pub content: String,

    /// Optional link-flair reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_flair_id: Option<String>,

    /// Author reference.
    pub posted_by: String,

    pub posted_date: chrono::DateTime<chrono::Utc>,

    /// Ordered top-level comment references.
    #[serde(default)]
    pub comment_ids: Vec<String>,

    /// Monotonically increasing view counter.
    pub views: i64,

    pub vote: i64,
}

impl Document for Post {
    const COLLECTION: &'static str = "posts";

    fn id(&self) -> &str {
        &self.id
    }
}

/// DTO for creating a new post inside a community.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title length must be between 1 and 100 chars"
    ))]
    pub title: String,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,

    pub link_flair_id: Option<String>,
}

/// DTO for editing an existing post. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Title length must be between 1 and 100 chars"
    ))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,

    pub link_flair_id: Option<String>,
}

/// Query parameters for listing posts.
#[derive(Debug, Deserialize)]
pub struct PostListParams {
    /// Sort order: 'newest' (default), 'oldest' or 'active'.
    pub sort: Option<String>,
}

/// Vote direction payload, shared by post and comment vote endpoints.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn delta(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

/// A post enriched with the derived aggregates the listing and detail
/// endpoints expose.
#[derive(Debug, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub comment_count: u64,
    pub latest_activity: chrono::DateTime<chrono::Utc>,
}
