// src/models/comment.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::Document;

/// Comment document in the 'comments' collection.
///
/// A comment owns its direct replies by reference: `comment_ids` is an
/// ordered list of child-comment ids, each a separate stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,

    pub content: String,

    /// Ordered child-comment references (direct replies).
    #[serde(default)]
    pub comment_ids: Vec<String>,

    /// Author reference (opaque user id).
    pub commented_by: String,

    pub commented_date: chrono::DateTime<chrono::Utc>,

    pub vote: i64,

    /// Denormalized owning-post id, written at creation time so root-post
    /// resolution is a single lookup. Absent on documents inserted by
    /// external tooling; the resolver falls back to an upward walk then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
}

impl Document for Comment {
    const COLLECTION: &'static str = "comments";

    fn id(&self) -> &str {
        &self.id
    }
}

/// DTO for creating a new comment under a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Comment must be between 1 and 500 characters"
    ))]
    pub content: String,

    /// Optional: the id of the comment being replied to. When absent the
    /// comment is linked into the post's top-level list.
    pub parent_id: Option<String>,
}

/// DTO for editing an existing comment.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Comment must be between 1 and 500 characters"
    ))]
    pub content: String,
}

/// A comment with its replies resolved, for threaded rendering.
#[derive(Debug, Serialize)]
pub struct CommentNode {
    pub id: String,
    pub content: String,
    pub commented_by: String,
    pub commented_date: chrono::DateTime<chrono::Utc>,
    pub vote: i64,
    pub replies: Vec<CommentNode>,
}
