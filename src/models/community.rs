// src/models/community.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::Document;

/// Community document in the 'communities' collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub id: String,

    /// Unique community name.
    pub name: String,
    pub description: String,

    /// Creator reference. The creator is always a member and is the only
    /// user allowed to delete the community.
    pub created_by: String,

    pub start_date: chrono::DateTime<chrono::Utc>,

    /// Member-reference set (stored as an ordered list, creator first).
    #[serde(default)]
    pub members: Vec<String>,

    /// Ordered post references.
    #[serde(default)]
    pub post_ids: Vec<String>,
}

impl Document for Community {
    const COLLECTION: &'static str = "communities";

    fn id(&self) -> &str {
        &self.id
    }
}

/// DTO for creating a new community.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommunityRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name length must be between 1 and 100 chars"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 500,
        message = "Description length must be between 1 and 500 chars"
    ))]
    pub description: String,
}

/// DTO for editing a community. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommunityRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name length must be between 1 and 100 chars"
    ))]
    pub name: Option<String>,

    #[validate(length(
        min = 1,
        max = 500,
        message = "Description length must be between 1 and 500 chars"
    ))]
    pub description: Option<String>,
}

/// Query parameters for the community listing (name existence probe).
#[derive(Debug, Deserialize)]
pub struct CommunityListParams {
    pub name: Option<String>,
}
