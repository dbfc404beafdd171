// src/models/flair.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::Document;

/// Link-flair document: a short tag attachable to posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFlair {
    pub id: String,
    pub content: String,
}

impl Document for LinkFlair {
    const COLLECTION: &'static str = "linkflairs";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFlairRequest {
    #[validate(length(
        min = 1,
        max = 30,
        message = "Flair content must be between 1 and 30 chars"
    ))]
    pub content: String,
}
