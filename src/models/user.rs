// src/models/user.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::Document;

/// User document in the 'users' collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,

    /// Unique email, used as the login identifier.
    pub email: String,

    /// Unique public handle.
    pub display_name: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,

    /// Argon2 password hash. Stored with the document; handlers must only
    /// ever respond with `UserView`, never the raw document.
    #[serde(default)]
    pub password_hash: String,

    pub reputation: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Public projection of a user, safe to embed in responses.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub reputation: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        UserView {
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            reputation: u.reputation,
            created_at: u.created_at,
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "A valid email is required."))]
    pub email: String,

    #[validate(length(
        min = 3,
        max = 50,
        message = "Display name length must be between 3 and 50 characters."
    ))]
    pub display_name: String,

    #[validate(length(max = 50))]
    pub first_name: Option<String>,
    #[validate(length(max = 50))]
    pub last_name: Option<String>,

    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 320))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
