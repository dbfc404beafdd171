// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, User, UserView},
    store::{DocStore, new_id},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it. Email and display
/// name must both be unique. Returns 201 Created and the public user view.
pub async fn register(
    State(store): State<DocStore>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let taken = store
        .find::<User>(|u| u.email == payload.email || u.display_name == payload.display_name)
        .await?;
    if !taken.is_empty() {
        return Err(AppError::Conflict(
            "Email or display name already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;

    let user = User {
        id: new_id(),
        email: payload.email,
        display_name: payload.display_name,
        first_name: payload.first_name,
        last_name: payload.last_name,
        password_hash,
        reputation: 100,
        created_at: chrono::Utc::now(),
    };

    store.insert(&user).await.map_err(|e| {
        tracing::error!("Failed to register user: {}", e);
        e
    })?;

    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

/// Authenticates a user and returns a JWT token.
///
/// Verifies the email and password against the stored Argon2 hash.
/// If valid, signs a JWT carrying the user's id.
pub async fn login(
    State(store): State<DocStore>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = store
        .find::<User>(|u| u.email == payload.email)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::AuthError("User not found".to_string()))?;

    let is_valid = verify_password(&payload.password, &user.password_hash)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let token = sign_jwt(&user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user": UserView::from(user),
    })))
}
