// src/handlers/flair.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::flair::{CreateFlairRequest, LinkFlair},
    store::{DocStore, new_id},
    utils::jwt::Claims,
};

/// List all link flairs.
pub async fn list_flairs(State(store): State<DocStore>) -> Result<impl IntoResponse, AppError> {
    let flairs = store.list::<LinkFlair>().await?;
    Ok(Json(flairs))
}

/// Create a new link flair. Existing flairs with the same content are
/// reused rather than duplicated.
pub async fn create_flair(
    State(store): State<DocStore>,
    _claims: Claims,
    Json(payload): Json<CreateFlairRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if let Some(existing) = store
        .find::<LinkFlair>(|f| f.content == payload.content)
        .await?
        .into_iter()
        .next()
    {
        return Ok((StatusCode::OK, Json(existing)));
    }

    let flair = LinkFlair {
        id: new_id(),
        content: payload.content,
    };
    store.insert(&flair).await?;

    Ok((StatusCode::CREATED, Json(flair)))
}
