// src/handlers/community.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::community::{
        Community, CommunityListParams, CreateCommunityRequest, UpdateCommunityRequest,
    },
    store::{DocStore, check_id, new_id},
    tree::cascade,
    utils::jwt::Claims,
};

/// List communities. With `?name=` acts as an existence probe for the
/// new-community form.
pub async fn list_communities(
    State(store): State<DocStore>,
    Query(params): Query<CommunityListParams>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(name) = params.name {
        let existing = store.find::<Community>(|c| c.name == name).await?;
        return Ok(Json(json!({ "exists": !existing.is_empty() })).into_response());
    }

    let communities = store.list::<Community>().await?;
    Ok(Json(communities).into_response())
}

/// Get a community by id.
pub async fn get_community(
    State(store): State<DocStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let community = store
        .get::<Community>(&id)
        .await?
        .ok_or(AppError::NotFound("Community not found".to_string()))?;

    Ok(Json(community))
}

/// List the communities the caller is a member of.
pub async fn my_communities(
    State(store): State<DocStore>,
    claims: Claims,
) -> Result<impl IntoResponse, AppError> {
    let communities = store
        .find::<Community>(|c| c.members.iter().any(|m| m == &claims.sub))
        .await?;

    Ok(Json(communities))
}

/// Create a new community. The creator becomes the first member.
pub async fn create_community(
    State(store): State<DocStore>,
    claims: Claims,
    Json(payload): Json<CreateCommunityRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let duplicates = store
        .find::<Community>(|c| c.name == payload.name)
        .await?;
    if !duplicates.is_empty() {
        return Err(AppError::Conflict(
            "Community name already exists.".to_string(),
        ));
    }

    let community = Community {
        id: new_id(),
        name: payload.name,
        description: payload.description,
        created_by: claims.sub.clone(),
        start_date: chrono::Utc::now(),
        members: vec![claims.sub],
        post_ids: Vec::new(),
    };

    store.insert(&community).await?;

    Ok((StatusCode::CREATED, Json(community)))
}

/// Edit a community's name or description (creator only). A name change
/// must not collide with another community.
pub async fn update_community(
    State(store): State<DocStore>,
    claims: Claims,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCommunityRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut community = store
        .get::<Community>(&id)
        .await?
        .ok_or(AppError::NotFound("Community not found".to_string()))?;

    if community.created_by != claims.sub {
        return Err(AppError::AuthError(
            "Only the creator can edit this community".to_string(),
        ));
    }

    if let Some(name) = payload.name {
        let duplicates = store
            .find::<Community>(|c| c.name == name && c.id != id)
            .await?;
        if !duplicates.is_empty() {
            return Err(AppError::Conflict(
                "Community name already exists.".to_string(),
            ));
        }
        community.name = name;
    }
    if let Some(description) = payload.description {
        community.description = description;
    }

    store.update(&community).await?;

    Ok(Json(community))
}

/// Join a community. Joining twice is a no-op.
pub async fn join_community(
    State(store): State<DocStore>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let mut community = store
        .get::<Community>(&id)
        .await?
        .ok_or(AppError::NotFound("Community not found".to_string()))?;

    if !community.members.iter().any(|m| m == &claims.sub) {
        community.members.push(claims.sub);
        store.update(&community).await?;
    }

    Ok(Json(community))
}

/// Leave a community. The creator cannot leave; the member set must never
/// become empty.
pub async fn leave_community(
    State(store): State<DocStore>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let mut community = store
        .get::<Community>(&id)
        .await?
        .ok_or(AppError::NotFound("Community not found".to_string()))?;

    if community.created_by == claims.sub {
        return Err(AppError::BadRequest(
            "The creator cannot leave their community".to_string(),
        ));
    }

    community.members.retain(|m| m != &claims.sub);
    store.update(&community).await?;

    Ok(Json(community))
}

/// Delete a community (creator only).
///
/// Cascades through every post and each post's full comment tree in one
/// transaction, so a failure mid-way leaves nothing half-deleted.
pub async fn delete_community(
    State(store): State<DocStore>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let community = store
        .get::<Community>(&id)
        .await?
        .ok_or(AppError::NotFound("Community not found".to_string()))?;

    if community.created_by != claims.sub {
        return Err(AppError::AuthError(
            "Only the creator can delete this community".to_string(),
        ));
    }

    let mut tx = store.begin().await?;
    cascade::delete_community(&mut tx, &id).await?;
    tx.commit().await?;

    tracing::info!("Community {} deleted with full cascade", id);

    Ok(StatusCode::NO_CONTENT)
}
