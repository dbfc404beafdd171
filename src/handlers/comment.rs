// src/handlers/comment.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CreateCommentRequest, UpdateCommentRequest},
        post::{Post, VoteRequest},
    },
    store::{DocStore, check_id, new_id},
    tree::{cascade, resolve},
    utils::jwt::Claims,
};

/// Get a single comment by id.
pub async fn get_comment(
    State(store): State<DocStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let comment = store
        .get::<Comment>(&id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    Ok(Json(comment))
}

/// Create a comment under a post.
///
/// With `parent_id` the comment is linked into that comment's child list;
/// otherwise into the post's top-level list. Creation and linking happen in
/// one transaction, so no comment ever exists unreferenced. The owning post
/// id is recorded on the comment, which is what makes root-post resolution
/// a single lookup.
pub async fn create_comment(
    State(store): State<DocStore>,
    claims: Claims,
    Path(post_id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&post_id)?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut tx = store.begin().await?;

    let mut post: Post = tx
        .get(&post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let comment = Comment {
        id: new_id(),
        content: payload.content,
        comment_ids: Vec::new(),
        commented_by: claims.sub,
        commented_date: chrono::Utc::now(),
        vote: 0,
        post_id: Some(post.id.clone()),
    };

    match &payload.parent_id {
        Some(parent_id) => {
            check_id(parent_id)?;
            let mut parent: Comment = tx
                .get(parent_id)
                .await?
                .ok_or(AppError::NotFound("Parent comment not found".to_string()))?;

            // The parent must live under the same post.
            if parent.post_id.as_deref() != Some(post.id.as_str()) {
                return Err(AppError::BadRequest(
                    "Parent comment does not belong to this post".to_string(),
                ));
            }

            parent.comment_ids.push(comment.id.clone());
            tx.insert(&comment).await?;
            tx.update(&parent).await?;
        }
        None => {
            post.comment_ids.push(comment.id.clone());
            tx.insert(&comment).await?;
            tx.update(&post).await?;
        }
    }

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Edit a comment's content (author only). Replies, votes and the owning
/// post are untouched.
pub async fn update_comment(
    State(store): State<DocStore>,
    claims: Claims,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut comment = store
        .get::<Comment>(&id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    if comment.commented_by != claims.sub {
        return Err(AppError::AuthError(
            "You are not authorized to edit this comment".to_string(),
        ));
    }

    comment.content = payload.content;
    store.update(&comment).await?;

    Ok(Json(comment))
}

/// Delete a comment and its entire reply subtree (author only).
///
/// The reference pointing at the comment (post top-level list or parent
/// child list) is pruned in the same transaction.
pub async fn delete_comment(
    State(store): State<DocStore>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let comment = store
        .get::<Comment>(&id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    if comment.commented_by != claims.sub {
        return Err(AppError::AuthError(
            "You are not authorized to delete this comment".to_string(),
        ));
    }

    let mut tx = store.begin().await?;
    cascade::delete_comment(&mut tx, &id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Vote on a comment: `{"direction": "up" | "down"}`.
pub async fn vote_comment(
    State(store): State<DocStore>,
    _claims: Claims,
    Path(id): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let mut comment = store
        .get::<Comment>(&id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    comment.vote += payload.direction.delta();
    store.update(&comment).await?;

    Ok(Json(
        serde_json::json!({ "id": comment.id, "vote": comment.vote }),
    ))
}

/// Resolve the post that ultimately contains a comment.
pub async fn find_post(
    State(store): State<DocStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let post = resolve::resolve_root_post(&store, &id)
        .await?
        .ok_or(AppError::NotFound(
            "No post found for this comment".to_string(),
        ))?;

    Ok(Json(post))
}
