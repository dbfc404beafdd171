// src/handlers/post.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        community::Community,
        flair::LinkFlair,
        post::{CreatePostRequest, Post, PostListParams, PostView, UpdatePostRequest, VoteRequest},
    },
    store::{DocStore, check_id, new_id},
    tree::{cascade, rank, traverse},
    utils::jwt::Claims,
};

async fn enrich(store: &mut DocStore, post: Post) -> Result<PostView, AppError> {
    let comment_count = traverse::count_comments(store, &post.comment_ids).await?;
    let latest_activity =
        traverse::latest_activity(store, post.posted_date, &post.comment_ids).await?;
    Ok(PostView {
        post,
        comment_count,
        latest_activity,
    })
}

/// List all posts, ordered by `?sort=newest|oldest|active` (default newest).
/// Each item carries its derived comment count and latest-activity time.
pub async fn list_posts(
    State(mut store): State<DocStore>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mode = match params.sort.as_deref() {
        Some(raw) => raw.parse()?,
        None => rank::SortMode::Newest,
    };

    let posts = store.list::<Post>().await?;
    let sorted = rank::sort_posts(&mut store, posts, mode).await?;

    let mut views = Vec::with_capacity(sorted.len());
    for post in sorted {
        views.push(enrich(&mut store, post).await?);
    }

    Ok(Json(views))
}

/// Get a single post by id, bumping its view counter server-side.
pub async fn get_post(
    State(mut store): State<DocStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let mut post = store
        .get::<Post>(&id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    post.views += 1;
    store.update(&post).await?;

    Ok(Json(enrich(&mut store, post).await?))
}

/// Create a new post inside a community.
///
/// The insert and the community post-list link happen in one transaction, so
/// no post ever exists without a community referencing it.
pub async fn create_post(
    State(store): State<DocStore>,
    claims: Claims,
    Path(community_id): Path<String>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&community_id)?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if let Some(flair_id) = &payload.link_flair_id {
        check_id(flair_id)?;
        store
            .get::<LinkFlair>(flair_id)
            .await?
            .ok_or(AppError::NotFound("Link flair not found".to_string()))?;
    }

    let mut tx = store.begin().await?;

    let mut community: Community = tx
        .get(&community_id)
        .await?
        .ok_or(AppError::NotFound("Community not found".to_string()))?;

    let post = Post {
        id: new_id(),
        title: payload.title,
        content: payload.content,
        link_flair_id: payload.link_flair_id,
        posted_by: claims.sub,
        posted_date: chrono::Utc::now(),
        comment_ids: Vec::new(),
        views: 0,
        vote: 0,
    };

    tx.insert(&post).await?;
    community.post_ids.push(post.id.clone());
    tx.update(&community).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Edit a post's title, content or flair (author only). Absent fields are
/// left unchanged.
pub async fn update_post(
    State(store): State<DocStore>,
    claims: Claims,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut post = store
        .get::<Post>(&id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    if post.posted_by != claims.sub {
        return Err(AppError::AuthError(
            "You are not authorized to edit this post".to_string(),
        ));
    }

    if let Some(flair_id) = payload.link_flair_id {
        check_id(&flair_id)?;
        store
            .get::<LinkFlair>(&flair_id)
            .await?
            .ok_or(AppError::NotFound("Link flair not found".to_string()))?;
        post.link_flair_id = Some(flair_id);
    }
    if let Some(title) = payload.title {
        post.title = title;
    }
    if let Some(content) = payload.content {
        post.content = content;
    }

    store.update(&post).await?;

    Ok(Json(post))
}

/// Delete a post (author only).
///
/// Cascades the entire comment tree and prunes the community's post list,
/// all inside one transaction.
pub async fn delete_post(
    State(store): State<DocStore>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let post = store
        .get::<Post>(&id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    if post.posted_by != claims.sub {
        return Err(AppError::AuthError(
            "You are not authorized to delete this post".to_string(),
        ));
    }

    let mut tx = store.begin().await?;
    cascade::delete_post(&mut tx, &id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Vote on a post: `{"direction": "up" | "down"}`.
pub async fn vote_post(
    State(store): State<DocStore>,
    _claims: Claims,
    Path(id): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let mut post = store
        .get::<Post>(&id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    post.vote += payload.direction.delta();
    store.update(&post).await?;

    Ok(Json(serde_json::json!({ "id": post.id, "vote": post.vote })))
}

/// List a post's full comment tree, nested for threaded rendering.
pub async fn list_post_comments(
    State(mut store): State<DocStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_id(&id)?;

    let post = store
        .get::<Post>(&id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let thread = traverse::load_thread(&mut store, &post.comment_ids).await?;

    Ok(Json(thread))
}
