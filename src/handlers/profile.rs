// src/handlers/profile.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::{
    error::AppError,
    models::{
        comment::Comment,
        community::Community,
        post::Post,
        user::{User, UserView},
    },
    store::DocStore,
    tree::resolve,
    utils::jwt::Claims,
};

#[derive(Debug, Serialize)]
struct OwnComment {
    #[serde(flatten)]
    comment: Comment,
    /// Title of the post the comment ultimately belongs to, resolved via
    /// the root-post resolver.
    post_title: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    user: UserView,
    communities: Vec<Community>,
    posts: Vec<Post>,
    comments: Vec<OwnComment>,
}

/// The caller's profile: their user record plus everything they created.
pub async fn me(
    State(store): State<DocStore>,
    claims: Claims,
) -> Result<impl IntoResponse, AppError> {
    let user = store
        .get::<User>(&claims.sub)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let communities = store
        .find::<Community>(|c| c.created_by == claims.sub)
        .await?;
    let posts = store.find::<Post>(|p| p.posted_by == claims.sub).await?;
    let own = store
        .find::<Comment>(|c| c.commented_by == claims.sub)
        .await?;

    let mut comments = Vec::with_capacity(own.len());
    for comment in own {
        let post_title = resolve::resolve_root_post(&store, &comment.id)
            .await?
            .map(|post| post.title);
        comments.push(OwnComment {
            comment,
            post_title,
        });
    }

    Ok(Json(ProfileResponse {
        user: UserView::from(user),
        communities,
        posts,
        comments,
    }))
}
