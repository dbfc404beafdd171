// src/routes.rs

use axum::{
    Router, http::Method,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, comment, community, flair, post as posts, profile, search},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, communities, posts, comments, flairs, search).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store + config).
///
/// Authentication is per-handler: anything taking a `Claims` argument
/// rejects requests without a valid bearer token.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let community_routes = Router::new()
        .route(
            "/",
            get(community::list_communities).post(community::create_community),
        )
        .route("/mine", get(community::my_communities))
        .route(
            "/{id}",
            get(community::get_community)
                .put(community::update_community)
                .delete(community::delete_community),
        )
        .route("/{id}/join", post(community::join_community))
        .route("/{id}/leave", post(community::leave_community))
        .route("/{id}/posts", post(posts::create_post));

    let post_routes = Router::new()
        .route("/", get(posts::list_posts))
        .route(
            "/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/{id}/vote", put(posts::vote_post))
        .route(
            "/{id}/comments",
            get(posts::list_post_comments).post(comment::create_comment),
        );

    let comment_routes = Router::new()
        .route(
            "/{id}",
            get(comment::get_comment)
                .put(comment::update_comment)
                .delete(comment::delete_comment),
        )
        .route("/{id}/vote", put(comment::vote_comment))
        .route("/{id}/post", get(comment::find_post));

    let flair_routes = Router::new().route(
        "/",
        get(flair::list_flairs).post(flair::create_flair),
    );

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/communities", community_routes)
        .nest("/api/posts", post_routes)
        .nest("/api/comments", comment_routes)
        .nest("/api/linkflairs", flair_routes)
        .route("/api/profile", get(profile::me))
        .route("/api/search", get(search::search))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
