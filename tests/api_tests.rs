// tests/api_tests.rs

use phreddit::{
    config::Config,
    routes,
    state::AppState,
    store::{self, DocStore},
};
use sqlx::sqlite::SqlitePoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
///
/// Each app gets its own in-memory SQLite database; a single pooled
/// connection keeps it alive for the lifetime of the test.
async fn spawn_app() -> String {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    store::init_schema(&pool)
        .await
        .expect("Failed to initialize collections");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        listen_port: 0,
        rust_log: "error".to_string(),
    };

    let state = AppState {
        store: DocStore::new(pool),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Registers a user and returns their bearer token and user id.
async fn register_and_login(
    address: &str,
    client: &reqwest::Client,
    display_name: &str,
) -> (String, String) {
    let email = format!("{display_name}@example.com");

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "display_name": display_name,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    let token = login["token"].as_str().expect("Token not found").to_string();
    let user_id = login["user"]["id"].as_str().expect("User id not found").to_string();
    (token, user_id)
}

#[tokio::test]
async fn health_check_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: not an email
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "display_name": "someone",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn register_rejects_duplicate_display_name() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for (email, expected) in [("a@example.com", 201), ("b@example.com", 409)] {
        let response = client
            .post(format!("{}/api/auth/register", address))
            .json(&serde_json::json!({
                "email": email,
                "display_name": "taken",
                "password": "password123"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), expected);
    }
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    register_and_login(&address, &client, "pwcheck").await;

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": "pwcheck@example.com",
            "password": "wrong-password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn community_routes_require_auth() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/communities", address))
        .json(&serde_json::json!({
            "name": "no-token",
            "description": "should fail"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn malformed_ids_are_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/posts/not-a-valid-id", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_forum_flow() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, user_id) = register_and_login(&address, &client, "alice").await;

    // 1. Create a community
    let community: serde_json::Value = client
        .post(format!("{}/api/communities", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "name": "rustaceans",
            "description": "All things Rust"
        }))
        .send()
        .await
        .expect("Create community failed")
        .json()
        .await
        .unwrap();
    let community_id = community["id"].as_str().unwrap().to_string();
    assert_eq!(community["members"][0], user_id.as_str());

    // Duplicate name is a conflict
    let dup = client
        .post(format!("{}/api/communities", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "name": "rustaceans",
            "description": "again"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(dup.status().as_u16(), 409);

    // Existence probe
    let probe: serde_json::Value = client
        .get(format!("{}/api/communities?name=rustaceans", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(probe["exists"], true);

    // 2. Create a flair and a post carrying it
    let flair: serde_json::Value = client
        .post(format!("{}/api/linkflairs", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "content": "discussion" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let flair_id = flair["id"].as_str().unwrap().to_string();

    let post: serde_json::Value = client
        .post(format!("{}/api/communities/{}/posts", address, community_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "title": "Borrow checker appreciation thread",
            "content": "It never gets old",
            "link_flair_id": flair_id
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let post_id = post["id"].as_str().unwrap().to_string();

    // The community now references the post
    let community: serde_json::Value = client
        .get(format!("{}/api/communities/{}", address, community_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(community["post_ids"][0], post_id.as_str());

    // 3. Comment, then reply to the comment
    let top: serde_json::Value = client
        .post(format!("{}/api/posts/{}/comments", address, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "content": "First!" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let top_id = top["id"].as_str().unwrap().to_string();

    let reply: serde_json::Value = client
        .post(format!("{}/api/posts/{}/comments", address, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "content": "Replying to first",
            "parent_id": top_id
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let reply_id = reply["id"].as_str().unwrap().to_string();

    // 4. Fetching the post bumps views and derives the comment count
    let fetched: serde_json::Value = client
        .get(format!("{}/api/posts/{}", address, post_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["views"], 1);
    assert_eq!(fetched["comment_count"], 2);

    // The thread endpoint nests the reply under its parent
    let thread: serde_json::Value = client
        .get(format!("{}/api/posts/{}/comments", address, post_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(thread[0]["id"], top_id.as_str());
    assert_eq!(thread[0]["replies"][0]["id"], reply_id.as_str());

    // 5. The resolver maps the nested reply back to the post
    let owner: serde_json::Value = client
        .get(format!("{}/api/comments/{}/post", address, reply_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(owner["id"], post_id.as_str());

    // 6. Votes
    let voted: serde_json::Value = client
        .put(format!("{}/api/posts/{}/vote", address, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "direction": "up" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(voted["vote"], 1);

    let downvoted: serde_json::Value = client
        .put(format!("{}/api/comments/{}/vote", address, top_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "direction": "down" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(downvoted["vote"], -1);

    // 7. Search finds the post through its nested comment
    let results: serde_json::Value = client
        .get(format!("{}/api/search?q=replying", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results[0]["id"], post_id.as_str());
    assert_eq!(results[0]["community_name"], "rustaceans");
    assert_eq!(results[0]["link_flair"], "discussion");

    // 8. Profile lists the created content, comments annotated with the
    //    owning post's title
    let me: serde_json::Value = client
        .get(format!("{}/api/profile", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["user"]["display_name"], "alice");
    assert_eq!(me["posts"][0]["id"], post_id.as_str());
    assert_eq!(me["comments"][0]["post_title"], "Borrow checker appreciation thread");
}

#[tokio::test]
async fn only_the_author_deletes_their_content() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (owner_token, _) = register_and_login(&address, &client, "owner").await;
    let (other_token, _) = register_and_login(&address, &client, "intruder").await;

    let community: serde_json::Value = client
        .post(format!("{}/api/communities", address))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "name": "guarded", "description": "mine" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let community_id = community["id"].as_str().unwrap();

    let post: serde_json::Value = client
        .post(format!("{}/api/communities/{}/posts", address, community_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "title": "keep out", "content": "body" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let post_id = post["id"].as_str().unwrap();

    let denied = client
        .delete(format!("{}/api/posts/{}", address, post_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 401);

    let denied = client
        .delete(format!("{}/api/communities/{}", address, community_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 401);

    let allowed = client
        .delete(format!("{}/api/communities/{}", address, community_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status().as_u16(), 204);

    // The cascade took the post with it
    let gone = client
        .get(format!("{}/api/posts/{}", address, post_id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn only_the_author_edits_their_content() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (owner_token, _) = register_and_login(&address, &client, "editor").await;
    let (other_token, _) = register_and_login(&address, &client, "meddler").await;

    let community: serde_json::Value = client
        .post(format!("{}/api/communities", address))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "name": "editable", "description": "first draft" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let community_id = community["id"].as_str().unwrap();

    let post: serde_json::Value = client
        .post(format!("{}/api/communities/{}/posts", address, community_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "title": "tpyo in title", "content": "body" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let post_id = post["id"].as_str().unwrap();

    let comment: serde_json::Value = client
        .post(format!("{}/api/posts/{}/comments", address, post_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "content": "first thoughts" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let comment_id = comment["id"].as_str().unwrap();

    // Someone else cannot edit the post, and no token means no edit at all.
    let denied = client
        .put(format!("{}/api/posts/{}", address, post_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .json(&serde_json::json!({ "title": "hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 401);

    let denied = client
        .put(format!("{}/api/comments/{}", address, comment_id))
        .json(&serde_json::json!({ "content": "anonymous edit" }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 401);

    // The author fixes the title; the body is left alone.
    let updated: serde_json::Value = client
        .put(format!("{}/api/posts/{}", address, post_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "title": "typo in title" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["title"], "typo in title");
    assert_eq!(updated["content"], "body");

    let updated: serde_json::Value = client
        .put(format!("{}/api/comments/{}", address, comment_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "content": "second thoughts" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["content"], "second thoughts");

    let updated: serde_json::Value = client
        .put(format!("{}/api/communities/{}", address, community_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "description": "second draft" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["description"], "second draft");
    assert_eq!(updated["name"], "editable");

    // Validation bounds still apply on edit.
    let too_long = client
        .put(format!("{}/api/comments/{}", address, comment_id))
        .header("Authorization", format!("Bearer {}", owner_token))
        .json(&serde_json::json!({ "content": "x".repeat(501) }))
        .send()
        .await
        .unwrap();
    assert_eq!(too_long.status().as_u16(), 400);
}

#[tokio::test]
async fn deleting_a_comment_twice_is_not_an_error_the_first_time() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = register_and_login(&address, &client, "deleter").await;

    let community: serde_json::Value = client
        .post(format!("{}/api/communities", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "name": "ephemeral", "description": "d" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let post: serde_json::Value = client
        .post(format!(
            "{}/api/communities/{}/posts",
            address,
            community["id"].as_str().unwrap()
        ))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "title": "t", "content": "c" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let comment: serde_json::Value = client
        .post(format!(
            "{}/api/posts/{}/comments",
            address,
            post["id"].as_str().unwrap()
        ))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "content": "soon gone" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let comment_id = comment["id"].as_str().unwrap();

    let first = client
        .delete(format!("{}/api/comments/{}", address, comment_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 204);

    // The id is now the primary target of the operation and it is absent:
    // 404, not a crash or a silent success.
    let second = client
        .delete(format!("{}/api/comments/{}", address, comment_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 404);
}

#[tokio::test]
async fn posts_sort_by_activity() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _) = register_and_login(&address, &client, "sorter").await;

    let community: serde_json::Value = client
        .post(format!("{}/api/communities", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "name": "sorting", "description": "d" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let community_id = community["id"].as_str().unwrap();

    // Post B first (older), then post A; then comment on B so it becomes
    // the most recently active.
    let mut post_ids = Vec::new();
    for title in ["post b", "post a"] {
        let post: serde_json::Value = client
            .post(format!("{}/api/communities/{}/posts", address, community_id))
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({ "title": title, "content": "body" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        post_ids.push(post["id"].as_str().unwrap().to_string());
    }
    let (b_id, a_id) = (post_ids[0].clone(), post_ids[1].clone());

    client
        .post(format!("{}/api/posts/{}/comments", address, b_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "content": "bump" }))
        .send()
        .await
        .unwrap();

    let order_of = |results: serde_json::Value| -> Vec<String> {
        results
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap().to_string())
            .collect()
    };

    let newest: serde_json::Value = client
        .get(format!("{}/api/posts?sort=newest", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(order_of(newest), vec![a_id.clone(), b_id.clone()]);

    let oldest: serde_json::Value = client
        .get(format!("{}/api/posts?sort=oldest", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(order_of(oldest), vec![b_id.clone(), a_id.clone()]);

    let active: serde_json::Value = client
        .get(format!("{}/api/posts?sort=active", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(order_of(active), vec![b_id, a_id]);

    let bad = client
        .get(format!("{}/api/posts?sort=loudest", address))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status().as_u16(), 400);
}
