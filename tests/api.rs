mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use forumdb::app;

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn user_body(nickname: &str) -> Value {
    json!({
        "fullname": format!("{} Example", nickname),
        "about": "",
        "email": format!("{}@example.com", nickname),
    })
}

/// alice, bob, forum `pirates`, thread `jolly` (id 1)
async fn seeded_app() -> Router {
    let app = app(common::state());
    for nickname in ["alice", "bob"] {
        let (status, _) = post_json(&app, &format!("/api/user/{}/create", nickname), user_body(nickname)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = post_json(
        &app,
        "/api/forum/create",
        json!({"title": "Pirates", "user": "alice", "slug": "pirates"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post_json(
        &app,
        "/api/forum/pirates/create",
        json!({"title": "Jolly", "author": "bob", "message": "Ahoy", "slug": "jolly"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    app
}

#[tokio::test]
async fn test_health() {
    let app = app(common::state());
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn test_user_create_conflict_and_profile() {
    let app = seeded_app().await;

    let (status, body) = post_json(&app, "/api/user/alice/create", user_body("alice")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["nickname"], "alice");

    let (status, body) = post_json(&app, "/api/user/alice/profile", json!({"about": "Captain"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["about"], "Captain");
    assert_eq!(body["email"], "alice@example.com");

    let (status, body) = get(&app, "/api/user/nobody/profile").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_user_nickname_is_any_path_segment() {
    let app = app(common::state());

    let (status, body) = post_json(&app, "/api/user/jack-sparrow/create", user_body("jack-sparrow")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["nickname"], "jack-sparrow");

    let (status, body) = post_json(
        &app,
        "/api/user/jos%C3%A9/create",
        json!({"fullname": "José", "about": "", "email": "jose@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["nickname"], "josé");

    let (status, body) = get(&app, "/api/user/jos%C3%A9/profile").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "jose@example.com");
}

#[tokio::test]
async fn test_forum_details_and_repeat_create() {
    let app = seeded_app().await;

    let (status, body) = post_json(
        &app,
        "/api/forum/create",
        json!({"title": "Other", "user": "bob", "slug": "pirates"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["user"], "alice");

    let (status, body) = get(&app, "/api/forum/pirates/details").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["threads"], 1);
    assert_eq!(body["posts"], 0);

    let (status, body) = post_json(
        &app,
        "/api/forum/create",
        json!({"title": "Ghosts", "user": "nobody", "slug": "ghosts"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "reference_not_found");
}

#[tokio::test]
async fn test_posts_tree_listing() {
    let app = seeded_app().await;

    let (status, body) = post_json(
        &app,
        "/api/thread/jolly/create",
        json!([{"author": "alice", "message": "root"}]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let root = body[0]["id"].as_i64().unwrap();
    assert_eq!(body[0]["isEdited"], false);
    assert_eq!(body[0]["thread"], 1);
    assert_eq!(body[0]["forum"], "pirates");

    let (status, body) = post_json(
        &app,
        "/api/thread/1/create",
        json!([
            {"parent": root, "author": "bob", "message": "reply"},
            {"author": "bob", "message": "second root"}
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let reply = body[0]["id"].as_i64().unwrap();
    let second = body[1]["id"].as_i64().unwrap();

    let (status, body) = get(&app, "/api/thread/jolly/posts?sort=tree").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![root, reply, second]);

    let (_, body) = get(&app, "/api/thread/1/posts?sort=parent_tree&desc=true&limit=1").await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["id"], second);

    let (status, body) = get(&app, &format!("/api/thread/1/posts?since={}", root)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, body) = get(&app, "/api/thread/jolly/posts?sort=flat&since=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(3));

    let (status, _) = get(&app, "/api/thread/1/posts?since=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/thread/missing/posts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_parent_is_conflict() {
    let app = seeded_app().await;

    let (status, body) = post_json(
        &app,
        "/api/thread/jolly/create",
        json!([{"parent": 42, "author": "alice", "message": "orphan"}]),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "bad_parent");

    let (status, _) = post_json(
        &app,
        "/api/thread/jolly/create",
        json!([{"author": "ghost", "message": "boo"}]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post_json(
        &app,
        "/api/thread/jolly/create",
        json!([
            {"author": "ghost", "message": "boo"},
            {"parent": 999, "author": "alice", "message": "orphan"}
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "bad_parent");

    let (_, body) = get(&app, "/api/service/status").await;
    assert_eq!(body["post"], 0);
}

#[tokio::test]
async fn test_vote_and_thread_details() {
    let app = seeded_app().await;

    let (status, body) = post_json(&app, "/api/thread/jolly/vote", json!({"nickname": "alice", "voice": 1})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["votes"], 1);

    let (_, body) = post_json(&app, "/api/thread/1/vote", json!({"nickname": "alice", "voice": -1})).await;
    assert_eq!(body["votes"], -1);

    let (status, _) = post_json(&app, "/api/thread/1/vote", json!({"nickname": "alice", "voice": 2})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(&app, "/api/thread/jolly/details", json!({"title": "Jollier"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Jollier");
    assert_eq!(body["message"], "Ahoy");

    let (status, body) = get(&app, "/api/thread/1/details").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "jolly");
    assert_eq!(body["votes"], -1);
}

#[tokio::test]
async fn test_post_details_and_edit() {
    let app = seeded_app().await;
    let (_, body) = post_json(
        &app,
        "/api/thread/jolly/create",
        json!([{"author": "bob", "message": "first"}]),
    )
    .await;
    let id = body[0]["id"].as_i64().unwrap();

    let (status, body) = get(&app, &format!("/api/post/{}/details?related=user,forum", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["id"], id);
    assert_eq!(body["author"]["nickname"], "bob");
    assert_eq!(body["forum"]["slug"], "pirates");
    assert!(body.get("thread").is_none());

    let (status, body) = post_json(&app, &format!("/api/post/{}/details", id), json!({"message": "edited"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isEdited"], true);

    let (status, _) = get(&app, "/api/post/999/details").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, "/api/post/abc/details").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = post_json(&app, "/api/post/abc/details", json!({"message": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_forum_listings() {
    let app = seeded_app().await;

    let (status, body) = get(&app, "/api/forum/pirates/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["nickname"], "bob");

    let (status, body) = get(&app, "/api/forum/pirates/threads?limit=0&desc=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["slug"], "jolly");

    let (status, _) = get(&app, "/api/forum/pirates/threads?since=notatime").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/forum/nowhere/users").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_clear() {
    let app = seeded_app().await;

    let (_, body) = get(&app, "/api/service/status").await;
    assert_eq!(body, json!({"user": 2, "forum": 1, "thread": 1, "post": 0}));

    let (status, _) = post_json(&app, "/api/service/clear", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/api/service/status").await;
    assert_eq!(body, json!({"user": 0, "forum": 0, "thread": 0, "post": 0}));
}
