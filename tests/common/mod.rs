//! Shared fixtures for the integration suites

#![allow(dead_code)]

use std::sync::Arc;

use forumdb::config::Config;
use forumdb::engine::{Creation, Engine};
use forumdb::models::{
    CreateForumRequest, CreatePostRequest, CreateThreadRequest, Forum, Thread, UserProfile,
};
use forumdb::store::MemoryStore;
use forumdb::AppState;

pub fn engine() -> Engine {
    Engine::new(Arc::new(MemoryStore::new()))
}

pub fn state() -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), Config::in_memory())
}

pub fn profile(nickname: &str) -> UserProfile {
    UserProfile {
        fullname: format!("{} Example", nickname),
        about: format!("I am {}", nickname),
        email: format!("{}@example.com", nickname),
    }
}

pub fn forum_request(slug: &str, owner: &str) -> CreateForumRequest {
    CreateForumRequest {
        title: format!("Forum {}", slug),
        user: owner.to_string(),
        slug: slug.to_string(),
    }
}

pub fn thread_request(author: &str, slug: Option<&str>) -> CreateThreadRequest {
    CreateThreadRequest {
        title: "Jolly Roger".to_string(),
        author: author.to_string(),
        message: "Raise the flag".to_string(),
        slug: slug.map(str::to_string),
        created: None,
    }
}

pub fn post(parent: i64, author: &str) -> CreatePostRequest {
    CreatePostRequest {
        parent,
        author: author.to_string(),
        message: format!("{} says hi", author),
    }
}

pub fn created<T: std::fmt::Debug, C: std::fmt::Debug>(creation: Creation<T, C>) -> T {
    match creation {
        Creation::Created(value) => value,
        Creation::Conflict(existing) => panic!("Expected Created, got Conflict: {:?}", existing),
    }
}

/// Users alice and bob, forum `pirates` owned by alice, thread `jolly` by bob
pub async fn seed(engine: &Engine) -> (Forum, Thread) {
    for nickname in ["alice", "bob"] {
        created(engine.create_user(nickname, profile(nickname)).await.unwrap());
    }
    let forum = created(engine.create_forum(forum_request("pirates", "alice")).await.unwrap());
    let thread = created(
        engine
            .create_thread("pirates", thread_request("bob", Some("jolly")))
            .await
            .unwrap(),
    );
    (forum, thread)
}
