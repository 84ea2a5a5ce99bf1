mod forums;
mod posts;
mod service;
mod threads;
mod users;

use axum::{routing::{get, post}, Router};

use crate::AppState;

/// Build the API router
pub fn router() -> Router<AppState> {
    Router::new()
        // User routes
        .route("/user/{nickname}/create", post(users::create_user))
        .route(
            "/user/{nickname}/profile",
            get(users::get_user).post(users::update_user),
        )
        // Forum routes
        .route("/forum/create", post(forums::create_forum))
        .route("/forum/{slug}/details", get(forums::get_forum))
        .route("/forum/{slug}/create", post(forums::create_thread))
        .route("/forum/{slug}/users", get(forums::list_users))
        .route("/forum/{slug}/threads", get(forums::list_threads))
        // Thread routes (slug or numeric id)
        .route("/thread/{slug_or_id}/create", post(threads::create_posts))
        .route("/thread/{slug_or_id}/vote", post(threads::vote))
        .route(
            "/thread/{slug_or_id}/details",
            get(threads::get_thread).post(threads::update_thread),
        )
        .route("/thread/{slug_or_id}/posts", get(threads::list_posts))
        // Post routes
        .route(
            "/post/{id}/details",
            get(posts::get_post).post(posts::update_post),
        )
        // Service routes
        .route("/service/status", get(service::status))
        .route("/service/clear", post(service::clear))
}
