use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    engine::Creation,
    error::{AppError, Result},
    models::{CreateForumRequest, CreateThreadRequest, Forum, Thread, User},
    paging::ListQuery,
    AppState,
};

/// Create a forum; repeating the request returns the stored forum with 409
pub async fn create_forum(
    State(state): State<AppState>,
    Json(req): Json<CreateForumRequest>,
) -> Result<Creation<Forum>> {
    req.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;
    state.engine.create_forum(req).await
}

pub async fn get_forum(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Forum>> {
    let forum = state.engine.forum(&slug).await?;
    Ok(Json(forum))
}

pub async fn create_thread(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<CreateThreadRequest>,
) -> Result<Creation<Thread>> {
    req.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;
    state.engine.create_thread(&slug, req).await
}

/// Users active in a forum, by nickname
pub async fn list_users(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<User>>> {
    let page = query.user_page(state.config.paging.default_limit);
    let users = state.engine.forum_users(&slug, &page).await?;
    Ok(Json(users))
}

/// Threads of a forum, by creation time
pub async fn list_threads(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Thread>>> {
    let page = query.thread_page(state.config.paging.default_limit)?;
    let threads = state.engine.forum_threads(&slug, &page).await?;
    Ok(Json(threads))
}
