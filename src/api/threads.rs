use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, Result},
    models::{CreatePostRequest, Post, Thread, ThreadRef, ThreadUpdate, Vote},
    paging::ListQuery,
    AppState,
};

/// Create a batch of posts; nothing is stored if any post is rejected
pub async fn create_posts(
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
    Json(posts): Json<Vec<CreatePostRequest>>,
) -> Result<(StatusCode, Json<Vec<Post>>)> {
    for post in &posts {
        post.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    let thread = ThreadRef::parse(&slug_or_id);
    let created = state.engine.create_posts(&thread, posts).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn vote(
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
    Json(vote): Json<Vote>,
) -> Result<Json<Thread>> {
    vote.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

    let thread = state
        .engine
        .vote(&ThreadRef::parse(&slug_or_id), vote)
        .await?;
    Ok(Json(thread))
}

pub async fn get_thread(
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
) -> Result<Json<Thread>> {
    let thread = state.engine.thread(&ThreadRef::parse(&slug_or_id)).await?;
    Ok(Json(thread))
}

/// Partial thread update
pub async fn update_thread(
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
    Json(update): Json<ThreadUpdate>,
) -> Result<Json<Thread>> {
    let thread = state
        .engine
        .update_thread(&ThreadRef::parse(&slug_or_id), update)
        .await?;
    Ok(Json(thread))
}

/// Posts of a thread in flat, tree or parent_tree order
pub async fn list_posts(
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Post>>> {
    let page = query.post_page(state.config.paging.default_limit)?;
    let posts = state
        .engine
        .thread_posts(&ThreadRef::parse(&slug_or_id), &page)
        .await?;
    Ok(Json(posts))
}
