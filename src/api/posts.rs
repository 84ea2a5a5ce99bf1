use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::{Post, PostInfo, Related, UpdatePostRequest},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct DetailsQuery {
    #[serde(default)]
    related: String,
}

fn post_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid post id: {}", raw)))
}

/// Post with optional `related=user,thread,forum` snapshots
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DetailsQuery>,
) -> Result<Json<PostInfo>> {
    let id = post_id(&id)?;
    let info = state
        .engine
        .post_info(id, Related::parse(&query.related))
        .await?;
    Ok(Json(info))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<Post>> {
    let id = post_id(&id)?;
    let post = state.engine.update_post(id, &req.message).await?;
    Ok(Json(post))
}
