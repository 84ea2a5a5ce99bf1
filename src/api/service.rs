use axum::{extract::State, Json};

use crate::{error::Result, models::Status, AppState};

pub async fn status(State(state): State<AppState>) -> Result<Json<Status>> {
    let status = state.engine.status().await?;
    Ok(Json(status))
}

pub async fn clear(State(state): State<AppState>) -> Result<()> {
    state.engine.clear().await
}
