use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    engine::Creation,
    error::{AppError, Result},
    models::{validate_nickname, User, UserProfile},
    AppState,
};

/// Register a user; 409 lists the users already holding the nickname or email
pub async fn create_user(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
    Json(profile): Json<UserProfile>,
) -> Result<Creation<User, Vec<User>>> {
    validate_nickname(&nickname).map_err(|e| AppError::BadRequest(e.to_string()))?;
    profile
        .validate_new()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state.engine.create_user(&nickname, profile).await
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
) -> Result<Json<User>> {
    let user = state.engine.user(&nickname).await?;
    Ok(Json(user))
}

/// Partial profile update
pub async fn update_user(
    State(state): State<AppState>,
    Path(nickname): Path<String>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<User>> {
    profile
        .validate_update()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state.engine.update_user(&nickname, profile).await?;
    Ok(Json(user))
}
