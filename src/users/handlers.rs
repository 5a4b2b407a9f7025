use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::services::{normalize_email, validate_email, validate_full_name, validate_mobile},
    error::{store_error, ApiError},
    state::AppState,
    users::{
        dto::{ProfileResponse, UpdateProfileRequest},
        repo::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id", get(get_profile))
        .route("/users/:user_id", put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_user_id(&state.db, &user_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        success: true,
        message: None,
        user,
    }))
}

/// Profile update re-validates field shapes and re-checks email/mobile
/// uniqueness against other rows before writing.
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    payload.email = normalize_email(&payload.email);
    payload.full_name = payload.full_name.trim().to_string();
    payload.mobile = payload.mobile.trim().to_string();

    validate_full_name(&payload.full_name)?;
    validate_email(&payload.email)?;
    validate_mobile(&payload.mobile)?;

    if User::email_taken_by_other(&state.db, &payload.email, &user_id)
        .await
        .map_err(store_error)?
    {
        warn!(email = %payload.email, "profile update email taken");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    if User::mobile_taken_by_other(&state.db, &payload.mobile, &user_id)
        .await
        .map_err(store_error)?
    {
        warn!(mobile = %payload.mobile, "profile update mobile taken");
        return Err(ApiError::Conflict("Mobile number already registered".into()));
    }

    let user = User::update_profile(
        &state.db,
        &user_id,
        &payload.full_name,
        &payload.email,
        &payload.mobile,
    )
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.user_id, "profile updated");
    Ok(Json(ProfileResponse {
        success: true,
        message: Some("Profile updated successfully".into()),
        user,
    }))
}
