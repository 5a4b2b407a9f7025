use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, SignupRequest},
        password::{hash_password, verify_password},
        services::{
            allocate_user_id, normalize_email, normalize_login_identifier,
            normalize_referral_code, validate_signup,
        },
    },
    error::{store_error, ApiError},
    referrals::repo::credit_bonus,
    state::AppState,
    users::repo::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = normalize_email(&payload.email);
    payload.full_name = payload.full_name.trim().to_string();
    payload.mobile = payload.mobile.trim().to_string();

    validate_signup(&payload)?;

    if User::email_exists(&state.db, &payload.email)
        .await
        .map_err(store_error)?
    {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    if User::mobile_exists(&state.db, &payload.mobile)
        .await
        .map_err(store_error)?
    {
        warn!(mobile = %payload.mobile, "mobile already registered");
        return Err(ApiError::Conflict("Mobile number already registered".into()));
    }

    // An unknown referral code fails the whole signup; it is never silently
    // dropped.
    let referral_id = normalize_referral_code(payload.referral_id.as_deref());
    if let Some(code) = &referral_id {
        if !User::user_id_exists(&state.db, code)
            .await
            .map_err(store_error)?
        {
            warn!(referral_id = %code, "unknown referral code");
            return Err(ApiError::Conflict("Invalid referral code".into()));
        }
    }

    let user_id = allocate_user_id(&state.db).await?;
    let hash = hash_password(&payload.password).map_err(ApiError::Internal)?;

    let user = User::create(
        &state.db,
        &user_id,
        &payload.full_name,
        &payload.email,
        &payload.mobile,
        &hash,
        referral_id.as_deref(),
    )
    .await
    .map_err(store_error)?;

    // Best-effort: a failed credit is logged and corrected later by the
    // reconciliation pass, never surfaced to the signee.
    if let Some(referrer) = &referral_id {
        if let Err(e) = credit_bonus(&state.db, referrer, state.config.referral_bonus).await {
            error!(error = %e, referrer = %referrer, "referral bonus credit failed");
        }
    }

    info!(user_id = %user.user_id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".into(),
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    // Emails are stored lowercased, so an email identifier gets the same
    // normalization before the lookup.
    let identifier = normalize_login_identifier(&payload.user_id);

    // Not-found and bad-password deliberately share one message.
    let user = User::find_by_identifier(&state.db, &identifier)
        .await
        .map_err(store_error)?
        .ok_or_else(|| {
            warn!(identifier = %identifier, "login unknown identifier");
            ApiError::Auth
        })?;

    let ok = verify_password(&payload.password, &user.password_hash).map_err(ApiError::Internal)?;
    if !ok {
        warn!(user_id = %user.user_id, "login invalid password");
        return Err(ApiError::Auth);
    }

    info!(user_id = %user.user_id, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        user,
    }))
}
