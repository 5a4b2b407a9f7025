use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AdminAuth,
    error::{store_error, ApiError},
    referrals::{
        dto::{ReconcileResponse, ReferralStatsResponse},
        repo,
    },
    state::AppState,
    users::repo::User,
};

pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/users/:user_id/referral-stats", get(referral_stats))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/update-earnings", post(update_earnings))
}

#[instrument(skip(state))]
pub async fn referral_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ReferralStatsResponse>, ApiError> {
    let user = User::find_by_user_id(&state.db, &user_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let referrals = repo::children_of(&state.db, &user.user_id)
        .await
        .map_err(store_error)?;
    let total_referrals = referrals.len() as i64;

    Ok(Json(ReferralStatsResponse {
        success: true,
        total_referrals,
        referral_earnings: total_referrals * state.config.referral_bonus,
        total_earning: user.total_earning,
        referrals,
    }))
}

/// Administrative reconciliation. Guarded by [`AdminAuth`]; the drift pass
/// itself lives in [`repo::reconcile`].
#[instrument(skip(state))]
pub async fn update_earnings(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let updated_count = repo::reconcile(&state.db, state.config.referral_bonus)
        .await
        .map_err(store_error)?;

    info!(updated_count, "admin reconciliation run");
    Ok(Json(ReconcileResponse {
        success: true,
        message: "Earnings updated successfully".into(),
        updated_count,
    }))
}
