use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::config::AppConfig;
use crate::error::ApiError;

/// Guard for administrative operations. Requires
/// `Authorization: Bearer <ADMIN_TOKEN>`.
#[derive(Debug)]
pub struct AdminAuth;

#[async_trait]
impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    Arc<AppConfig>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AppConfig>::from_ref(state);
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::AdminToken)?;

        if token != config.admin_token {
            warn!("admin call with bad token");
            return Err(ApiError::AdminToken);
        }
        Ok(AdminAuth)
    }
}
