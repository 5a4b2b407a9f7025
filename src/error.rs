use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Failure taxonomy shared by every endpoint. Store-level errors are
/// translated into this at the handler boundary and never crash a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    /// Always the same message, whatever actually went wrong with the
    /// credentials.
    #[error("Invalid user ID, email, or password")]
    Auth,
    /// Admin operation called without a valid bearer token.
    #[error("Invalid or missing admin token")]
    AdminToken,
    #[error("{0}")]
    NotFound(String),
    #[error("Service temporarily unavailable")]
    Unavailable,
    /// Ten draws from the EP+5-digit space all collided.
    #[error("Failed to generate unique user ID")]
    IdSpaceExhausted,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Auth | ApiError::AdminToken => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::IdSpaceExhausted | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            // Diagnostic text only; hashes and connection secrets never reach
            // an anyhow message in the first place.
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                Some(e.to_string())
            }
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            error: detail,
        };
        (status, Json(body)).into_response()
    }
}

/// Maps a store failure: connectivity loss becomes `Unavailable`, a unique
/// violation racing past an application-level check becomes `Conflict`,
/// anything else is internal.
pub fn store_error(e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            error!(error = %e, "store unavailable");
            ApiError::Unavailable
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            let message = match db.constraint() {
                Some("users_email_key") => "Email already registered",
                Some("users_mobile_key") => "Mobile number already registered",
                Some("users_user_id_key") => "Failed to generate unique user ID",
                _ => "Duplicate value",
            };
            ApiError::Conflict(message.to_string())
        }
        _ => ApiError::Internal(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_message_is_generic() {
        assert_eq!(ApiError::Auth.to_string(), "Invalid user ID, email, or password");
    }

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Auth.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn unavailable_is_distinct_from_validation() {
        let unavailable = ApiError::Unavailable.to_string();
        let validation = ApiError::Validation("Mobile number must be 10 digits".into()).to_string();
        assert_ne!(unavailable, validation);
        assert!(unavailable.contains("temporarily unavailable"));
    }

    #[test]
    fn pool_timeout_maps_to_unavailable() {
        match store_error(sqlx::Error::PoolTimedOut) {
            ApiError::Unavailable => {}
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn error_body_skips_empty_detail() {
        let body = ErrorBody {
            success: false,
            message: "User not found".into(),
            error: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"success":false,"message":"User not found"}"#);
    }
}
