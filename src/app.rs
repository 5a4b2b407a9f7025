use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use time::OffsetDateTime;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::instrument;

use crate::error::{store_error, ApiError};
use crate::state::AppState;
use crate::{auth, referrals, tree, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(users::router())
                .merge(referrals::router())
                .merge(tree::router())
                .route("/test-db", get(test_db)),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "3001".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    success: bool,
    message: String,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "refpay backend is running".into(),
        timestamp: OffsetDateTime::now_utc(),
    })
}

#[derive(Debug, Serialize)]
struct TestDbResponse {
    success: bool,
    message: String,
    #[serde(with = "time::serde::rfc3339")]
    time: OffsetDateTime,
}

/// Store liveness: round-trips the database clock.
#[instrument(skip(state))]
async fn test_db(State(state): State<AppState>) -> Result<Json<TestDbResponse>, ApiError> {
    let now: OffsetDateTime = sqlx::query_scalar("SELECT now()")
        .fetch_one(&state.db)
        .await
        .map_err(store_error)?;

    Ok(Json(TestDbResponse {
        success: true,
        message: "Database connected successfully".into(),
        time: now,
    }))
}
