use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub redis: String,
}

fn connection_label(connected: bool) -> String {
    if connected {
        "connected".to_string()
    } else {
        "disconnected".to_string()
    }
}

/// GET /health
///
/// Liveness only: always 200, with the collaborator status reported inline.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_ok = state.db.ping().await.is_ok();
    let redis_ok = state.cache.is_healthy().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: connection_label(db_ok),
        redis: connection_label(redis_ok),
    })
}

/// GET /health/ready
///
/// Ready once primary storage answers. The cache is optional and never
/// blocks readiness.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = state.db.ping().await.is_ok();
    let redis_ok = state.cache.is_healthy().await;
    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if db_ok { "ready" } else { "unavailable" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: connection_label(db_ok),
            redis: connection_label(redis_ok),
        }),
    )
}
