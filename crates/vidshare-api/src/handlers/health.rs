//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let database_ok = matches!(state.db.health_check().await, Ok(true));
    let outbox_pending = if database_ok {
        state
            .outbox_repo
            .pending_count(state.config.worker.max_attempts)
            .await
            .ok()
    } else {
        None
    };

    let (realtime, ws_connections) = match state.realtime.channel.get() {
        Ok(channel) => ("running", channel.connection_count()),
        Err(_) => ("not_initialized", 0),
    };

    let status = if database_ok && realtime == "running" {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: status.to_string(),
        database: if database_ok { "connected" } else { "unreachable" }.to_string(),
        realtime: realtime.to_string(),
        ws_connections,
        online_users: state.realtime.presence.online_count(),
        outbox_pending,
        metrics: state.realtime.metrics.snapshot(),
    }))
}
