//! Service probes: liveness, readiness against the store, build version.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize)]
struct Probe {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<StoreCheck>,
}

#[derive(Serialize)]
struct StoreCheck {
    reachable: bool,
    latency_ms: u128,
}

#[derive(Serialize)]
struct BuildInfo {
    name: &'static str,
    version: &'static str,
}

async fn health() -> Json<Probe> {
    Json(Probe {
        status: "ok",
        store: None,
    })
}

/// 503 until the store answers a ping.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Probe>) {
    let started = Instant::now();
    let result = state.store.ping().await;
    let latency_ms = started.elapsed().as_millis();
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(Probe {
                status: "ok",
                store: Some(StoreCheck { reachable: true, latency_ms }),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, latency_ms, "store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Probe {
                    status: "degraded",
                    store: Some(StoreCheck { reachable: false, latency_ms }),
                }),
            )
        }
    }
}

async fn version() -> Json<BuildInfo> {
    Json(BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
