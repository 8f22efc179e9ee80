//! HTTP server for health, readiness, and metrics endpoints

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

use crate::metrics::encode_metrics;

/// Default staleness threshold in seconds (5 minutes)
const DEFAULT_STALE_THRESHOLD_SECS: u64 = 300;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub feed: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_secs: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

/// Shared state for health endpoints
#[derive(Clone)]
pub struct ServerState {
    pub feed_name: String,
    pub connected: Arc<AtomicBool>,
    /// Unix timestamp (seconds) of last feed activity, 0 if none yet
    pub last_activity_epoch_secs: Arc<AtomicU64>,
    pub stale_threshold_secs: u64,
}

impl ServerState {
    pub fn new(
        feed_name: impl Into<String>,
        connected: Arc<AtomicBool>,
        last_activity_epoch_secs: Arc<AtomicU64>,
    ) -> Self {
        Self {
            feed_name: feed_name.into(),
            connected,
            last_activity_epoch_secs,
            stale_threshold_secs: DEFAULT_STALE_THRESHOLD_SECS,
        }
    }

    pub fn with_stale_threshold(mut self, secs: u64) -> Self {
        self.stale_threshold_secs = secs;
        self
    }

    /// Seconds since last activity and whether that exceeds the threshold.
    /// Before the first message there is nothing to be stale against.
    fn idleness(&self) -> (Option<u64>, bool) {
        let last = self.last_activity_epoch_secs.load(Ordering::SeqCst);
        if last == 0 {
            return (None, false);
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let idle = now.saturating_sub(last);
        (Some(idle), idle > self.stale_threshold_secs)
    }
}

/// Health endpoint - 200 while the process is live and the feed is fresh,
/// 503 once a connected feed has gone stale
async fn health(State(state): State<ServerState>) -> (StatusCode, Json<HealthResponse>) {
    let connected = state.connected.load(Ordering::SeqCst);
    let (idle_secs, stale) = state.idleness();

    let unhealthy = stale && connected;
    let status_code = if unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        Json(HealthResponse {
            status: if unhealthy { "stale" } else { "ok" }.to_string(),
            feed: state.feed_name.clone(),
            connected,
            idle_secs,
            stale,
        }),
    )
}

/// Ready endpoint - 200 only when connected and not stale
async fn ready(State(state): State<ServerState>) -> (StatusCode, Json<HealthResponse>) {
    let connected = state.connected.load(Ordering::SeqCst);
    let (idle_secs, stale) = state.idleness();

    let ready = connected && !stale;
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let status = if !connected {
        "not_connected"
    } else if stale {
        "stale"
    } else {
        "ready"
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            feed: state.feed_name.clone(),
            connected,
            idle_secs,
            stale,
        }),
    )
}

/// Metrics endpoint - Prometheus text format
async fn metrics() -> impl IntoResponse {
    match encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

/// Create the health server router
pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Run the health server
pub async fn run_server(addr: SocketAddr, state: ServerState) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
