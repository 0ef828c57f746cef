// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 telemetry-stats contributors. All rights reserved.

use crate::aggregate::{AnalyticsRequest, AnalyticsResult};
use crate::dataset::Dataset;

use axum::{
    extract::State,
    http::{HeaderValue, Request},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub struct ServerState {
    pub version: String,
    pub dataset: Arc<Dataset>,
    pub started_at: SystemTime,
    pub start_instant: Instant,
}

impl ServerState {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            dataset: Arc::new(dataset),
            started_at: SystemTime::now(),
            start_instant: Instant::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub version: String,
    pub records: usize,
    pub started_at_unix: u64,
    pub uptime_seconds: u64,
}

/// Fresh UUID v4 for requests that arrive without an `x-request-id`.
#[derive(Clone, Copy, Default)]
struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", post(analytics))
        .route("/api/info", get(server_info))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
}

async fn analytics(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<AnalyticsRequest>,
) -> Json<AnalyticsResult> {
    let t0 = Instant::now();
    let result = req.evaluate(state.dataset.records());
    debug!(
        regions = req.regions.len(),
        threshold_ms = req.threshold_ms,
        breaches = result.breaches,
        elapsed_us = t0.elapsed().as_micros() as u64,
        "analytics computed"
    );
    Json(result)
}

async fn server_info(State(state): State<Arc<ServerState>>) -> Json<ServiceInfo> {
    let since_epoch = state
        .started_at
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    Json(ServiceInfo {
        version: state.version.clone(),
        records: state.dataset.len(),
        started_at_unix: since_epoch.as_secs(),
        uptime_seconds: state.start_instant.elapsed().as_secs(),
    })
}

async fn health() -> &'static str {
    "OK"
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, records = state.dataset.len(), "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
