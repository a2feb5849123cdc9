// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use foliowatch_alert::Ingestor;
use foliowatch_config::model::GatewayConfig;
use foliowatch_core::FolioError;

use crate::auth::{AuthConfig, api_key_middleware};
use crate::handlers;

/// State for the public health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Ingestion pipeline; also the handle to the history store.
    pub ingestor: Ingestor,
    /// Retention used by the cleanup route.
    pub retention_days: i64,
    pub auth: AuthConfig,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(ingestor: Ingestor, retention_days: i64, auth: AuthConfig) -> Self {
        Self {
            ingestor,
            retention_days,
            auth,
            health: HealthState {
                start_time: Instant::now(),
            },
        }
    }
}

/// Builds the full route table.
///
/// - `POST /api/folios/update`
/// - `GET /api/folios/summary`
/// - `GET /api/folios/invoices`
/// - `GET /api/folios/creditnotes`
/// - `GET /api/folios/history`
/// - `DELETE /api/folios/history/cleanup`
/// - `GET /health` (no auth)
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/folios/update", post(handlers::post_update))
        .route("/api/folios/summary", get(handlers::get_summary))
        .route("/api/folios/invoices", get(handlers::get_invoices))
        .route("/api/folios/creditnotes", get(handlers::get_credit_notes))
        .route("/api/folios/history", get(handlers::get_history))
        .route("/api/folios/history/cleanup", delete(handlers::delete_cleanup))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            api_key_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds `host:port` and serves until `shutdown` is cancelled.
pub async fn serve(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), FolioError> {
    if state.auth.api_key.is_none() {
        tracing::warn!("gateway.api_key is not set, all /api requests will be rejected");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FolioError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    serve_listener(listener, state, shutdown).await
}

/// Serves on an already-bound listener until `shutdown` is cancelled.
pub async fn serve_listener(
    listener: tokio::net::TcpListener,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), FolioError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "gateway listening");
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| FolioError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}
