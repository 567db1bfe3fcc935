// ABOUTME: HTTP server assembly and lifecycle
// ABOUTME: Builds the router with tracing and request-id middleware and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! Server assembly.
//!
//! Every response carries an `x-request-id` header so log lines and client
//! reports can be correlated. The server drains on SIGINT/SIGTERM.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::routes;

/// Build the application router with middleware applied
///
/// The request-id layer runs outermost so every request span, and therefore
/// every log line emitted inside a handler, carries the correlation id.
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    routes::router(resources)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("unknown");
            info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Bind and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails
pub async fn serve(resources: Arc<ServerResources>) -> AppResult<()> {
    let bind_address = resources.config.bind_address();
    let router = build_router(resources);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind {bind_address}: {e}")))?;

    info!("Listening on {bind_address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
