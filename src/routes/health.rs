// ABOUTME: Health check endpoint reporting service and database status
// ABOUTME: Used by load balancers and deploy tooling to gate traffic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::resources::ServerResources;

/// Health check payload
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,
    /// Database connectivity
    pub database: String,
}

/// Build health routes
#[must_use]
pub fn routes(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .with_state(resources)
}

async fn health(State(resources): State<Arc<ServerResources>>) -> impl IntoResponse {
    let database_ok = resources.database.health_check().await.is_ok();

    let (status, body) = if database_ok {
        (
            StatusCode::OK,
            HealthResponse {
                status: "ok".to_owned(),
                database: "ok".to_owned(),
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "degraded".to_owned(),
                database: "unavailable".to_owned(),
            },
        )
    };

    (status, Json(body))
}
