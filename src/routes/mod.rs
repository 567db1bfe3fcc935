// ABOUTME: HTTP route modules for the chat backend
// ABOUTME: Groups chat and health endpoints behind a single router constructor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! HTTP routes.

pub mod chat;
pub mod health;

use std::sync::Arc;

use axum::Router;

use crate::resources::ServerResources;

/// Build the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(chat::ChatRoutes::routes(resources.clone()))
        .merge(health::routes(resources))
}
