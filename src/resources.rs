// ABOUTME: Centralized resource container for dependency injection
// ABOUTME: Holds shared database, auth, and LLM handles behind Arc for the route layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! # Server Resources Module
//!
//! Centralized resource container for dependency injection. Expensive
//! objects (connection pool, auth manager, HTTP clients inside the LLM
//! provider) are created once at startup and shared across handlers.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::llm::LlmProvider;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Shared database handle
    pub database: Arc<Database>,
    /// Token verification and minting
    pub auth: Arc<AuthManager>,
    /// Configured reasoning backend
    pub llm: Arc<dyn LlmProvider>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(
        database: Database,
        auth: AuthManager,
        llm: Arc<dyn LlmProvider>,
        config: ServerConfig,
    ) -> Self {
        Self {
            database: Arc::new(database),
            auth: Arc::new(auth),
            llm,
            config: Arc::new(config),
        }
    }
}
