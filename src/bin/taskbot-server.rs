// ABOUTME: Server binary entry point
// ABOUTME: Wires configuration, database, auth, and the LLM provider, then serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! Taskbot server binary.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use taskbot_server::auth::AuthManager;
use taskbot_server::config::ServerConfig;
use taskbot_server::database::Database;
use taskbot_server::llm::{ChatProvider, LlmProvider};
use taskbot_server::logging::LoggingConfig;
use taskbot_server::resources::ServerResources;
use taskbot_server::server;

#[tokio::main]
async fn main() -> Result<()> {
    LoggingConfig::from_env().init();

    let config = ServerConfig::from_env()?;
    info!(
        host = %config.host,
        port = config.port,
        provider = %config.llm_provider,
        "Starting taskbot server"
    );

    let database = Database::new(&config.database_url).await?;
    let auth = AuthManager::new(&config.jwt_secret);

    let llm: Arc<dyn LlmProvider> = Arc::new(ChatProvider::from_env()?);
    info!(
        provider = llm.display_name(),
        model = llm.default_model(),
        "Reasoning backend ready"
    );

    let resources = Arc::new(ServerResources::new(database, auth, llm, config));
    server::serve(resources).await?;

    Ok(())
}
