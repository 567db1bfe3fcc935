// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Provides database fixtures, server resources with a mock LLM, and token minting

pub mod axum_test;
pub mod mock_llm;

use std::sync::Arc;

use tempfile::TempDir;

use taskbot_server::auth::AuthManager;
use taskbot_server::config::{LlmProviderType, ServerConfig};
use taskbot_server::database::Database;
use taskbot_server::llm::LlmProvider;
use taskbot_server::resources::ServerResources;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// A file-backed test database in a temp directory.
///
/// Keep the `TempDir` alive for as long as the database is in use.
pub struct TestDatabase {
    pub database: Database,
    pub dir: TempDir,
}

impl TestDatabase {
    pub fn url(&self) -> String {
        format!("sqlite:{}/test.db", self.dir.path().display())
    }
}

/// Create a migrated database backed by a temp file
pub async fn test_database() -> TestDatabase {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite:{}/test.db", dir.path().display());
    let database = Database::new(&url).await.expect("Failed to open database");
    TestDatabase { database, dir }
}

/// Server configuration suitable for tests (no environment access)
#[allow(dead_code)]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
        database_url: "unused".to_owned(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        llm_provider: LlmProviderType::OpenRouter,
        context_budget: 2000,
        request_deadline_secs: 5,
        max_tool_iterations: 5,
    }
}

/// Build server resources around an existing database and LLM provider
#[allow(dead_code)]
pub fn test_resources(
    database: Database,
    llm: Arc<dyn LlmProvider>,
    config: ServerConfig,
) -> Arc<ServerResources> {
    let auth = AuthManager::new(TEST_JWT_SECRET);
    Arc::new(ServerResources::new(database, auth, llm, config))
}

/// Mint a bearer token for a test user
#[allow(dead_code)]
pub fn bearer_token(user_id: &str) -> String {
    let auth = AuthManager::new(TEST_JWT_SECRET);
    let token = auth
        .generate_token(user_id, Some(&format!("{user_id}@example.com")), 3600)
        .expect("Failed to mint token");
    format!("Bearer {token}")
}
