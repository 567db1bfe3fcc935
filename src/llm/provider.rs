// ABOUTME: Unified LLM provider selector for runtime provider switching
// ABOUTME: Abstracts over OpenRouter and Gemini based on environment configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! # LLM Provider Selector
//!
//! Chooses the reasoning backend at startup from `TASKBOT_LLM_PROVIDER`:
//! - `openrouter` (default): requires `OPENROUTER_API_KEY`
//! - `gemini`: requires `GEMINI_API_KEY`

use async_trait::async_trait;
use tracing::{debug, info};

use super::{
    ChatRequest, ChatResponseWithTools, GeminiProvider, LlmCapabilities, LlmProvider,
    OpenRouterProvider, Tool,
};
use crate::config::LlmProviderType;
use crate::errors::AppError;

/// Unified chat provider that wraps the configured backend
///
/// This enum provides a consistent interface regardless of which
/// underlying provider is configured.
pub enum ChatProvider {
    /// `OpenRouter` provider routing to many `OpenAI`-compatible models
    OpenRouter(OpenRouterProvider),
    /// Google Gemini provider
    Gemini(GeminiProvider),
}

impl ChatProvider {
    /// Create a provider from environment configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the required API key environment variable for
    /// the selected provider is missing
    pub fn from_env() -> Result<Self, AppError> {
        let provider_type = LlmProviderType::from_env();

        info!(
            "Initializing LLM provider: {} (set {} to change)",
            provider_type,
            LlmProviderType::ENV_VAR
        );

        let provider = match provider_type {
            LlmProviderType::OpenRouter => Self::OpenRouter(OpenRouterProvider::from_env()?),
            LlmProviderType::Gemini => Self::Gemini(GeminiProvider::from_env()?),
        };

        debug!(
            "Provider {} initialized with model: {}",
            provider.display_name(),
            provider.default_model()
        );
        Ok(provider)
    }

    fn inner(&self) -> &dyn LlmProvider {
        match self {
            Self::OpenRouter(provider) => provider,
            Self::Gemini(provider) => provider,
        }
    }
}

#[async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn display_name(&self) -> &'static str {
        self.inner().display_name()
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.inner().capabilities()
    }

    fn default_model(&self) -> &str {
        self.inner().default_model()
    }

    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatResponseWithTools, AppError> {
        self.inner().complete_with_tools(request, tools).await
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        self.inner().health_check().await
    }
}
