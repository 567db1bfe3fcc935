// ABOUTME: OpenRouter LLM provider using the OpenAI-compatible chat completions API
// ABOUTME: Handles request serialization, tool call extraction, and upstream error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! # `OpenRouter` Provider
//!
//! Default reasoning backend. `OpenRouter` speaks the `OpenAI` wire format
//! and routes to many underlying models, so one integration covers them all.
//!
//! ## Configuration
//!
//! - `OPENROUTER_API_KEY`: API key (required)
//! - `TASKBOT_LLM_MODEL`: Model to use (default: `openai/gpt-4o-mini`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use super::{
    ChatMessage, ChatRequest, ChatResponseWithTools, FunctionCall, LlmCapabilities, LlmProvider,
    TokenUsage, Tool,
};
use crate::errors::{AppError, ErrorCode};

/// Environment variable for the OpenRouter API key
const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Base URL for the OpenRouter API
const BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model when none is configured
const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiToolCall {
    #[allow(dead_code)]
    id: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

// ============================================================================
// Provider
// ============================================================================

/// `OpenRouter` chat completion provider
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    default_model: String,
}

impl OpenRouterProvider {
    /// Create a provider from environment configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `OPENROUTER_API_KEY` is not set or
    /// the HTTP client cannot be constructed
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = env::var(API_KEY_ENV)
            .map_err(|_| AppError::config(format!("{API_KEY_ENV} environment variable not set")))?;
        let default_model =
            crate::config::LlmProviderType::model_from_env().unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        Self::new(api_key, default_model)
    }

    /// Create a provider with explicit credentials
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(api_key: String, default_model: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            default_model,
        })
    }

    fn convert_tools(tools: &[Tool]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .flat_map(|tool| {
                tool.function_declarations.iter().map(|func| OpenAiTool {
                    tool_type: "function".to_owned(),
                    function: OpenAiFunction {
                        name: func.name.clone(),
                        description: func.description.clone(),
                        parameters: func.parameters.clone(),
                    },
                })
            })
            .collect()
    }

    fn convert_tool_calls(tool_calls: &[OpenAiToolCall]) -> Vec<FunctionCall> {
        tool_calls
            .iter()
            .map(|call| {
                let args: Value =
                    serde_json::from_str(&call.function.arguments).unwrap_or_default();
                FunctionCall {
                    name: call.function.name.clone(),
                    args,
                }
            })
            .collect()
    }

    // Char-based so a multi-byte body can never split mid-character
    fn truncate_for_log(body: &str) -> String {
        body.chars().take(500).collect()
    }

    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        let detail = serde_json::from_str::<OpenAiErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.chars().take(200).collect());

        match status.as_u16() {
            401 | 403 => {
                AppError::external_service("OpenRouter", format!("API key rejected: {detail}"))
            }
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                "AI model rate limit reached. Please wait a moment and try again.",
            ),
            400 => AppError::external_service(
                "OpenRouter",
                format!("Request rejected by upstream: {detail}"),
            ),
            _ => AppError::external_service("OpenRouter", format!("API error ({status}): {detail}")),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    fn display_name(&self) -> &'static str {
        "OpenRouter"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::tool_capable()
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(skip(self, request, tools), fields(model = %request.model.as_deref().unwrap_or(&self.default_model)))]
    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatResponseWithTools, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);

        let openai_request = OpenAiRequest {
            model: model.to_owned(),
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            tools: tools.as_ref().map(|t| Self::convert_tools(t)),
            tool_choice: tools.as_ref().map(|_| "auto".to_owned()),
        };

        let response = self
            .client
            .post(format!("{BASE_URL}/chat/completions"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to OpenRouter: {e}");
                AppError::external_service("OpenRouter", format!("Failed to connect: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read OpenRouter response: {e}");
            AppError::external_service("OpenRouter", format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            warn!("OpenRouter returned error status {status}");
            return Err(Self::parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse OpenRouter response: {e} - body: {}",
                Self::truncate_for_log(&body)
            );
            AppError::external_service("OpenRouter", format!("Failed to parse response: {e}"))
        })?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service("OpenRouter", "API returned no choices"))?;

        let function_calls = choice
            .message
            .tool_calls
            .map(|calls| Self::convert_tool_calls(&calls));

        debug!(
            "OpenRouter response: content_len={:?}, tool_calls={:?}, finish_reason={:?}",
            choice.message.content.as_ref().map(String::len),
            function_calls.as_ref().map(Vec::len),
            choice.finish_reason
        );

        Ok(ChatResponseWithTools {
            content: choice.message.content,
            function_calls,
            model: openai_response.model,
            usage: openai_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let response = self
            .client
            .get(format!("{BASE_URL}/models"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| AppError::external_service("OpenRouter", format!("Failed to connect: {e}")))?;

        Ok(response.status().is_success())
    }
}
