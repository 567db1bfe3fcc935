// ABOUTME: Reasoning orchestrator running the bounded model/tool exchange loop
// ABOUTME: Executes model-requested tool calls and feeds results back until a text reply emerges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! # Reasoning Orchestrator
//!
//! One chat turn may require several model exchanges: the model asks for a
//! tool, the gateway runs it, and the result goes back to the model until it
//! produces plain text. The loop is bounded so a model that keeps requesting
//! tools cannot spin forever. Tool failures are reported back to the model
//! as data, never surfaced as request errors; only a failure of the model
//! call itself aborts the turn.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppResult;
use crate::llm::{
    ChatMessage, ChatRequest, FunctionCall, FunctionResponse, LlmProvider, TokenUsage,
};
use crate::tools::ToolGateway;

/// Default bound on model exchanges within a single chat turn
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 5;

/// Reply shown when the model exhausts its tool budget without answering
const EXHAUSTED_REPLY: &str =
    "I wasn't able to finish that request. Please try again, or break it into smaller steps.";

/// Final outcome of a reasoning turn
#[derive(Debug)]
pub struct AgentReply {
    /// Assistant text to persist and return to the user
    pub content: String,
    /// Token usage from the final model exchange, if reported
    pub usage: Option<TokenUsage>,
    /// Finish reason from the final model exchange
    pub finish_reason: Option<String>,
    /// Number of tool calls executed during the turn
    pub tool_calls_made: usize,
}

/// Drives the model/tool exchange loop for chat turns
pub struct ChatOrchestrator {
    provider: Arc<dyn LlmProvider>,
    gateway: ToolGateway,
    max_iterations: usize,
}

impl ChatOrchestrator {
    /// Create an orchestrator with the given reasoning backend and gateway
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, gateway: ToolGateway, max_iterations: usize) -> Self {
        Self {
            provider,
            gateway,
            max_iterations: max_iterations.max(1),
        }
    }

    /// Run the reasoning loop over an assembled message window.
    ///
    /// `messages` already contains the system prompt and truncated history;
    /// the loop appends tool exchanges to its own working copy only, so the
    /// stored conversation never sees intermediate traffic.
    ///
    /// # Errors
    ///
    /// Returns an error only when the model call itself fails; tool errors
    /// are folded into the exchange as results the model can explain.
    pub async fn run(&self, user_id: &str, messages: Vec<ChatMessage>) -> AppResult<AgentReply> {
        let mut llm_messages = messages;
        let tools = ToolGateway::declarations();
        let mut tool_calls_made = 0;

        for iteration in 0..self.max_iterations {
            let request = ChatRequest::new(llm_messages.clone());
            let response = self
                .provider
                .complete_with_tools(&request, Some(tools.clone()))
                .await?;

            if let Some(ref function_calls) = response.function_calls {
                if !function_calls.is_empty() {
                    info!(
                        iteration,
                        count = function_calls.len(),
                        "Executing tool calls"
                    );
                    tool_calls_made += function_calls.len();

                    let responses = self.execute_function_calls(user_id, function_calls).await;

                    if let Some(ref text) = response.content {
                        if !text.is_empty() {
                            llm_messages.push(ChatMessage::assistant(text));
                        }
                    }
                    Self::add_function_responses(&mut llm_messages, &responses);
                    continue;
                }
            }

            let content = match response.content {
                Some(text) if !text.trim().is_empty() => text,
                _ => {
                    warn!("Model returned an empty reply");
                    EXHAUSTED_REPLY.to_owned()
                }
            };

            return Ok(AgentReply {
                content,
                usage: response.usage,
                finish_reason: response.finish_reason,
                tool_calls_made,
            });
        }

        warn!(
            max_iterations = self.max_iterations,
            "Tool iteration budget exhausted without a text reply"
        );
        Ok(AgentReply {
            content: EXHAUSTED_REPLY.to_owned(),
            usage: None,
            finish_reason: Some("max_iterations".to_owned()),
            tool_calls_made,
        })
    }

    /// Execute a batch of function calls, mapping tool failures to error
    /// payloads the model can read
    async fn execute_function_calls(
        &self,
        user_id: &str,
        function_calls: &[FunctionCall],
    ) -> Vec<FunctionResponse> {
        let mut responses = Vec::with_capacity(function_calls.len());
        for call in function_calls {
            info!(tool = %call.name, "Executing tool");
            let payload = match self.gateway.invoke(user_id, call).await {
                Ok(result) => result,
                Err(tool_error) => {
                    warn!(tool = %call.name, error = %tool_error, "Tool call failed");
                    tool_error.to_response()
                }
            };
            responses.push(FunctionResponse {
                name: call.name.clone(),
                response: payload,
            });
        }
        responses
    }

    /// Add function responses as user messages for the next model exchange
    fn add_function_responses(
        llm_messages: &mut Vec<ChatMessage>,
        function_responses: &[FunctionResponse],
    ) {
        for func_response in function_responses {
            let response_text =
                serde_json::to_string(&func_response.response).unwrap_or_else(|_| "{}".to_owned());
            llm_messages.push(ChatMessage::user(format!(
                "[Tool Result for {}]: {}",
                func_response.name, response_text
            )));
        }
    }
}
