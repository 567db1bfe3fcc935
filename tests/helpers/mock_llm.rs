// ABOUTME: Scripted mock LLM provider for orchestrator and route tests
// ABOUTME: Replays queued responses and records every request for assertions

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use taskbot_server::errors::AppError;
use taskbot_server::llm::{
    ChatRequest, ChatResponseWithTools, FunctionCall, LlmCapabilities, LlmProvider, Tool,
};

/// Mock provider that replays a scripted sequence of responses.
///
/// Every incoming request is recorded so tests can assert on the messages
/// the orchestrator actually sent.
pub struct MockLlmProvider {
    responses: Mutex<VecDeque<Result<ChatResponseWithTools, AppError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    delay: Option<Duration>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Delay every completion, for deadline tests
    #[allow(dead_code)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a plain text reply
    pub fn push_text(&self, text: &str) {
        self.push_response(Ok(ChatResponseWithTools {
            content: Some(text.to_owned()),
            function_calls: None,
            model: "mock".to_owned(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        }));
    }

    /// Queue a reply requesting a single tool call
    #[allow(dead_code)]
    pub fn push_tool_call(&self, name: &str, args: serde_json::Value) {
        self.push_response(Ok(ChatResponseWithTools {
            content: None,
            function_calls: Some(vec![FunctionCall {
                name: name.to_owned(),
                args,
            }]),
            model: "mock".to_owned(),
            usage: None,
            finish_reason: Some("tool_calls".to_owned()),
        }));
    }

    /// Queue a provider failure
    #[allow(dead_code)]
    pub fn push_error(&self, error: AppError) {
        self.push_response(Err(error));
    }

    /// Queue a reply with neither text nor tool calls
    #[allow(dead_code)]
    pub fn push_response_empty(&self) {
        self.push_response(Ok(ChatResponseWithTools {
            content: None,
            function_calls: None,
            model: "mock".to_owned(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        }));
    }

    fn push_response(&self, response: Result<ChatResponseWithTools, AppError>) {
        self.responses
            .lock()
            .expect("responses lock poisoned")
            .push_back(response);
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn display_name(&self) -> &'static str {
        "Mock LLM"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::tool_capable()
    }

    fn default_model(&self) -> &str {
        "mock"
    }

    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        _tools: Option<Vec<Tool>>,
    ) -> Result<ChatResponseWithTools, AppError> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .expect("responses lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(AppError::internal("mock llm script exhausted")))
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}
