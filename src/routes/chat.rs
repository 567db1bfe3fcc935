// ABOUTME: Chat route handlers for AI conversation turns and history access
// ABOUTME: Provides REST endpoints for sending messages and listing conversations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! Chat routes.
//!
//! All handlers require JWT authentication. A chat turn persists the user
//! message, runs the reasoning loop under the request deadline, persists the
//! assistant reply, and returns it. Sending an unknown or foreign
//! `conversation_id` silently starts a fresh conversation; the client learns
//! the real id from the response.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::Claims;
use crate::context::build_llm_messages;
use crate::database::{ChatManager, MESSAGE_MAX_CHARS};
use crate::errors::AppError;
use crate::llm::{get_task_assistant_prompt, MessageRole};
use crate::logging::hash_user_id;
use crate::orchestrator::ChatOrchestrator;
use crate::resources::ServerResources;
use crate::tools::ToolGateway;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a chat turn
#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    /// Conversation to continue; omit to start a new one
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// The user's message
    pub message: String,
}

/// Response for a chat turn
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    /// Conversation the turn was recorded in
    pub conversation_id: String,
    /// Assistant reply text
    pub response: String,
    /// When the reply was produced (ISO 8601)
    pub timestamp: String,
}

/// Response for listing conversations
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationListResponse {
    /// List of conversations
    pub conversations: Vec<ConversationSummaryResponse>,
    /// Number of conversations returned
    pub total: usize,
}

/// Summary of a conversation for listing
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationSummaryResponse {
    /// Conversation ID
    pub id: String,
    /// Conversation title, if any
    pub title: Option<String>,
    /// Message count
    pub message_count: i64,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

/// A single message in a history response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message ID
    pub id: String,
    /// Sender role (user, assistant)
    pub role: String,
    /// Message content
    pub content: String,
    /// Creation timestamp
    pub created_at: String,
}

/// Response for a conversation's message history
#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesListResponse {
    /// Messages in chronological order
    pub messages: Vec<MessageResponse>,
}

/// Query parameters for listing conversations
#[derive(Debug, Deserialize, Default)]
pub struct ListConversationsQuery {
    /// Maximum number of conversations to return
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Offset for pagination
    #[serde(default)]
    pub offset: i64,
}

const fn default_limit() -> i64 {
    20
}

// ============================================================================
// Chat Routes
// ============================================================================

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat", post(Self::chat_turn))
            .route("/api/chat/conversations", get(Self::list_conversations))
            .route(
                "/api/chat/conversations/:conversation_id/messages",
                get(Self::get_messages),
            )
            .with_state(resources)
    }

    /// Extract and authenticate the user from the authorization header
    fn authenticate(
        headers: &axum::http::HeaderMap,
        resources: &Arc<ServerResources>,
    ) -> Result<Claims, AppError> {
        let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
        resources.auth.authenticate(auth_header)
    }

    /// Validate an incoming user message before anything is persisted
    fn validate_message(message: &str) -> Result<&str, AppError> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("message must not be empty"));
        }
        if trimmed.chars().count() > MESSAGE_MAX_CHARS {
            return Err(AppError::invalid_input(format!(
                "message must be at most {MESSAGE_MAX_CHARS} characters"
            )));
        }
        Ok(trimmed)
    }

    /// Run one chat turn
    async fn chat_turn(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Json(request): Json<ChatTurnRequest>,
    ) -> Result<Response, AppError> {
        let started = Instant::now();
        let claims = Self::authenticate(&headers, &resources)?;
        let user_hash = hash_user_id(&claims.sub);

        let message = Self::validate_message(&request.message)?;

        let chat = resources.database.chat();
        let conversation = chat
            .resolve_or_create(request.conversation_id.as_deref(), &claims.sub)
            .await?;

        // Durable before reasoning starts; a reasoning failure must not lose
        // what the user said.
        chat.append_message(&conversation.id, MessageRole::User, message)
            .await?;

        let history = chat.get_messages(&conversation.id).await?;
        let llm_messages = build_llm_messages(
            get_task_assistant_prompt(),
            &history,
            resources.config.context_budget,
        );

        let orchestrator = ChatOrchestrator::new(
            resources.llm.clone(),
            ToolGateway::new(&resources.database),
            resources.config.max_tool_iterations,
        );

        let deadline = std::time::Duration::from_secs(resources.config.request_deadline_secs);
        let reply = match tokio::time::timeout(deadline, orchestrator.run(&claims.sub, llm_messages))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    user = %user_hash,
                    conversation_id = %conversation.id,
                    deadline_secs = resources.config.request_deadline_secs,
                    "Chat turn exceeded the request deadline"
                );
                return Err(AppError::timeout("request deadline exceeded"));
            }
        };

        // The assistant turn is all-or-nothing: the reply is stored in one
        // append and only after the loop fully succeeded.
        let assistant_message = chat
            .append_message(&conversation.id, MessageRole::Assistant, &reply.content)
            .await?;

        info!(
            user = %user_hash,
            conversation_id = %conversation.id,
            tool_calls = reply.tool_calls_made,
            finish_reason = reply.finish_reason.as_deref().unwrap_or("unknown"),
            duration_ms = started.elapsed().as_millis() as u64,
            "Chat turn completed"
        );

        let response = ChatTurnResponse {
            conversation_id: conversation.id,
            response: assistant_message.content,
            timestamp: assistant_message.created_at,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// List the user's conversations
    async fn list_conversations(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Query(query): Query<ListConversationsQuery>,
    ) -> Result<Response, AppError> {
        let claims = Self::authenticate(&headers, &resources)?;

        let chat: ChatManager = resources.database.chat();
        let conversations = chat
            .list_conversations(&claims.sub, query.limit.clamp(1, 100), query.offset.max(0))
            .await?;

        let total = conversations.len();
        let response = ConversationListResponse {
            conversations: conversations
                .into_iter()
                .map(|c| ConversationSummaryResponse {
                    id: c.id,
                    title: c.title,
                    message_count: c.message_count,
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                })
                .collect(),
            total,
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Get a conversation's message history
    ///
    /// Unlike a chat turn, history reads are strict: an unknown or foreign
    /// conversation id is a 404.
    async fn get_messages(
        State(resources): State<Arc<ServerResources>>,
        headers: axum::http::HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Response, AppError> {
        let claims = Self::authenticate(&headers, &resources)?;

        let chat = resources.database.chat();
        let messages = chat.history(&conversation_id, &claims.sub).await?;

        let response = MessagesListResponse {
            messages: messages
                .into_iter()
                .map(|m| MessageResponse {
                    id: m.id,
                    role: m.role,
                    content: m.content,
                    created_at: m.created_at,
                })
                .collect(),
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
