// ABOUTME: Database operations for chat conversations and messages
// ABOUTME: Handles conversation resolution, serialized appends, and history reads with per-user isolation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

use crate::errors::{AppError, AppResult};
use crate::llm::MessageRole;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Maximum length of a user message in characters, after trimming
pub const MESSAGE_MAX_CHARS: usize = 2000;

// ============================================================================
// Database Record Types
// ============================================================================

/// Database representation of a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Unique conversation ID
    pub id: String,
    /// User ID who owns the conversation
    pub user_id: String,
    /// Optional conversation title
    pub title: Option<String>,
    /// When the conversation was created (ISO 8601)
    pub created_at: String,
    /// When the conversation was last updated (ISO 8601)
    pub updated_at: String,
}

/// Database representation of a chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Unique message ID
    pub id: String,
    /// Conversation ID this message belongs to
    pub conversation_id: String,
    /// Role of the message sender (user, assistant)
    pub role: String,
    /// Message content
    pub content: String,
    /// When the message was created (ISO 8601)
    pub created_at: String,
}

/// Summary of a conversation for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation ID
    pub id: String,
    /// Conversation title, if one has been set
    pub title: Option<String>,
    /// Number of messages in the conversation
    pub message_count: i64,
    /// When the conversation was created
    pub created_at: String,
    /// When the conversation was last updated
    pub updated_at: String,
}

// ============================================================================
// Chat Manager
// ============================================================================

/// Chat database operations manager
pub struct ChatManager {
    pool: SqlitePool,
}

impl ChatManager {
    /// Create a new chat manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Conversation Operations
    // ========================================================================

    /// Create a new conversation owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_conversation(&self, user_id: &str) -> AppResult<ConversationRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            r"
            INSERT INTO conversations (id, user_id, title, created_at, updated_at)
            VALUES ($1, $2, NULL, $3, $3)
            ",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create conversation: {e}")))?;

        Ok(ConversationRecord {
            id,
            user_id: user_id.to_owned(),
            title: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a conversation by ID, scoped to its owner
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_conversation(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> AppResult<Option<ConversationRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, title, created_at, updated_at
            FROM conversations
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation: {e}")))?;

        Ok(row.map(|r| ConversationRecord {
            id: r.get("id"),
            user_id: r.get("user_id"),
            title: r.get("title"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }

    /// Resolve a client-supplied conversation ID to a conversation the user
    /// owns, creating a fresh one when the ID is absent, unknown, or belongs
    /// to another user.
    ///
    /// A stale or foreign ID is never an error: the client simply continues
    /// in a new conversation and learns its ID from the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn resolve_or_create(
        &self,
        conversation_id: Option<&str>,
        user_id: &str,
    ) -> AppResult<ConversationRecord> {
        if let Some(id) = conversation_id {
            if let Some(existing) = self.get_conversation(id, user_id).await? {
                return Ok(existing);
            }
        }
        self.create_conversation(user_id).await
    }

    /// List conversations for a user with pagination, most recently
    /// updated first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_conversations(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ConversationSummary>> {
        let rows = sqlx::query(
            r"
            SELECT c.id, c.title, c.created_at, c.updated_at,
                   COUNT(m.id) as message_count
            FROM conversations c
            LEFT JOIN messages m ON m.conversation_id = c.id
            WHERE c.user_id = $1
            GROUP BY c.id
            ORDER BY c.updated_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list conversations: {e}")))?;

        let summaries = rows
            .into_iter()
            .map(|r| ConversationSummary {
                id: r.get("id"),
                title: r.get("title"),
                message_count: r.get("message_count"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            })
            .collect();

        Ok(summaries)
    }

    // ========================================================================
    // Message Operations
    // ========================================================================

    /// Append a message to a conversation.
    ///
    /// The enclosing transaction first touches the conversation row, which
    /// takes the write lock and serializes concurrent appends to the same
    /// conversation. The message timestamp is captured only after the lock
    /// is held, so read order matches append order.
    ///
    /// User messages are validated to be non-empty and at most
    /// [`MESSAGE_MAX_CHARS`] characters after trimming.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-bounds user message, or a
    /// database error if the conversation does not exist or a query fails
    pub async fn append_message(
        &self,
        conversation_id: &str,
        role: MessageRole,
        content: &str,
    ) -> AppResult<MessageRecord> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::invalid_input("message must not be empty"));
        }
        if role == MessageRole::User && content.chars().count() > MESSAGE_MAX_CHARS {
            return Err(AppError::invalid_input(format!(
                "message must be at most {MESSAGE_MAX_CHARS} characters"
            )));
        }

        let id = Uuid::new_v4().to_string();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        // Acquire the conversation's write lock before timestamping, so
        // created_at order always matches the order appends serialized in.
        let locked = sqlx::query(
            r"
            UPDATE conversations SET updated_at = updated_at WHERE id = $1
            ",
        )
        .bind(conversation_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to lock conversation: {e}")))?;

        if locked.rows_affected() == 0 {
            return Err(AppError::database(format!(
                "conversation {conversation_id} does not exist"
            )));
        }

        let now = now_rfc3339();

        sqlx::query(
            r"
            UPDATE conversations SET updated_at = $1 WHERE id = $2
            ",
        )
        .bind(&now)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to bump conversation: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO messages (id, conversation_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&id)
        .bind(conversation_id)
        .bind(role.as_str())
        .bind(content)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert message: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit message: {e}")))?;

        Ok(MessageRecord {
            id,
            conversation_id: conversation_id.to_owned(),
            role: role.as_str().to_owned(),
            content: content.to_owned(),
            created_at: now,
        })
    }

    /// Get all messages in a conversation, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_messages(&self, conversation_id: &str) -> AppResult<Vec<MessageRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, conversation_id, role, content, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get messages: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|r| MessageRecord {
                id: r.get("id"),
                conversation_id: r.get("conversation_id"),
                role: r.get("role"),
                content: r.get("content"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    /// Get the message history of a conversation the user owns.
    ///
    /// Unlike [`resolve_or_create`](Self::resolve_or_create), history reads
    /// are strict: an unknown or foreign conversation ID is a not-found
    /// error.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the conversation does not exist or
    /// belongs to another user, or a database error if a query fails
    pub async fn history(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> AppResult<Vec<MessageRecord>> {
        let conversation = self
            .get_conversation(conversation_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("conversation"))?;
        self.get_messages(&conversation.id).await
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
