// ABOUTME: Tool invocation gateway between the reasoning loop and task storage
// ABOUTME: Dispatches model function calls to task tools with typed errors and user scoping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! # Tool Invocation Gateway
//!
//! The model never touches the database directly. Every function call it
//! emits is routed through the gateway, which owns the tool schema, parses
//! arguments, and executes the matching task operation scoped to the
//! authenticated user. Tool failures are typed so the orchestrator can feed
//! a plain-language explanation back to the model instead of crashing the
//! request.

pub mod tasks;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::database::Database;
use crate::database::TaskManager;
use crate::llm::{FunctionCall, Tool};

/// Typed failure of a tool invocation
#[derive(Debug, Error)]
pub enum ToolError {
    /// The referenced task does not exist or belongs to another user
    #[error("task not found")]
    NotFound,
    /// The arguments were malformed or out of bounds
    #[error("{0}")]
    Validation(String),
    /// The backing store could not serve the request
    #[error("service unavailable")]
    Unavailable,
}

impl ToolError {
    /// JSON payload fed back to the model, mirroring the success payloads
    #[must_use]
    pub fn to_response(&self) -> Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

/// Gateway through which all model-initiated tool calls run
pub struct ToolGateway {
    tasks: TaskManager,
}

impl ToolGateway {
    /// Create a gateway bound to the given database
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            tasks: database.tasks(),
        }
    }

    /// Tool schema advertised to the model
    #[must_use]
    pub fn declarations() -> Vec<Tool> {
        vec![Tool {
            function_declarations: tasks::function_declarations(),
        }]
    }

    /// Execute a function call on behalf of `user_id`.
    ///
    /// The user id always comes from the verified token, never from model
    /// arguments, so a tool call can only ever act on the caller's own data.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] describing the failure; the caller is
    /// expected to report it to the model rather than abort the request.
    pub async fn invoke(&self, user_id: &str, call: &FunctionCall) -> Result<Value, ToolError> {
        match call.name.as_str() {
            "add_task" => tasks::add_task(&self.tasks, user_id, &call.args).await,
            "list_tasks" => tasks::list_tasks(&self.tasks, user_id, &call.args).await,
            "complete_task" => tasks::complete_task(&self.tasks, user_id, &call.args).await,
            "update_task" => tasks::update_task(&self.tasks, user_id, &call.args).await,
            "delete_task" => tasks::delete_task(&self.tasks, user_id, &call.args).await,
            other => {
                warn!(tool = %other, "Model requested unknown tool");
                Err(ToolError::Validation(format!("unknown tool: {other}")))
            }
        }
    }
}
