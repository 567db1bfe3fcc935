// ABOUTME: Task management tools exposed to the model
// ABOUTME: Implements add, list, complete, update, and delete with argument validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! Task tools.
//!
//! Each tool parses its arguments from the model's JSON, validates them, and
//! runs the matching [`TaskManager`] operation. Success payloads follow a
//! `{task_id, status, title}` convention so the model can narrate outcomes
//! consistently; `list_tasks` returns the task objects themselves.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use super::ToolError;
use crate::database::{TaskManager, TaskRecord};
use crate::errors::AppError;
use crate::llm::FunctionDeclaration;

/// Maximum task title length in characters
pub const TITLE_MAX_CHARS: usize = 500;

/// Default number of tasks returned by `list_tasks`
const LIST_DEFAULT_LIMIT: i64 = 100;

/// Hard cap on the number of tasks returned by `list_tasks`
const LIST_MAX_LIMIT: i64 = 1000;

/// Declarations for all task tools, in invocation-dispatch order
#[must_use]
pub fn function_declarations() -> Vec<FunctionDeclaration> {
    vec![
        FunctionDeclaration {
            name: "add_task".to_owned(),
            description: "Create a new task for the user with a title and optional description"
                .to_owned(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "The task title (max 500 characters)"
                    },
                    "description": {
                        "type": "string",
                        "description": "Optional task description"
                    }
                },
                "required": ["title"]
            })),
        },
        FunctionDeclaration {
            name: "list_tasks".to_owned(),
            description: "Retrieve the user's tasks, optionally filtered by completion status"
                .to_owned(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "status": {
                        "type": "string",
                        "enum": ["all", "pending", "completed"],
                        "description": "Filter tasks by status (default: all)"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of tasks to return (default: 100, max: 1000)"
                    }
                }
            })),
        },
        FunctionDeclaration {
            name: "complete_task".to_owned(),
            description: "Mark a task as completed by its ID".to_owned(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "task_id": {
                        "type": "integer",
                        "description": "The ID of the task to complete"
                    }
                },
                "required": ["task_id"]
            })),
        },
        FunctionDeclaration {
            name: "update_task".to_owned(),
            description: "Update a task's title and/or description by its ID".to_owned(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "task_id": {
                        "type": "integer",
                        "description": "The ID of the task to update"
                    },
                    "title": {
                        "type": "string",
                        "description": "New task title (max 500 characters)"
                    },
                    "description": {
                        "type": "string",
                        "description": "New task description"
                    }
                },
                "required": ["task_id"]
            })),
        },
        FunctionDeclaration {
            name: "delete_task".to_owned(),
            description: "Permanently delete a task by its ID".to_owned(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "task_id": {
                        "type": "integer",
                        "description": "The ID of the task to delete"
                    }
                },
                "required": ["task_id"]
            })),
        },
    ]
}

// ============================================================================
// Argument Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct AddTaskArgs {
    title: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListTasksArgs {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TaskIdArgs {
    task_id: i64,
}

#[derive(Debug, Deserialize)]
struct UpdateTaskArgs {
    task_id: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn parse_args<T: serde::de::DeserializeOwned>(args: &Value) -> Result<T, ToolError> {
    serde_json::from_value(args.clone())
        .map_err(|e| ToolError::Validation(format!("invalid arguments: {e}")))
}

fn validate_title(title: &str) -> Result<String, ToolError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ToolError::Validation("title cannot be empty".to_owned()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ToolError::Validation(format!(
            "title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title.to_owned())
}

fn storage_error(tool: &str, err: &AppError) -> ToolError {
    error!(tool = %tool, error = %err, "Tool storage operation failed");
    ToolError::Unavailable
}

fn task_json(task: &TaskRecord) -> Value {
    json!({
        "id": task.id,
        "title": task.title,
        "description": task.description,
        "completed": task.completed,
        "created_at": task.created_at,
        "updated_at": task.updated_at,
    })
}

// ============================================================================
// Tool Implementations
// ============================================================================

/// Create a task
///
/// # Errors
/// Returns a validation error for a missing or oversized title, or
/// unavailable if storage fails
pub async fn add_task(
    tasks: &TaskManager,
    user_id: &str,
    args: &Value,
) -> Result<Value, ToolError> {
    let args: AddTaskArgs = parse_args(args)?;
    let title = validate_title(&args.title)?;

    let task = tasks
        .create_task(user_id, &title, args.description.as_deref())
        .await
        .map_err(|e| storage_error("add_task", &e))?;

    Ok(json!({
        "task_id": task.id,
        "status": "created",
        "title": task.title,
    }))
}

/// List the user's tasks, newest first
///
/// # Errors
/// Returns a validation error for a bad status or non-positive limit, or
/// unavailable if storage fails
pub async fn list_tasks(
    tasks: &TaskManager,
    user_id: &str,
    args: &Value,
) -> Result<Value, ToolError> {
    let args: ListTasksArgs = parse_args(args)?;

    let completed = match args.status.as_deref() {
        None | Some("all") => None,
        Some("pending") => Some(false),
        Some("completed") => Some(true),
        Some(other) => {
            return Err(ToolError::Validation(format!(
                "status must be one of all, pending, completed (got {other})"
            )))
        }
    };

    let limit = args.limit.unwrap_or(LIST_DEFAULT_LIMIT);
    if limit < 1 {
        return Err(ToolError::Validation("limit must be at least 1".to_owned()));
    }
    let limit = limit.min(LIST_MAX_LIMIT);

    let records = tasks
        .list_tasks(user_id, completed, limit)
        .await
        .map_err(|e| storage_error("list_tasks", &e))?;

    Ok(Value::Array(records.iter().map(task_json).collect()))
}

/// Mark a task as completed
///
/// Completing an already-completed task succeeds again; the operation is
/// idempotent.
///
/// # Errors
/// Returns not-found for a missing or foreign task, or unavailable if
/// storage fails
pub async fn complete_task(
    tasks: &TaskManager,
    user_id: &str,
    args: &Value,
) -> Result<Value, ToolError> {
    let args: TaskIdArgs = parse_args(args)?;

    let completed = tasks
        .complete_task(args.task_id, user_id)
        .await
        .map_err(|e| storage_error("complete_task", &e))?;
    if !completed {
        return Err(ToolError::NotFound);
    }

    let task = tasks
        .get_task(args.task_id, user_id)
        .await
        .map_err(|e| storage_error("complete_task", &e))?
        .ok_or(ToolError::NotFound)?;

    Ok(json!({
        "task_id": task.id,
        "status": "completed",
        "title": task.title,
    }))
}

/// Update a task's title and/or description
///
/// # Errors
/// Returns a validation error when neither field is provided or the new
/// title is out of bounds, not-found for a missing task, or unavailable if
/// storage fails
pub async fn update_task(
    tasks: &TaskManager,
    user_id: &str,
    args: &Value,
) -> Result<Value, ToolError> {
    let args: UpdateTaskArgs = parse_args(args)?;

    if args.title.is_none() && args.description.is_none() {
        return Err(ToolError::Validation(
            "at least one of title or description must be provided".to_owned(),
        ));
    }

    let title = args.title.as_deref().map(validate_title).transpose()?;

    let task = tasks
        .update_task(
            args.task_id,
            user_id,
            title.as_deref(),
            args.description.as_deref(),
        )
        .await
        .map_err(|e| storage_error("update_task", &e))?
        .ok_or(ToolError::NotFound)?;

    Ok(json!({
        "task_id": task.id,
        "status": "updated",
        "title": task.title,
    }))
}

/// Permanently delete a task
///
/// Deleting an already-deleted task reports not-found, following REST
/// conventions for repeated DELETE calls.
///
/// # Errors
/// Returns not-found for a missing or foreign task, or unavailable if
/// storage fails
pub async fn delete_task(
    tasks: &TaskManager,
    user_id: &str,
    args: &Value,
) -> Result<Value, ToolError> {
    let args: TaskIdArgs = parse_args(args)?;

    let task = tasks
        .get_task(args.task_id, user_id)
        .await
        .map_err(|e| storage_error("delete_task", &e))?
        .ok_or(ToolError::NotFound)?;

    let deleted = tasks
        .delete_task(args.task_id, user_id)
        .await
        .map_err(|e| storage_error("delete_task", &e))?;
    if !deleted {
        return Err(ToolError::NotFound);
    }

    Ok(json!({
        "task_id": task.id,
        "status": "deleted",
        "title": task.title,
    }))
}
