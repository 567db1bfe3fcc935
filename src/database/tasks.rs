// ABOUTME: Database operations for user task lists
// ABOUTME: All queries are scoped by user_id so one user can never touch another's tasks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

/// Database representation of a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task ID
    pub id: i64,
    /// User ID who owns the task
    pub user_id: String,
    /// Task title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Whether the task is completed
    pub completed: bool,
    /// When the task was created (ISO 8601)
    pub created_at: String,
    /// When the task was last updated (ISO 8601)
    pub updated_at: String,
}

/// Task database operations manager
pub struct TaskManager {
    pool: SqlitePool,
}

impl TaskManager {
    /// Create a new task manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a task for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_task(
        &self,
        user_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> AppResult<TaskRecord> {
        let now = now_rfc3339();

        let result = sqlx::query(
            r"
            INSERT INTO tasks (user_id, title, description, completed, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $4)
            ",
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create task: {e}")))?;

        Ok(TaskRecord {
            id: result.last_insert_rowid(),
            user_id: user_id.to_owned(),
            title: title.to_owned(),
            description: description.map(ToOwned::to_owned),
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a single task owned by the user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_task(&self, task_id: i64, user_id: &str) -> AppResult<Option<TaskRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, title, description, completed, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get task: {e}")))?;

        Ok(row.map(record_from_row))
    }

    /// List tasks for a user, newest first, optionally filtered by
    /// completion state
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn list_tasks(
        &self,
        user_id: &str,
        completed: Option<bool>,
        limit: i64,
    ) -> AppResult<Vec<TaskRecord>> {
        let rows = match completed {
            Some(flag) => {
                sqlx::query(
                    r"
                    SELECT id, user_id, title, description, completed, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1 AND completed = $2
                    ORDER BY created_at DESC, id DESC
                    LIMIT $3
                    ",
                )
                .bind(user_id)
                .bind(i64::from(flag))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r"
                    SELECT id, user_id, title, description, completed, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT $2
                    ",
                )
                .bind(user_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to list tasks: {e}")))?;

        Ok(rows.into_iter().map(record_from_row).collect())
    }

    /// Mark a task as completed
    ///
    /// Returns `false` if the task does not exist or belongs to another user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn complete_task(&self, task_id: i64, user_id: &str) -> AppResult<bool> {
        let now = now_rfc3339();

        let result = sqlx::query(
            r"
            UPDATE tasks
            SET completed = 1, updated_at = $1
            WHERE id = $2 AND user_id = $3
            ",
        )
        .bind(&now)
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to complete task: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Update a task's title and/or description
    ///
    /// Fields left as `None` are preserved. Returns the updated record, or
    /// `None` if the task does not exist or belongs to another user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_task(
        &self,
        task_id: i64,
        user_id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Option<TaskRecord>> {
        let now = now_rfc3339();

        let result = sqlx::query(
            r"
            UPDATE tasks
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                updated_at = $3
            WHERE id = $4 AND user_id = $5
            ",
        )
        .bind(title)
        .bind(description)
        .bind(&now)
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update task: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_task(task_id, user_id).await
    }

    /// Delete a task
    ///
    /// Returns `false` if the task does not exist or belongs to another user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete_task(&self, task_id: i64, user_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM tasks WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete task: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn record_from_row(r: sqlx::sqlite::SqliteRow) -> TaskRecord {
    let completed: i64 = r.get("completed");
    TaskRecord {
        id: r.get("id"),
        user_id: r.get("user_id"),
        title: r.get("title"),
        description: r.get("description"),
        completed: completed != 0,
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
