// ABOUTME: System prompts for LLM interactions loaded at compile time
// ABOUTME: Provides the task assistant system prompt used for tool-driven chat
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy
//! maintenance.

/// Task assistant system prompt
///
/// Contains instructions for the AI assistant including:
/// - Role and communication style
/// - How to resolve tasks referenced by title instead of ID
/// - Guidelines for reporting tool results back to the user
pub const TASK_ASSISTANT_PROMPT: &str = include_str!("task_assistant.md");

/// Get the system prompt for the task assistant
///
/// Used at the start of every reasoning exchange. The prompt is not counted
/// against the conversation context budget.
#[must_use]
pub const fn get_task_assistant_prompt() -> &'static str {
    TASK_ASSISTANT_PROMPT
}
