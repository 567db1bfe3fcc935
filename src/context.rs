// ABOUTME: Context window assembly for reasoning requests
// ABOUTME: Selects the most recent history that fits an approximate token budget
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! Context window assembly.
//!
//! Model context is finite, so before each reasoning exchange the stored
//! history is truncated to an approximate token budget. Truncation drops the
//! oldest messages first and always keeps the newest message, even when that
//! message alone exceeds the budget. The system prompt travels outside the
//! budget.

use tracing::debug;

use crate::database::MessageRecord;
use crate::llm::{ChatMessage, MessageRole};

/// Default approximate token budget for conversation history
pub const DEFAULT_CONTEXT_BUDGET: usize = 2000;

/// Approximate token count for a piece of text.
///
/// Uses the ceiling of characters divided by four. Deliberately cheap and
/// model-independent; the budget has enough slack that the estimate does not
/// need to be exact.
#[must_use]
pub fn approx_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Select the newest suffix of `messages` whose approximate token total fits
/// within `budget`.
///
/// Whole messages are kept or dropped; a message is never split. The last
/// message is always included so the model sees what the user just said.
#[must_use]
pub fn truncate_to_budget(messages: &[MessageRecord], budget: usize) -> &[MessageRecord] {
    let Some((last, rest)) = messages.split_last() else {
        return messages;
    };

    let mut used = approx_tokens(&last.content);
    let mut start = rest.len();
    for (idx, message) in rest.iter().enumerate().rev() {
        let cost = approx_tokens(&message.content);
        if used + cost > budget {
            break;
        }
        used += cost;
        start = idx;
    }

    if start > 0 {
        debug!(
            dropped = start,
            kept = messages.len() - start,
            approx_tokens = used,
            "Truncated conversation history to context budget"
        );
    }

    &messages[start..]
}

/// Build the message list for a reasoning request: system prompt first, then
/// the budget-truncated history.
#[must_use]
pub fn build_llm_messages(
    system_prompt: &str,
    history: &[MessageRecord],
    budget: usize,
) -> Vec<ChatMessage> {
    let window = truncate_to_budget(history, budget);

    let mut messages = Vec::with_capacity(window.len() + 1);
    messages.push(ChatMessage::system(system_prompt));
    for record in window {
        let role = MessageRole::parse(&record.role).unwrap_or(MessageRole::User);
        messages.push(ChatMessage::new(role, record.content.clone()));
    }
    messages
}
