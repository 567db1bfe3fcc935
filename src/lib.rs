// ABOUTME: Library crate root for the taskbot chat backend
// ABOUTME: Exposes the database, LLM, tool, orchestration, and route layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! # Taskbot Server
//!
//! Stateless backend for a multi-turn AI chat assistant over a user's
//! private task list. Conversations and tasks live in SQLite; each request
//! carries everything needed to serve it, so any instance can handle any
//! request.
//!
//! ## Architecture
//!
//! - [`routes`]: HTTP surface (chat turns, history, health)
//! - [`auth`]: JWT bearer-token verification
//! - [`database`]: conversation, message, and task persistence
//! - [`context`]: token-budget truncation of history
//! - [`orchestrator`]: bounded model/tool exchange loop
//! - [`tools`]: gateway between the model and task storage
//! - [`llm`]: pluggable reasoning backends

pub mod auth;
pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod orchestrator;
pub mod resources;
pub mod routes;
pub mod server;
pub mod tools;
