// ABOUTME: Environment-only server configuration
// ABOUTME: Reads bind address, database URL, auth secret, LLM provider, and orchestration limits from env
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Taskbot Contributors

//! Environment-driven configuration. There is no config file; every knob is
//! an environment variable so deployments stay twelve-factor.

use std::env;
use std::fmt;

use crate::errors::{AppError, AppResult};

/// Default HTTP port
const DEFAULT_PORT: u16 = 8081;

/// Default context budget in approximate tokens handed to the reasoning engine
const DEFAULT_CONTEXT_BUDGET: usize = 2000;

/// Default overall request deadline in seconds
const DEFAULT_REQUEST_DEADLINE_SECS: u64 = 30;

/// Default cap on tool-calling rounds per request
const DEFAULT_MAX_TOOL_ITERATIONS: usize = 5;

/// Which reasoning engine backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderType {
    /// OpenRouter (OpenAI-compatible chat completions API)
    OpenRouter,
    /// Google Gemini (Generative Language API)
    Gemini,
}

impl LlmProviderType {
    /// Environment variable selecting the provider
    pub const ENV_VAR: &'static str = "TASKBOT_LLM_PROVIDER";

    /// Read the provider selection from the environment, defaulting to OpenRouter
    #[must_use]
    pub fn from_env() -> Self {
        match env::var(Self::ENV_VAR).as_deref() {
            Ok("gemini") => Self::Gemini,
            _ => Self::OpenRouter,
        }
    }

    /// Model override from the environment, if set
    #[must_use]
    pub fn model_from_env() -> Option<String> {
        env::var("TASKBOT_LLM_MODEL").ok().filter(|m| !m.is_empty())
    }
}

impl fmt::Display for LlmProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenRouter => write!(f, "openrouter"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Server configuration assembled from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host (default 127.0.0.1)
    pub host: String,
    /// Bind port (default 8081)
    pub port: u16,
    /// SQLite connection URL
    pub database_url: String,
    /// Shared HS256 secret used to verify bearer tokens from the identity issuer
    pub jwt_secret: String,
    /// Selected reasoning engine backend
    pub llm_provider: LlmProviderType,
    /// Context budget in approximate tokens for history handed to the engine
    pub context_budget: usize,
    /// Overall deadline for one chat request, in seconds
    pub request_deadline_secs: u64,
    /// Maximum tool-calling rounds per request
    pub max_tool_iterations: usize,
}

impl ServerConfig {
    /// Build the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns a config error if `AUTH_JWT_SECRET` is missing or a numeric
    /// variable cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        let jwt_secret = env::var("AUTH_JWT_SECRET")
            .map_err(|_| AppError::config("AUTH_JWT_SECRET environment variable not set"))?;

        let port = match env::var("TASKBOT_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::config(format!("Invalid TASKBOT_PORT: {e}")))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            host: env::var("TASKBOT_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned()),
            port,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:taskbot.db?mode=rwc".to_owned()),
            jwt_secret,
            llm_provider: LlmProviderType::from_env(),
            context_budget: parse_env_usize("TASKBOT_CONTEXT_BUDGET", DEFAULT_CONTEXT_BUDGET)?,
            request_deadline_secs: parse_env_u64(
                "TASKBOT_REQUEST_DEADLINE_SECS",
                DEFAULT_REQUEST_DEADLINE_SECS,
            )?,
            max_tool_iterations: parse_env_usize(
                "TASKBOT_MAX_TOOL_ITERATIONS",
                DEFAULT_MAX_TOOL_ITERATIONS,
            )?,
        })
    }

    /// Socket address string for binding the listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env_usize(var: &str, default: usize) -> AppResult<usize> {
    match env::var(var) {
        Ok(raw) => raw
            .parse::<usize>()
            .map_err(|e| AppError::config(format!("Invalid {var}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(var: &str, default: u64) -> AppResult<u64> {
    match env::var(var) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| AppError::config(format!("Invalid {var}: {e}"))),
        Err(_) => Ok(default),
    }
}
