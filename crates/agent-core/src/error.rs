//! Error Types
//!
//! One enum for everything that can stop an agent run. Callers that need to
//! react differently to remote failures use [`AgentError::is_upstream`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {
    // Chat provider
    #[error("Provider error: {0}")]
    Provider(String),

    /// Connection refused, timed out, or a 502/503 from the provider
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Missing or rejected API key
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Provider answered, but not in a shape we understand
    #[error("Parse error: {0}")]
    Parse(String),

    // Tools
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    // Reasoning loop
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Whether the failure happened talking to a remote service rather than
    /// inside the agent itself.
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::Auth(_)
        )
    }
}
