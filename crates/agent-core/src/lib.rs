//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction and a per-invocation
//! tool system.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tools    │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! An [`Agent`] is cheap to build and meant to be thrown away after a single
//! [`Agent::invoke`]. It takes a [`Conversation`] in and hands the grown
//! conversation back, so callers decide which message is "the answer".

pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use tool::{ParamKind, Tool, ToolCall, ToolParam, ToolRegistry, ToolResult, ToolSchema};
