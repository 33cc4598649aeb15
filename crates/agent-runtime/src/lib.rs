//! # agent-runtime
//!
//! Concrete backends for the agent system and the per-request invoker that
//! wires them together.
//!
//! ## Integrations
//!
//! - **Groq**: OpenAI-compatible chat completions
//! - **Tavily**: web search, attached to an agent only when a request asks for it
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{AgentInvoker, GroqTavilyFactory, Invocation, ReasoningInvoker};
//!
//! let invoker = ReasoningInvoker::new(GroqTavilyFactory::new(groq, tavily));
//! let answer = invoker.invoke(Invocation {
//!     model_id: "llama3-70b-8192".into(),
//!     messages: vec!["What is 2+2?".into()],
//!     allow_search: false,
//!     system_prompt: "You are helpful.".into(),
//! }).await?;
//! ```

pub mod groq;
pub mod invoke;
pub mod tavily;

#[cfg(test)]
mod fixture;

pub use groq::{GroqConfig, GroqProvider, InvalidSetting};
pub use invoke::{
    AgentFactory, AgentInvoker, GroqTavilyFactory, Invocation, InvocationError, ReasoningInvoker,
};
pub use tavily::{SearchOptions, TavilyConfig, TavilySearchTool};

// Re-export core types for convenience
pub use agent_core::{AgentError, Conversation, LlmProvider, Message, Role, Tool};
