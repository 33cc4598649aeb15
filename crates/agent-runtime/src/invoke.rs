//! Agent Invocation
//!
//! Turns one chat request into one throwaway agent run: build a chat model
//! for the requested model id, attach the search tool only if asked, run the
//! reasoning loop once and hand back the last assistant message.

use std::sync::Arc;

use agent_core::{Agent, AgentError, Conversation, LlmProvider, Tool, ToolRegistry};
use async_trait::async_trait;
use thiserror::Error;

use crate::groq::{GroqConfig, GroqProvider};
use crate::tavily::{SearchOptions, TavilyConfig, TavilySearchTool};

/// Result type alias for invocations
pub type Result<T> = std::result::Result<T, InvocationError>;

/// Everything one agent run needs
#[derive(Clone, Debug)]
pub struct Invocation {
    pub model_id: String,
    /// Conversation turns, oldest first
    pub messages: Vec<String>,
    pub allow_search: bool,
    pub system_prompt: String,
}

/// Why an invocation produced no answer
#[derive(Error, Debug)]
pub enum InvocationError {
    /// Requested model is not on the allow-list
    #[error("Invalid model name: {0}")]
    InvalidModel(String),

    /// The provider, a tool, or the reasoning loop failed
    #[error(transparent)]
    Provider(#[from] AgentError),

    /// The agent finished without a single assistant message
    #[error("Agent returned no assistant message")]
    EmptyResult,
}

/// Runs one invocation to completion
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(&self, invocation: Invocation) -> Result<String>;
}

/// Supplies the per-invocation pieces of an agent
pub trait AgentFactory: Send + Sync {
    /// A fresh chat-completion client
    fn chat_model(&self) -> agent_core::Result<Arc<dyn LlmProvider>>;

    /// A fresh web search tool
    fn search_tool(&self) -> agent_core::Result<Arc<dyn Tool>>;
}

/// Groq for chat, Tavily for search
#[derive(Clone, Debug)]
pub struct GroqTavilyFactory {
    groq: GroqConfig,
    tavily: TavilyConfig,
    search: SearchOptions,
}

impl GroqTavilyFactory {
    pub fn new(groq: GroqConfig, tavily: TavilyConfig) -> Self {
        Self {
            groq,
            tavily,
            search: SearchOptions::default(),
        }
    }

    pub const fn search_options(&self) -> &SearchOptions {
        &self.search
    }
}

impl AgentFactory for GroqTavilyFactory {
    fn chat_model(&self) -> agent_core::Result<Arc<dyn LlmProvider>> {
        Ok(Arc::new(GroqProvider::new(self.groq.clone())?))
    }

    fn search_tool(&self) -> agent_core::Result<Arc<dyn Tool>> {
        Ok(Arc::new(TavilySearchTool::new(&self.tavily, self.search.clone())?))
    }
}

/// Builds a new [`Agent`] for every call; nothing is cached between calls
pub struct ReasoningInvoker<F> {
    factory: F,
}

impl<F: AgentFactory> ReasoningInvoker<F> {
    pub const fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Tool set for one invocation: the search tool or nothing
    pub fn build_tools(&self, allow_search: bool) -> agent_core::Result<ToolRegistry> {
        let mut tools = ToolRegistry::new();
        if allow_search {
            tools.register(self.factory.search_tool()?);
        }
        Ok(tools)
    }

    pub fn build_agent(&self, invocation: &Invocation) -> agent_core::Result<Agent> {
        Agent::builder()
            .provider(self.factory.chat_model()?)
            .tools(self.build_tools(invocation.allow_search)?)
            .system_prompt(invocation.system_prompt.clone())
            .model(invocation.model_id.clone())
            .build()
    }
}

#[async_trait]
impl<F: AgentFactory> AgentInvoker for ReasoningInvoker<F> {
    async fn invoke(&self, invocation: Invocation) -> Result<String> {
        let agent = self.build_agent(&invocation)?;

        tracing::info!(
            model = %invocation.model_id,
            turns = invocation.messages.len(),
            tools = agent.tools().len(),
            "Invoking agent"
        );

        let result = agent
            .invoke(Conversation::from_user_turns(invocation.messages))
            .await?;

        final_response(&result)
    }
}

/// Content of the last assistant-authored message
pub fn final_response(conversation: &Conversation) -> Result<String> {
    conversation
        .last_assistant()
        .map(|m| m.content.clone())
        .ok_or(InvocationError::EmptyResult)
}
