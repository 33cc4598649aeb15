//! Application State

use std::sync::Arc;

use agent_runtime::{AgentInvoker, GroqTavilyFactory, ReasoningInvoker};

use crate::config::Settings;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Read-only settings, including the model allow-list
    pub settings: Arc<Settings>,

    /// Runs one agent per chat request
    pub invoker: Arc<dyn AgentInvoker>,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, invoker: Arc<dyn AgentInvoker>) -> Self {
        Self { settings, invoker }
    }

    /// Production wiring: Groq for chat, Tavily for search
    pub fn from_settings(settings: Settings) -> Self {
        let factory = GroqTavilyFactory::new(settings.groq.clone(), settings.tavily.clone());
        Self::new(Arc::new(settings), Arc::new(ReasoningInvoker::new(factory)))
    }
}
