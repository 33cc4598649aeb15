//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern for agent behavior.
//! The agent observes, thinks, acts (via tools), and responds.

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template
    pub system_prompt: String,

    /// Maximum reasoning iterations before giving up
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to system prompt
    pub inject_tool_descriptions: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, neutral AI assistant. \
Answer clearly, concisely, and avoid speculation.";

/// A single-shot agent: one provider, one tool set, one system prompt
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(provider: Arc<dyn LlmProvider>, tools: ToolRegistry, config: AgentConfig) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Start building an agent
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Run the reasoning loop over `conversation` and return it with every
    /// assistant turn and tool result appended, in the order they happened.
    pub async fn invoke(&self, mut conversation: Conversation) -> Result<Conversation> {
        conversation.ensure_system_prompt(|| self.build_system_prompt());

        let mut iterations = 0;

        loop {
            iterations += 1;

            if iterations > self.config.max_iterations {
                return Err(AgentError::MaxIterations(self.config.max_iterations));
            }

            let completion = self
                .provider
                .complete(conversation.messages(), &self.config.generation)
                .await?;

            tracing::debug!(
                provider = self.provider.name(),
                model = %completion.model,
                iteration = iterations,
                "Completion received"
            );

            let tokens = completion.usage.as_ref().map(|u| u.completion_tokens);
            conversation.push(
                Message::assistant(&completion.content).with_generation(&completion.model, tokens),
            );

            // Tool calls only count when there are tools to call
            let tool_call = if self.tools.is_empty() {
                None
            } else {
                parse_tool_call(&completion.content, &self.tools)
            };

            if let Some(tool_call) = tool_call {
                tracing::debug!(tool = %tool_call.name, "Executing tool");

                let result = self.execute_tool(&tool_call).await;
                conversation.push(Message::tool(format_tool_result(&result), tool_call.id.clone()));

                continue;
            }

            return Ok(conversation);
        }
    }

    /// Execute a tool call, folding failures into a result the model can read
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id.clone_from(&call.id);
                result
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                ToolResult {
                    name: call.name.clone(),
                    id: call.id.clone(),
                    success: false,
                    output: format!("Error: {e}"),
                    data: None,
                }
            }
        }
    }

    /// Get the tool registry
    pub const fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Parse a tool call from an LLM reply.
///
/// A fenced ```` ```tool ```` block always counts, so the model hears back
/// about a misspelt tool. A bare JSON reply only counts when it is the whole
/// reply and names a registered tool; anything else is the answer.
fn parse_tool_call(content: &str, tools: &ToolRegistry) -> Option<ToolCall> {
    parse_fenced_tool_call(content)
        .or_else(|| parse_inline_tool_call(content).filter(|call| tools.get(&call.name).is_some()))
        .map(with_call_id)
}

fn parse_fenced_tool_call(content: &str) -> Option<ToolCall> {
    const FENCE: &str = "```tool";

    let start = content.find(FENCE)? + FENCE.len();
    let body = &content[start..];
    let end = body.find("```")?;
    serde_json::from_str(body[..end].trim()).ok()
}

fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    let trimmed = content.trim();
    if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

fn with_call_id(mut call: ToolCall) -> ToolCall {
    if call.id.is_none() {
        call.id = Some(uuid::Uuid::new_v4().to_string());
    }
    call
}

/// Format tool result for conversation
fn format_tool_result(result: &ToolResult) -> String {
    if result.success {
        format!("[Tool '{}' returned]\n{}", result.name, result.output)
    } else {
        format!("[Tool '{}' failed]\n{}", result.name, result.output)
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, self.tools, self.config))
    }
}
