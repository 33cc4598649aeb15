//! Tool System
//!
//! A registry is assembled for one agent and dropped with it; nothing here is
//! process-wide. Tools are described to the model in plain text and called
//! back through fenced JSON blocks.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Tool call request from the LLM
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier (models tend to emit it as `"tool"`)
    #[serde(alias = "tool")]
    pub name: String,

    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,

    /// Correlates the call with its result message
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    /// String argument by name
    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(serde_json::Value::as_str)
    }
}

/// Outcome of one tool call, as fed back to the model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    pub id: Option<String>,
    pub success: bool,

    /// Text the model reads
    pub output: String,

    /// Raw payload for logging and tests; never shown to the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::success(name, error)
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// JSON type a parameter must have
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Boolean,
}

impl ParamKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &serde_json::Value) -> bool {
        matches!(
            (self, value),
            (Self::String, serde_json::Value::String(_))
                | (Self::Number, serde_json::Value::Number(_))
                | (Self::Boolean, serde_json::Value::Bool(_))
        )
    }
}

/// One named argument a tool takes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolParam {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
}

impl ToolParam {
    pub fn required(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// What the model is told about a tool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParam>,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, param: ToolParam) -> Self {
        self.parameters.push(param);
        self
    }
}

/// A capability the reasoning loop can call
#[async_trait]
pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Check arguments against the schema before `execute` runs
    fn validate(&self, call: &ToolCall) -> Result<()> {
        for param in self.schema().parameters {
            match call.arguments.get(&param.name) {
                None if param.required => {
                    return Err(AgentError::ToolValidation(format!(
                        "missing required parameter `{}`",
                        param.name
                    )));
                }
                Some(value) if !param.kind.accepts(value) => {
                    return Err(AgentError::ToolValidation(format!(
                        "parameter `{}` must be a {}",
                        param.name,
                        param.kind.as_str()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Tools attached to one agent, keyed and ordered by name
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool; a later tool with the same name replaces the earlier one
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.schema().name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Look up, validate and run a call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tool.validate(call)?;
        tool.execute(call).await
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool instructions appended to the system prompt
    pub fn generate_prompt_section(&self) -> String {
        let mut prompt = String::from("## Tools\n\n");
        prompt.push_str(
            "To call a tool, reply with only a fenced block like this and wait for the result:\n\n",
        );
        prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n");
        prompt.push_str("When you have enough information, answer in plain text.\n\n");

        for tool in self.tools.values() {
            let schema = tool.schema();
            let _ = writeln!(prompt, "### {}\n{}", schema.name, schema.description);

            for param in &schema.parameters {
                let required = if param.required { ", required" } else { "" };
                let _ = writeln!(
                    prompt,
                    "- `{}` ({}{required}): {}",
                    param.name,
                    param.kind.as_str(),
                    param.description
                );
            }
            prompt.push('\n');
        }

        prompt
    }
}
