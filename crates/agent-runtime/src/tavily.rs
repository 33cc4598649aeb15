//! Tavily Web Search Tool
//!
//! Lets the reasoning loop fetch a handful of web results mid-answer.

use std::fmt::Write as _;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    tool::{ParamKind, Tool, ToolCall, ToolParam, ToolResult, ToolSchema},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Tool name as the model sees it
pub const SEARCH_TOOL_NAME: &str = "tavily_search";

/// Snippet length kept per result
const SNIPPET_CHARS: usize = 300;

/// Tavily API configuration
#[derive(Clone, Debug)]
pub struct TavilyConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tavily.com".into(),
            timeout_secs: 30,
        }
    }
}

impl TavilyConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: lookup("TAVILY_API_KEY").filter(|k| !k.trim().is_empty()),
            base_url: lookup("TAVILY_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs: defaults.timeout_secs,
        }
    }

    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Per-tool search settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    pub max_results: usize,
    /// Tavily search category
    pub topic: &'static str,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 2,
            topic: "general",
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    topic: &'static str,
    max_results: usize,
    search_depth: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SearchHit {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: Option<f64>,
}

/// Web search backed by the Tavily API
pub struct TavilySearchTool {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    options: SearchOptions,
}

impl TavilySearchTool {
    /// Fails when no API key is configured, so a search-enabled request
    /// surfaces the problem before the model is ever called
    pub fn new(config: &TavilyConfig, options: SearchOptions) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AgentError::Auth("TAVILY_API_KEY is not set".into()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            options,
        })
    }

    fn build_request<'a>(&self, query: &'a str) -> SearchRequest<'a> {
        SearchRequest {
            query,
            topic: self.options.topic,
            max_results: self.options.max_results,
            search_depth: "basic",
        }
    }

    /// Format hits for inclusion in the model's context
    fn format_results(hits: &[SearchHit]) -> String {
        if hits.is_empty() {
            return "No search results found.".to_string();
        }

        let mut out = String::new();
        for (i, hit) in hits.iter().enumerate() {
            let snippet: String = hit.content.chars().take(SNIPPET_CHARS).collect();
            let _ = write!(out, "{}. {}\n   URL: {}\n   {}\n\n", i + 1, hit.title, hit.url, snippet);
        }
        out.trim_end().to_string()
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            SEARCH_TOOL_NAME,
            format!(
                "Search the web for current information. Returns up to {} results with title, URL and snippet.",
                self.options.max_results
            ),
        )
        .param(ToolParam::required("query", ParamKind::String, "Search query"))
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let query = call
            .str_arg("query")
            .ok_or_else(|| AgentError::ToolValidation("query must be a string".into()))?;

        tracing::info!(query, max_results = self.options.max_results, "Web search");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.build_request(query))
            .send()
            .await
            .map_err(|e| AgentError::ToolExecution(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            return Ok(ToolResult::failure(
                SEARCH_TOOL_NAME,
                format!("Search API error: HTTP {status}: {body}"),
            ));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ToolExecution(format!("search response: {e}")))?;

        // The API may return more than asked for
        let hits: Vec<SearchHit> = parsed.results.into_iter().take(self.options.max_results).collect();

        Ok(ToolResult::success(SEARCH_TOOL_NAME, Self::format_results(&hits))
            .with_data(serde_json::to_value(&hits)?))
    }
}
