//! Groq LLM Provider
//!
//! Implementation of `LlmProvider` for Groq's OpenAI-compatible chat
//! completions API.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Groq provider configuration
#[derive(Clone, Debug)]
pub struct GroqConfig {
    /// API key; checked when a completion is requested, not at start-up
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".into(),
            timeout_secs: 120,
        }
    }
}

/// A variable was set but could not be used
#[derive(Error, Debug)]
#[error("{key}={value:?} ({reason})")]
pub struct InvalidSetting {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl GroqConfig {
    /// Build from an arbitrary variable lookup (the process environment in
    /// production, a map in tests)
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> std::result::Result<Self, InvalidSetting> {
        let defaults = Self::default();
        let timeout_secs = match lookup("GROQ_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| InvalidSetting {
                key: "GROQ_TIMEOUT_SECS",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.timeout_secs,
        };

        Ok(Self {
            api_key: lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()),
            base_url: lookup("GROQ_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs,
        })
    }

    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Groq LLM provider
pub struct GroqProvider {
    client: reqwest::Client,
    config: GroqConfig,
}

impl GroqProvider {
    /// Create from configuration
    pub fn new(config: GroqConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Convert agent messages to the wire format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage<'_>> {
        messages
            .iter()
            .map(|m| {
                // No tool-call protocol on the wire; results go back as user context
                let role = match m.role {
                    Role::Tool => "user",
                    other => other.as_str(),
                };
                WireMessage {
                    role,
                    content: &m.content,
                }
            })
            .collect()
    }

    fn build_request<'a>(
        messages: &'a [Message],
        options: &'a GenerationOptions,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &options.model,
            messages: Self::convert_messages(messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stop: (!options.stop_sequences.is_empty()).then_some(options.stop_sequences.as_slice()),
        }
    }

    /// Convert an API response to an agent completion
    fn convert_completion(response: ChatCompletionResponse, model: &str) -> Result<Completion> {
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AgentError::Parse(format!("model '{model}' returned no choices"))
        })?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: response.model.unwrap_or_else(|| model.to_string()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_api),
        })
    }

    /// Map a non-success HTTP status to an agent error
    fn status_error(status: StatusCode, body: &str) -> AgentError {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| body.chars().take(500).collect());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(message),
            StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(message),
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                AgentError::ProviderUnavailable(format!("HTTP {status}: {message}"))
            }
            _ => AgentError::Provider(format!("HTTP {status}: {message}")),
        }
    }

    fn transport_error(e: &reqwest::Error) -> AgentError {
        if e.is_connect() || e.is_timeout() {
            AgentError::ProviderUnavailable(e.to_string())
        } else {
            AgentError::Provider(e.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        "Groq"
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::Auth("GROQ_API_KEY is not set".into()))?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = Self::build_request(messages, options);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Self::transport_error(&e))?;

        if !status.is_success() {
            tracing::warn!(model = %options.model, %status, "Groq request failed");
            return Err(Self::status_error(status, &body));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            AgentError::Parse(format!("Groq response for '{}': {e}", options.model))
        })?;

        Self::convert_completion(parsed, &options.model)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::fixture::Fixture;

    #[test]
    fn test_config_defaults() {
        let config = GroqConfig::default();
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.timeout_secs, 120);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_config_from_lookup() {
        let vars = HashMap::from([("GROQ_API_KEY", "gsk_test"), ("GROQ_TIMEOUT_SECS", "30")]);
        let config = GroqConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string())).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let err = GroqConfig::from_lookup(|k| (k == "GROQ_TIMEOUT_SECS").then(|| "2m".to_string()))
            .unwrap_err();
        assert_eq!(err.key, "GROQ_TIMEOUT_SECS");
        assert_eq!(err.value, "2m");
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config =
            GroqConfig::from_lookup(|k| (k == "GROQ_API_KEY").then(|| "  ".to_string())).unwrap();
        assert!(!config.is_configured());
    }

    #[test]
    fn test_request_shape() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("Hello"),
            Message::tool("result", None),
        ];
        let options = GenerationOptions::for_model("llama3-70b-8192");

        let request = GroqProvider::build_request(&messages, &options);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "llama3-70b-8192");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hello");
        assert_eq!(json["messages"][2]["role"], "user");
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn test_convert_completion() {
        let body = r#"{
            "model": "llama-3.3-70b-versatile",
            "choices": [{"message": {"role": "assistant", "content": "4"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let completion = GroqProvider::convert_completion(parsed, "fallback").unwrap();

        assert_eq!(completion.content, "4");
        assert_eq!(completion.model, "llama-3.3-70b-versatile");
        assert_eq!(completion.usage.unwrap().total_tokens, 11);
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
    }

    #[test]
    fn test_no_choices_is_parse_error() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let err = GroqProvider::convert_completion(parsed, "m").unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;
        match GroqProvider::status_error(StatusCode::UNAUTHORIZED, body) {
            AgentError::Auth(msg) => assert_eq!(msg, "Invalid API Key"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            GroqProvider::status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            AgentError::RateLimited(_)
        ));
        assert!(matches!(
            GroqProvider::status_error(StatusCode::NOT_FOUND, "model not found"),
            AgentError::Provider(_)
        ));
    }

    fn provider_for(fixture: &Fixture) -> GroqProvider {
        GroqProvider::new(GroqConfig {
            api_key: Some("gsk_test".into()),
            base_url: fixture.base_url.clone(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_against_local_api() {
        let fixture = Fixture::start(
            "/chat/completions",
            StatusCode::OK,
            json!({
                "model": "llama3-70b-8192",
                "choices": [{"message": {"role": "assistant", "content": "4"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}
            }),
        )
        .await;

        let completion = provider_for(&fixture)
            .complete(
                &[Message::system("You are helpful."), Message::user("What is 2+2?")],
                &GenerationOptions::for_model("llama3-70b-8192"),
            )
            .await
            .unwrap();

        assert_eq!(completion.content, "4");
        assert_eq!(completion.usage.unwrap().completion_tokens, 1);

        let seen = fixture.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].authorization.as_deref(), Some("Bearer gsk_test"));
        assert_eq!(seen[0].body["model"], "llama3-70b-8192");
        assert_eq!(seen[0].body["messages"][1]["content"], "What is 2+2?");
    }

    #[tokio::test]
    async fn test_complete_maps_error_status() {
        let cases = [
            (StatusCode::UNAUTHORIZED, "auth"),
            (StatusCode::TOO_MANY_REQUESTS, "rate"),
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            (StatusCode::INTERNAL_SERVER_ERROR, "provider"),
        ];

        for (status, expected) in cases {
            let fixture = Fixture::start(
                "/chat/completions",
                status,
                json!({"error": {"message": "Invalid API Key"}}),
            )
            .await;

            let err = provider_for(&fixture)
                .complete(&[Message::user("hi")], &GenerationOptions::default())
                .await
                .unwrap_err();

            let matched = match expected {
                "auth" => matches!(&err, AgentError::Auth(m) if m == "Invalid API Key"),
                "rate" => matches!(err, AgentError::RateLimited(_)),
                "unavailable" => matches!(err, AgentError::ProviderUnavailable(_)),
                _ => matches!(err, AgentError::Provider(_)),
            };
            assert!(matched, "{status} gave {err:?}");
        }
    }

    #[tokio::test]
    async fn test_complete_rejects_undecodable_body() {
        let fixture = Fixture::start("/chat/completions", StatusCode::OK, json!({"unexpected": true})).await;

        let err = provider_for(&fixture)
            .complete(&[Message::user("hi")], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let provider = GroqProvider::new(GroqConfig::default()).unwrap();
        let err = provider
            .complete(&[Message::user("hi")], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Auth(_)));
    }
}
