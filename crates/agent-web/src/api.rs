//! API Client

use serde::{Deserialize, Serialize};

/// Chat API base URL, fixed at build time
pub const API_URL: &str = match option_env!("AGENT_API_URL") {
    Some(url) => url,
    None => "http://127.0.0.1:9999",
};

/// Used until `/models` answers, or if it never does
pub const FALLBACK_MODELS: [&str; 2] = ["llama3-70b-8192", "llama-3.3-70b-versatile"];

/// Body of `POST /chat`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model_name: String,
    pub system_prompt: String,
    pub messages: Vec<String>,
    pub allow_search: bool,
}

impl ChatRequest {
    /// A single-turn request; `None` for a blank query
    pub fn single_turn(
        model_name: &str,
        system_prompt: &str,
        query: &str,
        allow_search: bool,
    ) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }
        Some(Self {
            model_name: model_name.to_string(),
            system_prompt: system_prompt.to_string(),
            messages: vec![query.to_string()],
            allow_search,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<String>,
}

/// Models the backend accepts
pub async fn fetch_models() -> Result<Vec<String>, String> {
    let response = reqwest::get(format!("{API_URL}/models"))
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("GET /models returned {}", response.status()));
    }

    let data: ModelsResponse = response.json().await.map_err(|e| e.to_string())?;
    Ok(data.models)
}

/// Send a chat request; the error string is for the console, not the page
pub async fn send_chat(request: &ChatRequest) -> Result<String, String> {
    let response = reqwest::Client::new()
        .post(format!("{API_URL}/chat"))
        .json(request)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = response.status();
    if status.is_success() {
        let data: ChatResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(data.response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(format!("Backend error. Status code: {status}. {body}"))
    }
}
