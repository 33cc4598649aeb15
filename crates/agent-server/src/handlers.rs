//! HTTP Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use agent_runtime::{Invocation, InvocationError};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub groq_configured: bool,
    pub search_configured: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

/// Body of `POST /chat`; every field is required
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub model_name: String,
    pub system_prompt: String,
    pub messages: Vec<String>,
    pub allow_search: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, detail: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
            code: code.into(),
        }),
    )
}

/// 400 for anything the client got wrong, 500 for everything past validation
pub const fn status_for(err: &InvocationError) -> StatusCode {
    match err {
        InvocationError::InvalidModel(_) => StatusCode::BAD_REQUEST,
        InvocationError::Provider(_) | InvocationError::EmptyResult => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Client-facing body for a failed request. Only the `Display` text of the
/// cause leaves the process.
fn invocation_error(err: &InvocationError) -> ApiError {
    let status = status_for(err);
    match err {
        InvocationError::InvalidModel(_) => error_response(status, "Invalid model name", "INVALID_MODEL"),
        InvocationError::Provider(_) => error_response(
            status,
            format!("Failed to get AI response | Error: {err}"),
            "AGENT_ERROR",
        ),
        InvocationError::EmptyResult => error_response(
            status,
            format!("Failed to get AI response | Error: {err}"),
            "EMPTY_RESULT",
        ),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint; never calls out
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        groq_configured: state.settings.groq.is_configured(),
        search_configured: state.settings.tavily.is_configured(),
    })
}

/// Allow-listed models, in configured order
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.settings.allowed_models.clone(),
    })
}

/// Main chat endpoint
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    tracing::info!(
        %request_id,
        model = %payload.model_name,
        turns = payload.messages.len(),
        allow_search = payload.allow_search,
        "Received chat request"
    );

    if let Err(e) = state.settings.check_model(&payload.model_name) {
        tracing::warn!(%request_id, model = %payload.model_name, "Rejected: invalid model name");
        return Err(invocation_error(&e));
    }

    let model = payload.model_name.clone();
    let invocation = Invocation {
        model_id: payload.model_name,
        messages: payload.messages,
        allow_search: payload.allow_search,
        system_prompt: payload.system_prompt,
    };

    match state.invoker.invoke(invocation).await {
        Ok(response) => {
            tracing::info!(%request_id, %model, chars = response.len(), "Completed chat request");
            Ok(Json(ChatResponse { response }))
        }
        Err(e) => {
            let upstream = matches!(&e, InvocationError::Provider(inner) if inner.is_upstream());
            tracing::error!(%request_id, %model, upstream, error = ?e, "Chat request failed");
            Err(invocation_error(&e))
        }
    }
}
