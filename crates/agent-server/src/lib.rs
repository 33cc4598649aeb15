//! multi-ai-agent HTTP server
//!
//! Two axum services run side by side under one supervisor:
//!
//! - the chat API (`/chat`, `/models`, `/health`)
//! - the compiled Leptos UI, served as static files
//!
//! The API comes up first; the UI only starts once the API has signalled
//! that it is listening.

pub mod config;
pub mod handlers;
pub mod state;
pub mod supervisor;

use std::path::Path;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::handlers::{chat_handler, health_check, list_models};
use crate::state::AppState;

pub use config::Settings;

/// Router for the chat API
pub fn api_router(state: AppState) -> Router {
    // The UI is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/models", get(list_models))
        .route("/chat", post(chat_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for the static UI bundle; unknown paths fall back to `index.html`
pub fn ui_router(static_dir: &Path) -> Router {
    let index = ServeFile::new(static_dir.join("index.html"));

    Router::new()
        .fallback_service(ServeDir::new(static_dir).fallback(index))
        .layer(TraceLayer::new_for_http())
}
