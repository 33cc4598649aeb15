//! multi-ai-agent supervisor binary
//!
//! Loads settings, then starts the chat API and the UI.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_server::{Settings, supervisor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;

    tracing::info!("Allowed models:");
    for model in &settings.allowed_models {
        tracing::info!("  • {}", model);
    }

    if settings.groq.is_configured() {
        tracing::info!("✓ Groq API key configured");
    } else {
        tracing::warn!("⚠ GROQ_API_KEY not set - chat requests will fail");
    }

    if settings.tavily.is_configured() {
        tracing::info!("✓ Tavily API key configured");
    } else {
        tracing::warn!("⚠ TAVILY_API_KEY not set - search-enabled requests will fail");
    }

    if let Err(e) = supervisor::run(settings).await {
        tracing::error!("Supervisor stopped: {:#}", e);
        return Err(e);
    }

    Ok(())
}
