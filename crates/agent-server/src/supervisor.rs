//! Service Supervisor
//!
//! Starts the API, waits for its readiness signal, then starts the UI.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use axum::Router;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::config::Settings;
use crate::state::AppState;
use crate::{api_router, ui_router};

/// A spawned service and the signal it sends once it is accepting connections
pub struct Service {
    pub name: &'static str,
    ready: Option<oneshot::Receiver<SocketAddr>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Service {
    /// Bind `addr` and serve `app` on a background task
    pub fn spawn(name: &'static str, addr: SocketAddr, app: Router) -> Self {
        let (ready_tx, ready_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("{name}: failed to bind {addr}"))?;
            let local = listener.local_addr()?;

            // Receiver may already be gone if the supervisor gave up
            let _ = ready_tx.send(local);

            axum::serve(listener, app)
                .await
                .with_context(|| format!("{name}: server error"))
        });

        Self {
            name,
            ready: Some(ready_rx),
            handle,
        }
    }

    /// Wait for the bound address, or for the reason the service never got there
    pub async fn ready(&mut self, timeout: Duration) -> anyhow::Result<SocketAddr> {
        let Some(ready) = self.ready.take() else {
            bail!("{}: readiness already consumed", self.name);
        };

        match tokio::time::timeout(timeout, ready).await {
            Ok(Ok(addr)) => Ok(addr),
            Ok(Err(_)) => match (&mut self.handle).await {
                Ok(Err(e)) => Err(e),
                Ok(Ok(())) => bail!("{}: exited before it was ready", self.name),
                Err(join) => Err(join).with_context(|| format!("{}: task failed", self.name)),
            },
            Err(_) => bail!("{}: not ready after {timeout:?}", self.name),
        }
    }

    /// Run until the service stops
    pub async fn wait(self) -> anyhow::Result<()> {
        self.handle
            .await
            .with_context(|| format!("{}: task failed", self.name))?
    }
}

/// Start both services and block until one of them stops or Ctrl-C arrives
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let ready_timeout = settings.ready_timeout;
    let ui_addr = settings.ui_addr;
    let static_dir = settings.static_dir.clone();

    if !static_dir.join("index.html").exists() {
        tracing::warn!(
            dir = %static_dir.display(),
            "UI bundle not found - build it with `trunk build --release` in crates/agent-web"
        );
    }

    tracing::info!("Starting backend service...");
    let mut backend = Service::spawn("backend", settings.bind_addr, api_router(AppState::from_settings(settings)));
    let api_addr = backend.ready(ready_timeout).await?;
    tracing::info!("Backend ready on http://{}", api_addr);

    tracing::info!("Starting frontend service...");
    let mut frontend = Service::spawn("frontend", ui_addr, ui_router(&static_dir));
    let ui_addr = frontend.ready(ready_timeout).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 multi-ai-agent UI running on http://{}", ui_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints (http://{}):", api_addr);
    tracing::info!("  GET  /health - Health check");
    tracing::info!("  GET  /models - Allowed models");
    tracing::info!("  POST /chat   - Ask the agent");
    tracing::info!("");

    tokio::select! {
        result = backend.wait() => {
            tracing::error!("Problem with backend service");
            result
        }
        result = frontend.wait() => {
            tracing::error!("Problem with frontend service");
            result
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;

    use super::*;

    fn hello() -> Router {
        Router::new().route("/", get(|| async { "hi" }))
    }

    #[tokio::test]
    async fn test_ready_reports_bound_address() {
        let mut service = Service::spawn("test", "127.0.0.1:0".parse().unwrap(), hello());
        let addr = service.ready(Duration::from_secs(5)).await.unwrap();

        assert_ne!(addr.port(), 0);
        assert!(tokio::net::TcpStream::connect(addr).await.is_ok());
    }

    #[tokio::test]
    async fn test_bind_failure_surfaces_instead_of_hanging() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();

        let mut service = Service::spawn("test", addr, hello());
        let err = service.ready(Duration::from_secs(5)).await.unwrap_err();
        assert!(err.to_string().contains("failed to bind"));
    }

    #[tokio::test]
    async fn test_ready_is_single_use() {
        let mut service = Service::spawn("test", "127.0.0.1:0".parse().unwrap(), hello());
        service.ready(Duration::from_secs(5)).await.unwrap();
        assert!(service.ready(Duration::from_secs(1)).await.is_err());
    }
}
