//! Server startup and shutdown logic

use anyhow::{Context, Result};
use fnrt_config::RuntimeConfig;
use fnrt_execution::{ChildExit, ProcessSupervisor};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::pipeline::{build_router, AppState};

/// How long the handler process gets to stop once the listener has drained
const CHILD_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Server application struct
pub struct Server {
    config: Arc<RuntimeConfig>,
    shutdown: CancellationToken,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Result<axum::Router> {
        let state = AppState::from_config(&self.config)?;
        Ok(build_router(Arc::new(state)))
    }

    /// Start the handler process, then serve until shutdown
    ///
    /// Fails when the handler process could not be started or ended on
    /// its own.
    pub async fn start(self) -> Result<()> {
        self.log_config_summary();

        let supervisor = ProcessSupervisor::from_config(&self.config.handler, self.shutdown.clone());
        let mut lifecycle = supervisor.subscribe();
        tokio::spawn(async move {
            while lifecycle.changed().await.is_ok() {
                let state = *lifecycle.borrow_and_update();
                tracing::debug!("Handler process state: {:?}", state);
            }
        });
        let handle = supervisor.start()?;

        let app = self.build_app()?;
        let addr = self.config.server.listen_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        tracing::info!("Server listening on {}", listener.local_addr()?);

        let shutdown = self.shutdown.clone();
        let mut serving = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown.cancelled().await;
                    tracing::info!("Shutdown signal received, starting graceful shutdown...");
                })
                .await
        });

        let drain_timeout = self.config.server.drain_timeout;
        let drain_deadline = async {
            self.shutdown.cancelled().await;
            tokio::time::sleep(drain_timeout).await;
        };

        tokio::select! {
            served = &mut serving => served.context("Server task failed")??,
            _ = drain_deadline => {
                tracing::warn!(
                    "Connections still open {:?} after shutdown started, closing them",
                    drain_timeout
                );
                serving.abort();
            }
        }

        match tokio::time::timeout(CHILD_STOP_TIMEOUT, handle.wait()).await {
            Ok(exit @ ChildExit::Unexpected { .. }) => {
                anyhow::bail!("Forked function has terminated: {:?}", exit)
            }
            Ok(exit) => tracing::info!("Handler process stopped: {:?}", exit),
            Err(_) => tracing::warn!(
                "Handler process still running after {:?}, killing it",
                CHILD_STOP_TIMEOUT
            ),
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Log configuration summary
    fn log_config_summary(&self) {
        let config = &self.config;
        tracing::info!("=== fnrt Server Configuration ===");
        tracing::info!("Listen Address: {}", config.server.listen_address());
        tracing::info!("Upstream: {}", config.upstream.upstream_url());
        tracing::info!(
            "Retry Budget: {} x {:?}",
            config.upstream.retry_attempts,
            config.upstream.retry_interval
        );
        tracing::info!("Public: {}", if config.auth.public { "Yes" } else { "No" });
        tracing::info!(
            "Handler: {} ({})",
            config.handler.path,
            if config.handler.is_binary { "binary" } else { "bridged" }
        );
        tracing::info!("==================================");
    }
}
