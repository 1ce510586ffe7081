// ============================================================
// Layer 2 — ServeUseCase
// ============================================================
// Startup sequence for the HTTP service:
//
//   Step 1: Load weights once                  (Layer 5/6)
//           success → ModelState::Ready(worker)
//           failure → logged, ModelState::NotLoaded
//   Step 2: Bind host:port                     (tokio)
//   Step 3: Serve /predict and /health         (Layer 4)
//           until Ctrl-C
//
// A load failure never stops the process: /health reports
// model_loaded=false and /predict answers 500.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::application::model_source::ModelSource;
use crate::server::{router, worker::InferenceWorker, ModelState};

/// Port 5001 belongs to the companion backend.
pub const DEFAULT_PORT: u16 = 5002;
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    pub host:  String,
    pub port:  u16,
    pub model: ModelSource,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host:  DEFAULT_HOST.to_string(),
            port:  DEFAULT_PORT,
            model: ModelSource::default(),
        }
    }
}

pub struct ServeUseCase {
    config: ServeConfig,
}

impl ServeUseCase {
    pub fn new(config: ServeConfig) -> Self {
        Self { config }
    }

    /// Load the model and hand it to the inference thread.
    /// Any failure is logged and yields `NotLoaded`.
    pub fn load_state(&self) -> ModelState {
        tracing::info!("Loading model from {}", self.config.model.describe());

        let worker = self
            .config
            .model
            .load()
            .and_then(InferenceWorker::spawn);

        match worker {
            Ok(worker) => {
                tracing::info!("Model loaded successfully");
                ModelState::Ready(worker)
            }
            Err(e) => {
                tracing::error!("Could not load model: {e:#}");
                ModelState::NotLoaded
            }
        }
    }

    /// Load the model, then block on the HTTP server until Ctrl-C.
    ///
    /// Only runtime, bind and server errors are returned. A failed
    /// model load is not one of them.
    pub fn execute(&self) -> Result<()> {
        let state = self.load_state();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Cannot start tokio runtime")?;
        runtime.block_on(self.serve(state))
    }

    async fn serve(&self, state: ModelState) -> Result<()> {
        let address  = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Cannot bind {address}"))?;

        tracing::info!(
            "Listening on http://{address} (model_loaded={})",
            state.is_loaded()
        );

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
