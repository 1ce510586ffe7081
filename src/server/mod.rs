// ============================================================
// Layer 4 — HTTP Layer (axum)
// ============================================================
// Two routes, no authentication, every origin allowed:
//
//   POST /predict  {"image_data": [[..7..]; 14]}
//                  → {"success": true, "prediction": {"schedule", "quantity"}}
//   GET  /health   → {"status": "ok", "model_loaded": bool}
//
// The router state is a ModelState decided once at startup.
// A failed load leaves the service up but NotLoaded: /health
// keeps answering and /predict rejects with 500.
//
//   error.rs    — PredictError → status code + JSON body
//   worker.rs   — thread that owns the model and runs jobs
//   handlers.rs — the two route handlers

/// Request failures and their HTTP rendering
pub mod error;

/// Route handlers for /predict and /health
pub mod handlers;

/// Dedicated inference thread
pub mod worker;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use worker::InferenceWorker;

/// Whether startup produced a servable model.
#[derive(Clone)]
pub enum ModelState {
    NotLoaded,
    Ready(InferenceWorker),
}

impl ModelState {
    /// What /health reports as `model_loaded`.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The inference handle, or `None` when startup failed to load.
    /// /predict turns `None` into a 500 before touching the body.
    pub fn worker(&self) -> Option<&InferenceWorker> {
        match self {
            Self::Ready(worker) => Some(worker),
            Self::NotLoaded     => None,
        }
    }
}

/// Both routes with permissive CORS, bound to `state`.
pub fn router(state: ModelState) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
