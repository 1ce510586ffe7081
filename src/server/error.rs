// ============================================================
// Layer 4 — Request Errors
// ============================================================
// Every way a /predict call can fail, with the HTTP status it
// maps to. Rendered as {"success": false, "error": "<message>"}.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::matrix::InputError;

#[derive(Debug, Error)]
pub enum PredictError {
    /// Weights failed to load at startup.
    #[error("Model is not loaded on the server.")]
    ModelNotLoaded,

    /// The request body didn't parse into a 14×7 matrix.
    #[error(transparent)]
    Input(#[from] InputError),

    /// The forward pass failed or the inference worker is gone.
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl PredictError {
    /// 400 for bad input, 500 for everything on our side.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ModelNotLoaded | Self::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Input(_)                            => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error:   String,
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let body = ErrorBody { success: false, error: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}
