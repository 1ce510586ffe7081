// ============================================================
// Layer 4 — Route Handlers
// ============================================================
// /predict checks, in order:
//   1. model loaded?                      → 500
//   2. body has "image_data"?             → 400
//   3. 14 rows, row 0 has 7 columns?      → 400
//   4. every cell coerces to f32?         → 400 with detail
// then hands the matrix to the inference worker.
//
// The body is taken as raw bytes so a missing Content-Type or
// malformed JSON lands in rejection 2 instead of an extractor
// error with a different shape.

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::domain::matrix::ImageMatrix;
use crate::domain::prediction::Prediction;
use crate::server::{error::PredictError, ModelState};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success:    bool,
    pub prediction: Prediction,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status:       &'static str,
    pub model_loaded: bool,
}

/// POST /predict
pub async fn predict(
    State(state): State<ModelState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, PredictError> {
    let worker = state.worker().ok_or(PredictError::ModelNotLoaded)?;

    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let input = ImageMatrix::from_payload(&payload).inspect_err(|e| {
        tracing::debug!("Rejected /predict payload: {e}");
    })?;

    let prediction = worker.predict(input).await?;
    tracing::debug!(
        "Scheduled {} of {} slots",
        prediction.schedule.iter().filter(|s| **s == 1).count(),
        prediction.schedule.len()
    );

    Ok(Json(PredictResponse { success: true, prediction }))
}

/// GET /health, always 200.
pub async fn health(State(state): State<ModelState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", model_loaded: state.is_loaded() })
}
