// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// One-shot offline prediction: same validation and the same
// JSON envelope as POST /predict, but reading the body from a
// file and running the forward pass on the calling thread.

use anyhow::{Context, Result};
use serde_json::Value;
use std::{fs, path::Path};

use crate::application::model_source::ModelSource;
use crate::domain::{matrix::ImageMatrix, prediction::Prediction, traits::Forecaster};
use crate::server::{error::ErrorBody, error::PredictError, handlers::PredictResponse};

pub struct PredictUseCase<F: Forecaster> {
    forecaster: F,
}

impl PredictUseCase<crate::ml::inferencer::Inferencer> {
    /// Load the real model from `source`.
    pub fn load(source: &ModelSource) -> Result<Self> {
        Ok(Self::new(source.load()?))
    }
}

impl<F: Forecaster> PredictUseCase<F> {
    pub fn new(forecaster: F) -> Self {
        Self { forecaster }
    }

    /// Validate `payload` and run one forward pass.
    ///
    /// Rejections are the same [`PredictError`] values the endpoint
    /// produces, so [`render`] gives the identical envelope.
    pub fn run(&self, payload: &Value) -> Result<Prediction, PredictError> {
        let input = ImageMatrix::from_payload(payload)?;
        self.forecaster
            .predict(&input)
            .map_err(|e| PredictError::Inference(format!("{e:#}")))
    }

    /// Read a request body from `path`. Malformed JSON is treated
    /// like a body without "image_data", as the endpoint does.
    pub fn run_file(&self, path: &Path) -> Result<Result<Prediction, PredictError>> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read input file '{}'", path.display()))?;
        let payload = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(self.run(&payload))
    }
}

/// The JSON envelope POST /predict would have returned.
pub fn render(result: &Result<Prediction, PredictError>) -> Result<String> {
    let json = match result {
        Ok(prediction) => serde_json::to_string_pretty(&PredictResponse {
            success:    true,
            prediction: prediction.clone(),
        })?,
        Err(e) => serde_json::to_string_pretty(&ErrorBody {
            success: false,
            error:   e.to_string(),
        })?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matrix::{FEATURES, SLOTS};
    use crate::domain::prediction::RawPrediction;
    use crate::domain::matrix::InputError;
    use serde_json::json;

    struct Echo;

    impl Forecaster for Echo {
        fn forecast(&self, input: &ImageMatrix) -> anyhow::Result<RawPrediction> {
            let v = input.rows()[0][0];
            Ok(RawPrediction { schedule_prob: [v; SLOTS], quantity: [v; SLOTS] })
        }
    }

    #[test]
    fn test_runs_valid_payload() {
        let payload = json!({ "image_data": vec![vec![0.8; FEATURES]; SLOTS] });
        let p = PredictUseCase::new(Echo).run(&payload).unwrap();
        assert_eq!(p.schedule, [1; SLOTS]);
        assert_eq!(p.quantity, [0.8; SLOTS]);
    }

    #[test]
    fn test_rejects_like_the_endpoint() {
        let err = PredictUseCase::new(Echo).run(&json!({})).unwrap_err();
        assert!(matches!(err, PredictError::Input(InputError::MissingImageData)));
    }

    #[test]
    fn test_render_envelopes() {
        let ok: Result<Prediction, PredictError> = PredictUseCase::new(Echo)
            .run(&json!({ "image_data": vec![vec![0.2; FEATURES]; SLOTS] }));
        let v: Value = serde_json::from_str(&render(&ok).unwrap()).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["prediction"]["schedule"][0], 0);

        let err: Result<Prediction, PredictError> = Err(InputError::InvalidShape.into());
        let v: Value = serde_json::from_str(&render(&err).unwrap()).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "Input \"image_data\" must be a 14x7 matrix.");
    }

    #[test]
    fn test_missing_input_file_is_an_error() {
        let res = PredictUseCase::new(Echo).run_file(Path::new("/no/such/input.json"));
        assert!(res.is_err());
    }
}
