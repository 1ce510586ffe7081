// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The HTTP layer and the CLI never see Burn. They talk to a
// Forecaster, which turns one ImageMatrix into head outputs.
//
// Implementations:
//   - Inferencer<B> → runs the ViT forward pass (Layer 5)
//   - test stubs    → fixed outputs for handler tests
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::matrix::ImageMatrix;
use crate::domain::prediction::{Prediction, RawPrediction};

// ─── Forecaster ───────────────────────────────────────────────────────────────
/// Anything that can produce a 14-slot irrigation forecast.
///
/// Must be deterministic: the same input always yields the
/// same output, and no call mutates the underlying model.
pub trait Forecaster {
    /// Run one forward pass and return the head outputs.
    fn forecast(&self, input: &ImageMatrix) -> Result<RawPrediction>;

    /// Forecast and post-process into the wire-level plan.
    fn predict(&self, input: &ImageMatrix) -> Result<Prediction> {
        self.forecast(input).map(Prediction::from)
    }
}
