// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{anyhow, Result};
use burn::prelude::*;
use std::path::Path;

use crate::domain::matrix::{ImageMatrix, FEATURES, SLOTS};
use crate::domain::prediction::RawPrediction;
use crate::domain::traits::Forecaster;
use crate::infra::checkpoint::load_weights;
use crate::ml::model::{IrrigationVit, IrrigationVitConfig};

/// CPU backend without autodiff: no gradients are ever tracked,
/// so a forward pass can't mutate parameters.
pub type InferBackend = burn::backend::NdArray<f32>;

/// A loaded model plus the device its tensors live on.
pub struct Inferencer<B: Backend = InferBackend> {
    model:  IrrigationVit<B>,
    device: B::Device,
}

impl<B: Backend> Inferencer<B> {
    /// Wrap a model that is already built (and loaded) on `device`.
    pub fn new(model: IrrigationVit<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Build `config` on `device` and load the weights file at `path`.
    pub fn from_weights(
        path:   &Path,
        config: &IrrigationVitConfig,
        device: B::Device,
    ) -> Result<Self> {
        let model = load_weights(path, config, &device)?;
        tracing::info!(
            "Model loaded: depth={}, embed_dim={}, heads={}",
            config.depth, config.embed_dim, config.num_heads
        );
        Ok(Self { model, device })
    }

    pub fn model(&self) -> &IrrigationVit<B> {
        &self.model
    }
}

impl<B: Backend> Forecaster for Inferencer<B> {
    fn forecast(&self, input: &ImageMatrix) -> Result<RawPrediction> {
        // [14, 7] → [batch=1, channel=1, 14, 7]
        let data  = TensorData::new(input.to_flat_vec(), [1, 1, SLOTS, FEATURES]);
        let image = Tensor::<B, 4>::from_data(data, &self.device);

        let output = self.model.forward(image);

        Ok(RawPrediction {
            schedule_prob: to_slots(output.schedule)?,
            quantity:      to_slots(output.quantity)?,
        })
    }
}

/// [1, 14] → [f32; 14]
fn to_slots<B: Backend>(t: Tensor<B, 2>) -> Result<[f32; SLOTS]> {
    let values = t
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read model output: {e:?}"))?;
    let len = values.len();
    values
        .try_into()
        .map_err(|_| anyhow!("Model produced {len} outputs, expected {SLOTS}"))
}
