// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Loads trained weights into a freshly built IrrigationVit.
//
// Supported weight files:
//   irrigation_vit_model.pth  ← PyTorch state dict (training output)
//   model.bpk                 ← Burnpack, written by `convert`
//
// Both go through burn-store, which checks every tensor's shape
// against the model we built from the config. Missing tensors or
// a shape mismatch fail the load; a half-loaded model is never
// returned.
//
// A converted checkpoint directory looks like:
//   checkpoints/
//     model.bpk            ← weights
//     model_config.json    ← IrrigationVitConfig used to build them
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{anyhow, bail, Context, Result};
use burn::prelude::*;
use burn_store::{BurnpackStore, ModuleSnapshot, PytorchStore};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::model::{IrrigationVit, IrrigationVitConfig};

const MODEL_FILE:  &str = "model.bpk";
const CONFIG_FILE: &str = "model_config.json";

/// On-disk layout of a weights file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightsFormat {
    /// `.pth` / `.pt` — PyTorch pickle state dict
    PyTorch,
    /// `.bpk` — Burn's native format
    Burnpack,
}

impl WeightsFormat {
    /// Anything but .pth, .pt or .bpk is an error.
    pub fn detect(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("pth") | Some("pt") => Ok(Self::PyTorch),
            Some("bpk")              => Ok(Self::Burnpack),
            _ => bail!(
                "Unsupported weights file '{}': expected .pth, .pt or .bpk",
                path.display()
            ),
        }
    }
}

/// Build the architecture described by `config` and fill it with the
/// weights at `path`.
pub fn load_weights<B: Backend>(
    path:   &Path,
    config: &IrrigationVitConfig,
    device: &B::Device,
) -> Result<IrrigationVit<B>> {
    config.validate().context("Invalid model architecture")?;
    let format = WeightsFormat::detect(path)?;

    if !path.is_file() {
        bail!("Cannot find weights file '{}'", path.display());
    }

    let mut model: IrrigationVit<B> = config.init(device);
    tracing::info!("Loading {:?} weights from '{}'", format, path.display());

    let result = match format {
        WeightsFormat::PyTorch => {
            let mut store = PytorchStore::from_file(path);
            model.load_from(&mut store).map_err(|e| anyhow!("{e}"))
        }
        WeightsFormat::Burnpack => {
            let mut store = BurnpackStore::from_file(path);
            model.load_from(&mut store).map_err(|e| anyhow!("{e}"))
        }
    }
    .with_context(|| {
        format!(
            "Weights in '{}' don't match the configured architecture",
            path.display()
        )
    })?;

    if !result.unused.is_empty() {
        tracing::warn!("Ignored {} unused tensors: {:?}", result.unused.len(), result.unused);
    }
    tracing::debug!("Applied {} tensors", result.applied.len());

    Ok(model)
}

/// Reads and writes converted checkpoints in one directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Write the model as Burnpack, replacing any previous file.
    pub fn save_model<B: Backend>(&self, model: &IrrigationVit<B>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.model_path();
        let mut store = BurnpackStore::from_file(&path).overwrite(true);
        model
            .save_into(&mut store)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint to '{}'", path.display());
        Ok(path)
    }

    /// Write `cfg` as pretty JSON next to the weights.
    pub fn save_config(&self, cfg: &IrrigationVitConfig) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.config_path();
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        Ok(path)
    }

    /// Read this directory's model_config.json.
    pub fn load_config(&self) -> Result<IrrigationVitConfig> {
        load_config(&self.config_path())
    }

    /// Load the model_config.json + model.bpk pair from this directory.
    pub fn load_model<B: Backend>(&self, device: &B::Device) -> Result<IrrigationVit<B>> {
        let cfg = self.load_config()?;
        load_weights(&self.model_path(), &cfg, device)
    }
}

/// Read an architecture JSON written by [`CheckpointManager::save_config`].
pub fn load_config(path: &Path) -> Result<IrrigationVitConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read model config from '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Malformed model config '{}'", path.display()))
}
