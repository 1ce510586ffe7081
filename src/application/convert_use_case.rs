// ============================================================
// Layer 2 — ConvertUseCase
// ============================================================
// Load a weights file (usually the training .pth), check it
// against the architecture, and write a Burnpack checkpoint
// plus its model_config.json so later runs can skip the
// PyTorch pickle reader:
//
//   irrigation-vit convert --weights irrigation_vit_model.pth --out-dir checkpoints
//   irrigation-vit serve   --checkpoint-dir checkpoints

use anyhow::Result;
use std::path::PathBuf;

use crate::application::model_source::ModelSource;
use crate::infra::checkpoint::CheckpointManager;

pub struct ConvertUseCase {
    source:  ModelSource,
    out_dir: PathBuf,
}

/// Files written by a conversion.
#[derive(Debug)]
pub struct ConvertOutput {
    pub model:  PathBuf,
    pub config: PathBuf,
}

impl ConvertUseCase {
    pub fn new(source: ModelSource, out_dir: impl Into<PathBuf>) -> Self {
        Self { source, out_dir: out_dir.into() }
    }

    /// Load and validate the source weights, then write `model.bpk`
    /// and `model_config.json` into the output directory.
    pub fn execute(&self) -> Result<ConvertOutput> {
        let cfg        = self.source.architecture()?;
        let inferencer = self.source.load()?;
        let ckpt       = CheckpointManager::new(&self.out_dir);

        let model  = ckpt.save_model(inferencer.model())?;
        let config = ckpt.save_config(&cfg)?;
        tracing::info!("Converted {} → '{}'", self.source.describe(), model.display());

        Ok(ConvertOutput { model, config })
    }
}
