// ============================================================
// Layer 2 — ModelSource
// ============================================================
// Where the weights (and optionally the architecture) come from.
// Shared by every subcommand that needs a loaded model.
//
//   --checkpoint-dir DIR      DIR/model_config.json + DIR/model.bpk
//                             (as written by `convert`); wins over
//                             --weights and --model-config
//   --weights FILE            .pth/.pt/.bpk into the architecture
//   [--model-config JSON]     from JSON, or the default config
//
// The default IrrigationVitConfig matches the vit_tiny trunk
// the .pth was trained on.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::infra::checkpoint::{load_config, CheckpointManager};
use crate::ml::{
    inferencer::{InferBackend, Inferencer},
    model::IrrigationVitConfig,
};

pub const DEFAULT_WEIGHTS: &str = "irrigation_vit_model.pth";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSource {
    pub weights:        PathBuf,
    pub model_config:   Option<PathBuf>,
    pub checkpoint_dir: Option<PathBuf>,
}

impl Default for ModelSource {
    fn default() -> Self {
        Self {
            weights:        PathBuf::from(DEFAULT_WEIGHTS),
            model_config:   None,
            checkpoint_dir: None,
        }
    }
}

impl ModelSource {
    /// The architecture the weights will be loaded into.
    pub fn architecture(&self) -> Result<IrrigationVitConfig> {
        if let Some(dir) = &self.checkpoint_dir {
            return CheckpointManager::new(dir).load_config();
        }
        match &self.model_config {
            Some(path) => load_config(path),
            None       => Ok(IrrigationVitConfig::new()),
        }
    }

    /// Build the architecture and load the weights into it on the CPU.
    pub fn load(&self) -> Result<Inferencer> {
        if let Some(dir) = &self.checkpoint_dir {
            let device = Default::default();
            let model  = CheckpointManager::new(dir).load_model::<InferBackend>(&device)?;
            tracing::info!("Model loaded from checkpoint '{}'", dir.display());
            return Ok(Inferencer::new(model, device));
        }
        let cfg = self.architecture()?;
        Inferencer::from_weights(&self.weights, &cfg, Default::default())
    }

    /// Human-readable origin for log lines.
    pub fn describe(&self) -> String {
        match &self.checkpoint_dir {
            Some(dir) => format!("checkpoint '{}'", dir.display()),
            None      => format!("'{}'", self.weights.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{matrix::ImageMatrix, traits::Forecaster};
    use crate::ml::model::IrrigationVit;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("irrigation-vit-source-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_default_architecture_without_config() {
        let source = ModelSource::default();
        assert_eq!(source.architecture().unwrap().embed_dim, 192);
    }

    #[test]
    fn test_missing_config_file_fails() {
        let source = ModelSource {
            model_config: Some(PathBuf::from("/no/such/model_config.json")),
            ..ModelSource::default()
        };
        assert!(source.architecture().is_err());
    }

    #[test]
    fn test_missing_weights_fail_to_load() {
        let source = ModelSource {
            weights: PathBuf::from("/no/such/weights.pth"),
            ..ModelSource::default()
        };
        assert!(source.load().is_err());
    }

    #[test]
    fn test_loads_from_checkpoint_dir() {
        let device = Default::default();
        let cfg = IrrigationVitConfig::new()
            .with_embed_dim(8)
            .with_depth(1)
            .with_num_heads(2)
            .with_mlp_hidden(16);

        let dir  = scratch_dir("ckpt");
        let ckpt = CheckpointManager::new(&dir);
        let model: IrrigationVit<InferBackend> = cfg.init(&device);
        ckpt.save_config(&cfg).unwrap();
        ckpt.save_model(&model).unwrap();

        // --weights points nowhere; the checkpoint dir takes precedence
        let source = ModelSource {
            weights:        PathBuf::from("/no/such/weights.pth"),
            checkpoint_dir: Some(dir),
            ..ModelSource::default()
        };
        assert_eq!(source.architecture().unwrap().embed_dim, 8);

        let inferencer = source.load().unwrap();
        let input = ImageMatrix::new([[0.5; 7]; 14]);
        let p = inferencer.predict(&input).unwrap();
        assert!(p.schedule.iter().all(|s| *s == 0 || *s == 1));
        assert!(source.describe().starts_with("checkpoint '"));
    }

    #[test]
    fn test_empty_checkpoint_dir_fails() {
        let source = ModelSource {
            checkpoint_dir: Some(scratch_dir("empty")),
            ..ModelSource::default()
        };
        assert!(source.load().is_err());
    }
}
