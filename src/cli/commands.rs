// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `serve`, `predict` and `convert`.
// Every flag can also come from an IRRIGATION_* environment
// variable, which is how container deployments configure it.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::model_source::ModelSource;
use crate::application::serve_use_case::ServeConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the model and serve POST /predict and GET /health
    Serve(ServeArgs),

    /// Run one prediction from a JSON request file and print the response
    Predict(PredictArgs),

    /// Convert a PyTorch state dict into a Burnpack checkpoint
    Convert(ConvertArgs),
}

/// Where to find the trained model.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Weights file: .pth/.pt (PyTorch state dict) or .bpk (Burnpack)
    #[arg(long, env = "IRRIGATION_WEIGHTS", default_value = "irrigation_vit_model.pth")]
    pub weights: PathBuf,

    /// Architecture JSON written by `convert`.
    /// Omit to use the default vit_tiny trunk with (2,1) patches.
    #[arg(long, env = "IRRIGATION_MODEL_CONFIG")]
    pub model_config: Option<PathBuf>,

    /// Directory holding model.bpk + model_config.json from `convert`.
    /// Takes precedence over --weights and --model-config.
    #[arg(long, env = "IRRIGATION_CHECKPOINT_DIR")]
    pub checkpoint_dir: Option<PathBuf>,
}

impl From<ModelArgs> for ModelSource {
    fn from(a: ModelArgs) -> Self {
        ModelSource {
            weights:        a.weights,
            model_config:   a.model_config,
            checkpoint_dir: a.checkpoint_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to listen on
    #[arg(long, env = "IRRIGATION_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on (the companion backend uses 5001)
    #[arg(long, env = "IRRIGATION_PORT", default_value_t = 5002)]
    pub port: u16,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Convert CLI ServeArgs into the application-layer ServeConfig.
impl From<ServeArgs> for ServeConfig {
    fn from(a: ServeArgs) -> Self {
        ServeConfig {
            host:  a.host,
            port:  a.port,
            model: a.model.into(),
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// JSON file shaped like the /predict body: {"image_data": [[..]]}
    #[arg(long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Directory to write model.bpk and model_config.json into
    #[arg(long, default_value = "checkpoints")]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,
}
