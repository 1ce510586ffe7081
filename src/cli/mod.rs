// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and delegates to Layer 2.
//
//   1. `serve`   — load weights, run the HTTP service
//   2. `predict` — one offline prediction from a JSON file
//   3. `convert` — .pth → Burnpack checkpoint
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{bail, Result};
use clap::Parser;
use commands::{Commands, ConvertArgs, PredictArgs, ServeArgs};

#[derive(Parser, Debug)]
#[command(
    name = "irrigation-vit",
    version,
    about = "Serve a ViT irrigation model: 14x7 features in, 14-day schedule and quantities out."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve(args)   => Self::run_serve(args),
            Commands::Predict(args) => Self::run_predict(args),
            Commands::Convert(args) => Self::run_convert(args),
        }
    }

    fn run_serve(args: ServeArgs) -> Result<()> {
        use crate::application::serve_use_case::ServeUseCase;

        ServeUseCase::new(args.into()).execute()
    }

    fn run_predict(args: PredictArgs) -> Result<()> {
        use crate::application::predict_use_case::{render, PredictUseCase};

        let use_case = PredictUseCase::load(&args.model.into())?;
        let result   = use_case.run_file(&args.input)?;
        println!("{}", render(&result)?);

        if let Err(e) = result {
            bail!("Prediction failed: {e}");
        }
        Ok(())
    }

    fn run_convert(args: ConvertArgs) -> Result<()> {
        use crate::application::convert_use_case::ConvertUseCase;

        let output = ConvertUseCase::new(args.model.into(), args.out_dir).execute()?;
        println!("Weights: {}", output.model.display());
        println!("Config:  {}", output.config.display());
        Ok(())
    }
}
