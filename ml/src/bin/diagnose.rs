#![recursion_limit = "256"]

use anyhow::{Context, Result};
use clap::Parser;
use ml::{DiagnosisPipeline, ModelConfig, RandomRisk, ScanClassifier};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "diagnose", about = "Run the CT screening pipeline on a single image")]
struct Args {
    /// Directory holding the trained weights
    #[arg(long)]
    model_dir: PathBuf,

    /// Weights file name inside the model directory (without extension)
    #[arg(long, default_value = "scan_net")]
    weights: String,

    /// Image to classify (jpg, jpeg or png)
    #[arg(long)]
    image: PathBuf,

    /// Print the diagnosis as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = ModelConfig::new(args.model_dir.join(&args.weights));
    let classifier = ScanClassifier::load(&config)?;
    let pipeline = DiagnosisPipeline::new(classifier, RandomRisk);

    let diagnosis = pipeline
        .diagnose_path(&args.image)
        .with_context(|| format!("failed to diagnose {}", args.image.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        return Ok(());
    }

    println!("Diagnosis:        {}", diagnosis.label);
    println!("Model confidence: {:.2}%", diagnosis.confidence_pct);
    if let Some(risk) = diagnosis.future_risk_pct {
        println!("Future risk:      {risk}% (random placeholder, not a model prediction)");
    }

    Ok(())
}
