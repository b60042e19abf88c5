#![recursion_limit = "256"]

mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use ml::{DiagnosisPipeline, RandomRisk, ScanClassifier};
use screening::{
    AppConfig, FlowController, NoPacer, Pacer, Session, ThreadPacer, UploadStore, load_config,
};
use std::{io, path::PathBuf, sync::Arc};

#[derive(Parser, Debug)]
#[command(name = "screening", about = "Pancreatic cancer CT screening wizard")]
struct Args {
    /// JSON configuration file; built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the model directory from the configuration
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Override the upload directory from the configuration
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Skip the pauses between pages
    #[arg(long, default_value_t = false)]
    no_delay: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &args.model_dir {
        config.model.dir = dir.to_string_lossy().into_owned();
    }
    if let Some(dir) = &args.upload_dir {
        config.uploads.dir = dir.to_string_lossy().into_owned();
    }

    let model_config = config.model.to_ml_config();
    let classifier = ScanClassifier::load(&model_config).with_context(|| {
        format!(
            "cannot start without a model; expected weights at {}",
            model_config.weight_path.display()
        )
    })?;
    info!("model loaded from {}", model_config.weight_path.display());

    warn!("using the static demo credentials from the configuration; do not expose this build");

    let pacer: Arc<dyn Pacer> = if args.no_delay {
        Arc::new(NoPacer)
    } else {
        Arc::new(ThreadPacer)
    };
    let controller = FlowController::new(
        Arc::new(config.auth.to_authenticator()),
        Arc::new(DiagnosisPipeline::new(classifier, RandomRisk)),
        UploadStore::new(&config.uploads.dir),
        pacer,
        config.pacing.to_pacing(),
    );

    let mut session = Session::new();
    info!("session {} started", session.id());
    let outcome = terminal::run(&controller, &mut session, io::stdin().lock(), io::stdout());

    if let Err(err) = controller.uploads().discard(session.id()) {
        warn!("failed to clean uploads of session {}: {err}", session.id());
    }
    outcome
}
