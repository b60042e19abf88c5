use anyhow::{Context, Result};
use clap::Parser;
use ml::{ScanDataset, ScanDatasetConfig, SplitConfig};
use serde::Serialize;
use std::{fs, path::PathBuf};

// Loads a class-per-folder scan directory, applies the stratified split and
// reports the partition sizes. With --output-dir it also writes:
//   - labels.json: class names ordered by index (matches the classifier output);
//   - split.json: source paths of every partition, to reproduce the split elsewhere.

#[derive(Parser, Debug)]
#[command(name = "split-dataset", about = "Load a CT scan folder and split it into train/val/test")]
struct Args {
    /// Directory with one sub-directory per class
    #[arg(long)]
    data_dir: PathBuf,

    /// Optional directory for labels.json and split.json
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Width after resizing
    #[arg(long, default_value_t = 224)]
    image_width: u32,

    /// Height after resizing
    #[arg(long, default_value_t = 224)]
    image_height: u32,

    /// Share of each class held out for testing
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f32,

    /// Share of each class held out for validation
    #[arg(long, default_value_t = 0.1)]
    val_fraction: f32,

    /// Random seed for the split
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Serialize)]
struct SplitManifest {
    train: Vec<PathBuf>,
    validation: Vec<PathBuf>,
    test: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let dataset = ScanDataset::load(&ScanDatasetConfig {
        data_dir: args.data_dir,
        width: args.image_width,
        height: args.image_height,
    })?;
    let split = dataset.split(&SplitConfig {
        test_fraction: args.test_fraction,
        val_fraction: args.val_fraction,
        seed: args.seed,
    })?;

    let labels = dataset.label_names();
    for (name, part) in [
        ("train", &split.train),
        ("validation", &split.validation),
        ("test", &split.test),
    ] {
        let counts = part
            .class_counts()
            .iter()
            .zip(labels.iter())
            .map(|(count, label)| format!("{label}={count}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("{name:<10} {:>6} samples ({counts})", part.len());
    }

    if let Some(output_dir) = args.output_dir {
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("cannot create output directory {}", output_dir.display()))?;

        let labels_path = output_dir.join("labels.json");
        let file = fs::File::create(&labels_path)
            .with_context(|| format!("cannot create {}", labels_path.display()))?;
        serde_json::to_writer_pretty(file, &*labels)
            .with_context(|| format!("failed to write {}", labels_path.display()))?;

        let manifest = SplitManifest {
            train: split.train.iter().map(|s| s.source.clone()).collect(),
            validation: split.validation.iter().map(|s| s.source.clone()).collect(),
            test: split.test.iter().map(|s| s.source.clone()).collect(),
        };
        let split_path = output_dir.join("split.json");
        let file = fs::File::create(&split_path)
            .with_context(|| format!("cannot create {}", split_path.display()))?;
        serde_json::to_writer_pretty(file, &manifest)
            .with_context(|| format!("failed to write {}", split_path.display()))?;

        println!(
            "wrote {} and {}",
            labels_path.display(),
            split_path.display()
        );
    }

    Ok(())
}
