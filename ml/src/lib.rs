#![recursion_limit = "256"]

pub mod dataset;
pub mod diagnosis;
pub mod error;
pub mod inference;
pub mod model;
pub mod pipeline;
pub mod preprocess;

pub use dataset::{DatasetSplit, ScanDataset, ScanDatasetConfig, ScanSample, SplitConfig};
pub use diagnosis::{DECISION_THRESHOLD, Diagnosis, DiagnosisLabel, FixedRisk, RandomRisk, RiskSource};
pub use error::PipelineError;
pub use inference::{ModelConfig, ScanClassifier};
pub use pipeline::{DiagnosisPipeline, ScoreModel};
pub use preprocess::{CHANNELS, INPUT_SIZE, InputTensor};
