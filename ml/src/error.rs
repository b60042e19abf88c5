use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single pass through the diagnosis pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The image could not be opened or decoded as a raster image.
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The classifier itself failed to produce a score.
    #[error("model inference failed: {0:#}")]
    Model(anyhow::Error),

    /// The classifier returned something that is not a probability.
    #[error("model score {0} is outside [0, 1]")]
    ScoreOutOfRange(f32),
}
