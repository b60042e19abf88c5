use crate::diagnosis::{Diagnosis, RiskSource};
use crate::error::PipelineError;
use crate::preprocess::{self, InputTensor};
use image::DynamicImage;
use log::debug;
use std::path::Path;

/// A loaded binary classifier: one `(1, H, W, 3)` tensor in, one score in `[0, 1]` out.
///
/// Implementations are shared read-only between sessions.
pub trait ScoreModel: Send + Sync {
    fn score(&self, input: &InputTensor) -> anyhow::Result<f32>;
}

/// Preprocessing, inference and the decision rule, in that order.
pub struct DiagnosisPipeline {
    model: Box<dyn ScoreModel>,
    risk: Box<dyn RiskSource>,
}

impl DiagnosisPipeline {
    pub fn new(model: impl ScoreModel + 'static, risk: impl RiskSource + 'static) -> Self {
        Self {
            model: Box::new(model),
            risk: Box::new(risk),
        }
    }

    /// Decodes the image at `path` and diagnoses it.
    pub fn diagnose_path(&self, path: &Path) -> Result<Diagnosis, PipelineError> {
        let tensor = preprocess::preprocess_path(path)?;
        self.diagnose_tensor(&tensor)
    }

    /// Diagnoses an already decoded image.
    pub fn diagnose_image(&self, image: &DynamicImage) -> Result<Diagnosis, PipelineError> {
        let tensor = preprocess::preprocess(image);
        self.diagnose_tensor(&tensor)
    }

    fn diagnose_tensor(&self, tensor: &InputTensor) -> Result<Diagnosis, PipelineError> {
        let score = self.model.score(tensor).map_err(PipelineError::Model)?;
        debug!("classifier score {score:.4}");
        Diagnosis::from_score(score, self.risk.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::{DiagnosisLabel, FixedRisk};
    use crate::preprocess::{CHANNELS, INPUT_SIZE};
    use image::{Rgb, RgbImage};
    use std::sync::Mutex;

    /// Records the shape it was called with and returns a fixed score.
    struct ShapeProbe {
        score: f32,
        seen: Mutex<Vec<[usize; 4]>>,
    }

    impl ScoreModel for ShapeProbe {
        fn score(&self, input: &InputTensor) -> anyhow::Result<f32> {
            self.seen.lock().unwrap().push(input.shape());
            Ok(self.score)
        }
    }

    struct Broken;

    impl ScoreModel for Broken {
        fn score(&self, _input: &InputTensor) -> anyhow::Result<f32> {
            anyhow::bail!("weights corrupted")
        }
    }

    fn probe(score: f32) -> ShapeProbe {
        ShapeProbe {
            score,
            seen: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn model_receives_fixed_input_shape() {
        let pipeline = DiagnosisPipeline::new(probe(0.7), FixedRisk(30));
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 120, Rgb([1, 2, 3])));

        let diagnosis = pipeline.diagnose_image(&image).unwrap();
        assert_eq!(diagnosis.label, DiagnosisLabel::CancerDetected);
        assert!((diagnosis.confidence_pct - 70.0).abs() < 1e-4);
    }

    #[test]
    fn probe_sees_batch_of_one() {
        let model = probe(0.2);
        let tensor = preprocess::preprocess(&DynamicImage::new_luma8(10, 10));
        model.score(&tensor).unwrap();
        assert_eq!(
            model.seen.lock().unwrap().as_slice(),
            &[[1, INPUT_SIZE as usize, INPUT_SIZE as usize, CHANNELS]]
        );
    }

    #[test]
    fn model_failure_is_reported() {
        let pipeline = DiagnosisPipeline::new(Broken, FixedRisk(30));
        let err = pipeline
            .diagnose_image(&DynamicImage::new_rgb8(8, 8))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Model(_)));
        assert!(err.to_string().contains("weights corrupted"));
    }

    #[test]
    fn path_is_decoded_before_inference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        RgbImage::from_pixel(40, 40, Rgb([200, 200, 200]))
            .save(&path)
            .unwrap();

        let pipeline = DiagnosisPipeline::new(probe(0.3), FixedRisk(55));
        let diagnosis = pipeline.diagnose_path(&path).unwrap();
        assert_eq!(diagnosis.label, DiagnosisLabel::NoCancerDetected);
        assert_eq!(diagnosis.future_risk_pct, Some(55));
    }
}
