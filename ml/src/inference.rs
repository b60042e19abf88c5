use crate::model::ScanNet;
use crate::pipeline::ScoreModel;
use crate::preprocess::{CHANNELS, INPUT_SIZE, InputTensor};
use anyhow::{Context, Result, anyhow, ensure};
use burn::module::Module;
use burn::record::{DefaultFileRecorder, FullPrecisionSettings};
use burn::tensor::{Tensor, TensorData, backend::Backend};
use log::info;
use std::{path::PathBuf, sync::Mutex};

/// CPU (NdArray) backend so the demo runs without a GPU.
type InferenceBackend = burn::backend::ndarray::NdArray<f32>;

/// Where the trained weights live and what input size they were trained for.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub weight_path: PathBuf,
    pub input_width: u32,
    pub input_height: u32,
}

impl ModelConfig {
    pub fn new(weight_path: impl Into<PathBuf>) -> Self {
        Self {
            weight_path: weight_path.into(),
            input_width: INPUT_SIZE,
            input_height: INPUT_SIZE,
        }
    }
}

/// Burn classifier loaded from disk, usable as a [`ScoreModel`].
pub struct ScanClassifier {
    device: <InferenceBackend as Backend>::Device,
    model: Mutex<ScanNet<InferenceBackend>>,
    width: u32,
    height: u32,
}

impl ScanClassifier {
    /// Loads the weights described by `config`. Any failure here should stop startup.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let device = <InferenceBackend as Backend>::Device::default();

        let model = ScanNet::<InferenceBackend>::new(
            &device,
            config.input_height as usize,
            config.input_width as usize,
        )
        .load_file(
            &config.weight_path,
            &DefaultFileRecorder::<FullPrecisionSettings>::new(),
            &device,
        )
        .with_context(|| format!("failed to load model weights: {}", config.weight_path.display()))?;

        info!(
            "loaded classifier {} ({}x{})",
            config.weight_path.display(),
            config.input_width,
            config.input_height
        );

        Ok(Self {
            device,
            model: Mutex::new(model),
            width: config.input_width,
            height: config.input_height,
        })
    }

    /// `(width, height)` the weights expect.
    pub fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl ScoreModel for ScanClassifier {
    fn score(&self, input: &InputTensor) -> Result<f32> {
        let expected = [1, self.height as usize, self.width as usize, CHANNELS];
        ensure!(
            input.shape() == expected,
            "input shape {:?} does not match model input {:?}",
            input.shape(),
            expected
        );

        let tensor = Tensor::<InferenceBackend, 4>::from_data(
            TensorData::new(input.data().to_vec(), input.shape()),
            &self.device,
        );

        let probs = {
            let model = self
                .model
                .lock()
                .map_err(|_| anyhow!("classifier lock poisoned"))?;
            model.predict(tensor)
        };

        let values = probs
            .into_data()
            .into_vec::<f32>()
            .map_err(|err| anyhow!("failed to read classifier output: {err:?}"))?;

        values
            .first()
            .copied()
            .ok_or_else(|| anyhow!("classifier returned no output"))
    }
}
