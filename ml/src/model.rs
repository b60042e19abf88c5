use burn::{
    module::Module,
    nn::{
        Linear, LinearConfig, PaddingConfig2d,
        conv::Conv2dConfig,
        pool::{MaxPool2d, MaxPool2dConfig},
    },
    tensor::{
        Tensor,
        activation::{relu, sigmoid},
        backend::Backend,
    },
};

/// Small CNN used as the binary CT scan classifier.
#[derive(Module, Debug)]
pub struct ScanNet<B: Backend> {
    conv1: burn::nn::conv::Conv2d<B>,
    conv2: burn::nn::conv::Conv2d<B>,
    pool1: MaxPool2d,
    pool2: MaxPool2d,
    fc1: Linear<B>,
    fc_out: Linear<B>,
}

impl<B: Backend> ScanNet<B> {
    /// Builds the network for a fixed input size.
    ///
    /// # Arguments
    /// - `device`: target device (CPU for NdArray).
    /// - `input_height`, `input_width`: spatial size of the NHWC input.
    pub fn new(device: &B::Device, input_height: usize, input_width: usize) -> Self {
        assert!(
            input_height >= 4 && input_width >= 4,
            "input must be at least 4x4, got {}x{}",
            input_height,
            input_width
        );

        let conv1 = Conv2dConfig::new([3, 16], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);

        let conv2 = Conv2dConfig::new([16, 32], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);

        let pool1 = MaxPool2dConfig::new([2, 2]).init();
        let pool2 = MaxPool2dConfig::new([2, 2]).init();

        let height_after = (input_height / 2).max(1) / 2;
        let width_after = (input_width / 2).max(1) / 2;
        let flattened = 32 * height_after * width_after;

        let fc1 = LinearConfig::new(flattened, 128).init(device);
        let fc_out = LinearConfig::new(128, 1).init(device);

        Self {
            conv1,
            conv2,
            pool1,
            pool2,
            fc1,
            fc_out,
        }
    }

    /// Takes `[batch, height, width, 3]` and returns one logit per image, `[batch, 1]`.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = input.permute([0, 3, 1, 2]);

        let x = relu(self.conv1.forward(x));
        let x = self.pool1.forward(x);

        let x = relu(self.conv2.forward(x));
        let x = self.pool2.forward(x);

        let x = x.flatten(1, 3);
        let x = relu(self.fc1.forward(x));
        self.fc_out.forward(x)
    }

    /// Sigmoid of [`forward`](Self::forward): probability of the positive class.
    pub fn predict(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        sigmoid(self.forward(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn predicts_one_probability_per_image() {
        let device = Default::default();
        let net = ScanNet::<TestBackend>::new(&device, 8, 8);
        let input = Tensor::<TestBackend, 4>::ones([2, 8, 8, 3], &device);

        let probs = net.predict(input);
        assert_eq!(probs.dims(), [2, 1]);

        let values = probs.into_data().into_vec::<f32>().unwrap();
        assert_eq!(values.len(), 2);
        assert!(values.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    #[should_panic(expected = "at least 4x4")]
    fn rejects_tiny_inputs() {
        let device = Default::default();
        let _ = ScanNet::<TestBackend>::new(&device, 2, 8);
    }
}
