use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::CrossEntropyLossConfig,
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

/// Network definition. Three size-preserving conv layers, each followed by
/// a 2×2 stride-2 max-pool, then a two-layer classifier head. Spatial size
/// halves per block (28 → 14 → 7 → 4), so the flattened features are
/// `num_filters * 4 * 4` — with 36 filters, the same width as the hidden
/// dense layer.
#[derive(Config, Debug)]
pub struct DigitCnnConfig {
    /// Channels produced by every convolution
    #[config(default = 36)]
    pub num_filters: usize,

    /// Width of the hidden dense layer
    #[config(default = 576)]
    pub hidden_size: usize,

    /// Drop probability of the head dropout, active only in training
    #[config(default = 0.4)]
    pub dropout: f64,

    #[config(default = 10)]
    pub num_classes: usize,
}

impl DigitCnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DigitCnn<B> {
        let nf = self.num_filters;

        // Even kernels cannot preserve the input size with symmetric
        // padding: 14×14 needs 6 before / 7 after, 4×4 needs 1 / 2.
        let conv_a = Conv2dConfig::new([1, nf], [14, 14])
            .with_padding(PaddingConfig2d::Explicit(6, 6, 7, 7))
            .init(device);
        let conv_b = Conv2dConfig::new([nf, nf], [7, 7])
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let conv_c = Conv2dConfig::new([nf, nf], [4, 4])
            .with_padding(PaddingConfig2d::Explicit(1, 1, 2, 2))
            .init(device);

        // Ceil mode rounds odd extents up (7 → 4), which the feature
        // sizes above assume.
        let pool_a = MaxPool2dConfig::new([2, 2])
            .with_strides([2, 2])
            .with_ceil_mode(true)
            .init();
        let pool_b = MaxPool2dConfig::new([2, 2])
            .with_strides([2, 2])
            .with_ceil_mode(true)
            .init();
        let pool_c = MaxPool2dConfig::new([2, 2])
            .with_strides([2, 2])
            .with_ceil_mode(true)
            .init();

        DigitCnn {
            conv_a,
            pool_a,
            conv_b,
            pool_b,
            conv_c,
            pool_c,
            fc1: LinearConfig::new(nf * 4 * 4, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.num_classes).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct DigitCnn<B: Backend> {
    conv_a: Conv2d<B>,
    pool_a: MaxPool2d,
    conv_b: Conv2d<B>,
    pool_b: MaxPool2d,
    conv_c: Conv2d<B>,
    pool_c: MaxPool2d,
    fc1: Linear<B>,
    fc2: Linear<B>,
    dropout: Dropout,
}

impl<B: Backend> DigitCnn<B> {
    /// images: [batch, 28, 28] in [0, 1] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, height, width] = images.dims();
        // add the singleton channel dimension
        let x = images.reshape([batch_size, 1, height, width]);

        let x = self.pool_a.forward(relu(self.conv_a.forward(x)));
        let x = self.pool_b.forward(relu(self.conv_b.forward(x)));
        let x = self.pool_c.forward(relu(self.conv_c.forward(x)));

        let [batch_size, channels, height, width] = x.dims();
        let x = x.reshape([batch_size, channels * height * width]);

        let x = relu(self.fc1.forward(x));
        let x = self.dropout.forward(x);
        self.fc2.forward(x)
    }

    /// Forward pass plus mean cross-entropy against integer targets.
    pub fn forward_loss(
        &self,
        images: Tensor<B, 3>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_logits_shape() {
        let device = Default::default();
        let model: DigitCnn<TestBackend> = DigitCnnConfig::new().init(&device);

        let images = Tensor::<TestBackend, 3>::zeros([2, 28, 28], &device);
        let logits = model.forward(images);

        assert_eq!(logits.dims(), [2, 10]);
    }

    #[test]
    fn test_loss_is_scalar_and_finite() {
        let device = Default::default();
        let model: DigitCnn<TestBackend> = DigitCnnConfig::new().init(&device);

        let images = Tensor::<TestBackend, 3>::ones([3, 28, 28], &device) * 0.5;
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([1, 2, 3], &device);
        let (loss, logits) = model.forward_loss(images, targets);

        assert_eq!(logits.dims(), [3, 10]);
        let value: f32 = loss.into_scalar().elem();
        assert!(value.is_finite());
    }

    #[test]
    fn test_predicted_class_in_range() {
        let device = Default::default();
        let model: DigitCnn<TestBackend> = DigitCnnConfig::new().init(&device);

        let images = Tensor::<TestBackend, 3>::ones([4, 28, 28], &device);
        let predictions = model.forward(images).argmax(1).flatten::<1>(0, 1);
        let predictions = predictions.into_data().to_vec::<i64>().unwrap();

        assert_eq!(predictions.len(), 4);
        assert!(predictions.iter().all(|&class| (0..10).contains(&class)));
    }
}
