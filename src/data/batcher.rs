// ============================================================
// Digit Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<MnistItem>
// into tensors for the model forward pass.
//
// The raw images carry pixel values in [0, 255]; the batcher
// rescales them to [0, 1]. The singleton channel dimension is
// added later by the network, which takes [batch, 28, 28].
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataset::vision::MnistItem, prelude::*};

// ─── DigitBatch ───────────────────────────────────────────────────────────────
/// A batch of digit samples. All tensors have the batch size as their
/// first dimension.
#[derive(Clone, Debug)]
pub struct DigitBatch<B: Backend> {
    /// Images — shape [batch_size, 28, 28], values in [0, 1]
    pub images: Tensor<B, 3>,

    /// Class labels — shape [batch_size], values 0–9
    pub targets: Tensor<B, 1, Int>,
}

// ─── DigitBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created where the model runs.
#[derive(Clone, Debug)]
pub struct DigitBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> DigitBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    pub fn batch(&self, items: Vec<MnistItem>) -> DigitBatch<B> {
        let images = items
            .iter()
            .map(|item| TensorData::from(item.image))
            .map(|data| Tensor::<B, 2>::from_data(data.convert::<B::FloatElem>(), &self.device))
            .map(|tensor| tensor.reshape([1, 28, 28]))
            // raw pixels are 0-255
            .map(|tensor| tensor / 255)
            .collect();
        let images = Tensor::cat(images, 0);

        let targets: Vec<i32> = items.iter().map(|item| item.label as i32).collect();
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        DigitBatch { images, targets }
    }
}
