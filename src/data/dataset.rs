use burn::data::dataset::{
    vision::{MnistDataset, MnistItem},
    Dataset, InMemDataset,
};

/// The digit dataset behind one stream: either a real MNIST split or an
/// in-memory fixture. Items are burn's `MnistItem` — a 28×28 f32 image
/// with raw pixel values in [0, 255] and a class label 0–9.
pub struct DigitDataset {
    inner: Box<dyn Dataset<MnistItem>>,
}

impl DigitDataset {
    /// The 60k-image MNIST training split. Downloaded into burn's
    /// dataset cache on first use; any download failure is fatal.
    pub fn train() -> Self {
        Self {
            inner: Box::new(MnistDataset::train()),
        }
    }

    /// The 10k-image MNIST test split, used here for validation.
    pub fn valid() -> Self {
        Self {
            inner: Box::new(MnistDataset::test()),
        }
    }

    /// An in-memory dataset over the given items.
    pub fn from_items(items: Vec<MnistItem>) -> Self {
        Self {
            inner: Box::new(InMemDataset::new(items)),
        }
    }

    pub fn sample_count(&self) -> usize {
        self.inner.len()
    }
}

impl Dataset<MnistItem> for DigitDataset {
    fn get(&self, index: usize) -> Option<MnistItem> {
        self.inner.get(index)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

// ─── Test Fixtures ────────────────────────────────────────────────────────────
/// Synthetic digit items: label `i % 10`, with a bright block whose row
/// position follows the label so the images are not all identical.
#[cfg(test)]
pub(crate) fn synthetic_items(count: usize) -> Vec<MnistItem> {
    (0..count)
        .map(|i| {
            let label = (i % 10) as u8;
            let mut image = [[0.0f32; 28]; 28];
            let row = label as usize * 2;
            for y in row..row + 4 {
                for x in 4..24 {
                    image[y][x] = 255.0;
                }
            }
            MnistItem { image, label }
        })
        .collect()
}
