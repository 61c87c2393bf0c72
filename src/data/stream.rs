// ============================================================
// Batch Streams
// ============================================================
// The trainer consumes two infinite batch streams: training
// (small batches, autodiff backend) and validation (larger
// batches, inner backend). A stream cycles its finite dataset
// forever by wrapping a cursor, so it never exhausts; reset()
// restarts the cycle at the first sample, reproducing the
// order of a fresh stream.
//
// The stream a given step consumes is named by `Split` — a
// plain enum, so a step can only ever advance one stream.

use anyhow::{bail, Result};
use burn::{
    data::dataset::Dataset,
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{
    batcher::{DigitBatch, DigitBatcher},
    dataset::DigitDataset,
};

/// Which stream a driver step draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Valid,
}

// ─── BatchStream ──────────────────────────────────────────────────────────────
/// An infinite, restartable sequence of fixed-size batches over a finite
/// dataset. Batches are drawn by advancing a cursor that wraps at the end
/// of the dataset, so the traversal order is deterministic given the
/// dataset order.
pub struct BatchStream<B: Backend> {
    dataset: DigitDataset,
    batcher: DigitBatcher<B>,
    batch_size: usize,
    cursor: usize,
}

impl<B: Backend> BatchStream<B> {
    pub fn new(dataset: DigitDataset, batch_size: usize, device: &B::Device) -> Result<Self> {
        if dataset.len() == 0 {
            bail!("cannot stream batches from an empty dataset");
        }
        if batch_size == 0 {
            bail!("batch size must be positive");
        }
        Ok(Self {
            dataset,
            batcher: DigitBatcher::new(device.clone()),
            batch_size,
            cursor: 0,
        })
    }

    /// The next batch of exactly `batch_size` samples. Never signals
    /// exhaustion: the cursor wraps to the first sample when the end of
    /// the dataset is reached, even mid-batch.
    pub fn next_batch(&mut self) -> DigitBatch<B> {
        let mut items = Vec::with_capacity(self.batch_size);
        while items.len() < self.batch_size {
            if self.cursor == self.dataset.len() {
                self.cursor = 0;
            }
            let item = self
                .dataset
                .get(self.cursor)
                .expect("cursor stays within dataset bounds");
            items.push(item);
            self.cursor += 1;
        }
        self.batcher.batch(items)
    }

    /// Restart the cycle; the next batch starts at the first sample again.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

// ─── StreamSet ────────────────────────────────────────────────────────────────
/// The two streams of a training run. Validation batches are built on the
/// inner backend: evaluation runs without gradient tracking, which also
/// keeps dropout disabled.
pub struct StreamSet<B: AutodiffBackend> {
    pub train: BatchStream<B>,
    pub valid: BatchStream<B::InnerBackend>,
}

impl<B: AutodiffBackend> StreamSet<B> {
    pub fn new(
        train_dataset: DigitDataset,
        valid_dataset: DigitDataset,
        train_batch_size: usize,
        valid_batch_size: usize,
        device: &B::Device,
    ) -> Result<Self> {
        Ok(Self {
            train: BatchStream::new(train_dataset, train_batch_size, device)?,
            valid: BatchStream::new(valid_dataset, valid_batch_size, device)?,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::synthetic_items;

    type TestBackend = burn::backend::NdArray;

    fn labels_of(batch: DigitBatch<TestBackend>) -> Vec<i64> {
        batch.targets.into_data().to_vec::<i64>().unwrap()
    }

    #[test]
    fn test_stream_never_exhausts() {
        let device = Default::default();
        let dataset = DigitDataset::from_items(synthetic_items(5));
        let mut stream = BatchStream::<TestBackend>::new(dataset, 2, &device).unwrap();

        // 8 batches of 2 from 5 samples: more than three full cycles.
        for _ in 0..8 {
            let batch = stream.next_batch();
            assert_eq!(batch.images.dims(), [2, 28, 28]);
            assert_eq!(batch.targets.dims(), [2]);
        }
    }

    #[test]
    fn test_cycling_wraps_in_order() {
        let device = Default::default();
        let dataset = DigitDataset::from_items(synthetic_items(3));
        let mut stream = BatchStream::<TestBackend>::new(dataset, 2, &device).unwrap();

        assert_eq!(labels_of(stream.next_batch()), vec![0, 1]);
        // second batch crosses the end of the dataset and wraps
        assert_eq!(labels_of(stream.next_batch()), vec![2, 0]);
        assert_eq!(labels_of(stream.next_batch()), vec![1, 2]);
    }

    #[test]
    fn test_reset_reproduces_fresh_order() {
        let device = Default::default();
        let dataset = DigitDataset::from_items(synthetic_items(6));
        let mut stream = BatchStream::<TestBackend>::new(dataset, 4, &device).unwrap();

        let first = labels_of(stream.next_batch());
        stream.next_batch();
        stream.reset();

        assert_eq!(labels_of(stream.next_batch()), first);
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let device = Default::default();
        let dataset = DigitDataset::from_items(Vec::new());
        assert!(BatchStream::<TestBackend>::new(dataset, 2, &device).is_err());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let device = Default::default();
        let dataset = DigitDataset::from_items(synthetic_items(3));
        assert!(BatchStream::<TestBackend>::new(dataset, 0, &device).is_err());
    }
}
