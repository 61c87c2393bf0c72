// ============================================================
// Data Pipeline
// ============================================================
// From the raw MNIST splits to model-ready tensor batches:
//
//   MnistDataset (burn)
//       │
//       ▼
//   DigitDataset      → split selection, in-memory fixtures
//       │
//       ▼
//   DigitBatcher      → stacks items into [batch, 28, 28] tensors
//       │
//       ▼
//   BatchStream       → infinite, restartable batch cycling
//       │
//       ▼
//   StreamSet         → the train/valid stream pair, selected by Split
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Digit dataset splits and fixtures
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Infinite restartable batch streams and the Split selector
pub mod stream;
