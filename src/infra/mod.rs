// ============================================================
// Infrastructure
// ============================================================
// Cross-cutting persistence concerns:
//
//   checkpoint.rs — the run definition artifact (written once,
//                   before the first step) and periodic weight
//                   checkpoints via Burn's CompactRecorder
//
//   metrics.rs    — the running validation accuracy and the
//                   per-evaluation CSV metrics log
//
// Reference: Burn Book §5 (Checkpointing)

/// Model checkpoint and run-definition persistence
pub mod checkpoint;

/// Running accuracy and CSV metrics logging
pub mod metrics;
