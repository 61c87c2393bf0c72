// ============================================================
// Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets written per run:
//   1. train_config.json           — the run definition, written once
//                                    before the first training step
//   2. model_iter_{i}.mpk.gz       — all parameters at iteration i,
//                                    written at every evaluation event
//   3. latest_iter.json            — which iteration was saved last
//
// CompactRecorder serialises the parameter record to MessagePack and
// compresses it with gzip; loading fails if the model architecture
// does not match the saved record.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use std::{fs, path::PathBuf};

use crate::config::TrainConfig;
use crate::ml::model::DigitCnn;

/// Manages saving and loading of checkpoints. All files live in the
/// configured directory, created on construction if missing.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save model weights tagged with the training iteration, and point
    /// `latest_iter.json` at it. The recorder adds the file extension.
    pub fn save_model<B: AutodiffBackend>(&self, model: &DigitCnn<B>, iter: usize) -> Result<()> {
        let path = self.dir.join(format!("model_iter_{iter}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join("latest_iter.json");
        fs::write(&latest_path, serde_json::to_string(&iter)?)
            .with_context(|| "Failed to write latest_iter.json")?;

        tracing::debug!("Saved checkpoint: iteration {}", iter);
        Ok(())
    }

    /// Load weights from the latest saved checkpoint into `model`.
    /// The model must have the architecture the checkpoint was saved with.
    pub fn load_model<B: Backend>(
        &self,
        model: DigitCnn<B>,
        device: &B::Device,
    ) -> Result<DigitCnn<B>> {
        let iter = self.latest_iter()?;
        let path = self.dir.join(format!("model_iter_{iter}"));

        tracing::info!("Loading checkpoint from iteration {}", iter);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Has training been run?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Persist the run definition. Called once, before any training step.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");

        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Reload a previously saved run definition.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

        Ok(serde_json::from_str(&json)?)
    }

    /// The iteration of the most recent checkpoint.
    pub fn latest_iter(&self) -> Result<usize> {
        let path = self.dir.join("latest_iter.json");

        let s = fs::read_to_string(&path)
            .with_context(|| "Cannot find 'latest_iter.json'. Has training been run?")?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}
