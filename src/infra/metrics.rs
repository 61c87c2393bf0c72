// ============================================================
// Metrics
// ============================================================
// Two pieces:
//
//   RunningAccuracy — streaming top-1 accuracy over every
//                     validation batch seen so far in the run.
//                     Never reset between evaluation events.
//
//   MetricsLogger   — appends one CSV row per evaluation event
//                     (iteration, training loss, validation
//                     accuracy) for later plotting.
//
// Output file: checkpoints/metrics.csv

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

// ─── RunningAccuracy ──────────────────────────────────────────────────────────
/// Accumulated fraction of correct top-1 predictions. The counts grow
/// monotonically: each evaluation event folds its batch into the totals.
#[derive(Debug, Default, Clone)]
pub struct RunningAccuracy {
    correct: usize,
    total: usize,
}

impl RunningAccuracy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one batch into the totals and return the updated accuracy.
    pub fn update(&mut self, correct: usize, total: usize) -> f64 {
        self.correct += correct;
        self.total += total;
        self.value()
    }

    /// Accuracy in [0, 1]; 0.0 before any update.
    pub fn value(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

// ─── IterationMetrics ─────────────────────────────────────────────────────────
/// One row of metrics data for a single evaluation event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationMetrics {
    /// The training iteration the event occurred at
    pub iter: usize,

    /// Cross-entropy loss of the training batch at that iteration
    pub train_loss: f64,

    /// Running validation accuracy after this event, in [0, 1]
    pub val_accuracy: f64,
}

// ─── MetricsLogger ────────────────────────────────────────────────────────────
/// Appends evaluation metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger, writing the CSV header if the file is new.
    /// Appending to an existing file keeps rows from previous runs.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "iter,train_loss,val_accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one evaluation event as a new CSV row.
    pub fn log(&self, m: &IterationMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;

        writeln!(f, "{},{:.6},{:.6}", m.iter, m.train_loss, m.val_accuracy)?;

        tracing::debug!(
            "Logged iteration {} metrics: train_loss={:.4}, val_accuracy={:.4}",
            m.iter,
            m.train_loss,
            m.val_accuracy,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
