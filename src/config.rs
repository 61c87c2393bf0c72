// ============================================================
// Training Configuration
// ============================================================
// Every hyperparameter of a training run in one serialisable
// struct. The trainer writes it to disk before the first step
// so a finished or interrupted run can always be rebuilt with
// the exact same model definition.
//
// There are no CLI flags and no config file input: the run is
// fully described by `TrainConfig::default()` in code.

use serde::{Deserialize, Serialize};

use crate::ml::model::DigitCnnConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Directory receiving the run definition, checkpoints and metrics
    pub checkpoint_dir: String,

    /// Total number of training iterations
    pub iters: usize,

    /// Evaluate + checkpoint whenever `iter % eval_every == 0`
    pub eval_every: usize,

    /// Samples per training batch
    pub train_batch_size: usize,

    /// Samples per validation batch
    pub valid_batch_size: usize,

    /// Fixed Adam learning rate
    pub lr: f64,

    /// Backend seed for reproducible parameter initialisation
    pub seed: u64,

    /// Network definition
    pub model: DigitCnnConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir:   "checkpoints".to_string(),
            iters:            600_000,
            eval_every:       500,
            train_batch_size: 10,
            valid_batch_size: 20,
            lr:               1e-4,
            seed:             42,
            model:            DigitCnnConfig::new(),
        }
    }
}

impl TrainConfig {
    /// Number of evaluation/checkpoint events a full run produces
    /// (iterations 0, eval_every, 2*eval_every, ...).
    pub fn eval_points(&self) -> usize {
        self.iters.div_ceil(self.eval_every)
    }
}
