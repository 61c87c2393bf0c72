// ============================================================
// Training Loop
// ============================================================
// A manual loop over a fixed iteration count:
//
//   - every iteration: one Adam step on the next training batch
//   - whenever iter % eval_every == 0 (including iteration 0):
//     one validation batch on the inner backend, a running
//     accuracy update, one report line, one checkpoint
//
// The run definition is persisted before the first step; after
// the final iteration the last checkpoint is the only artifact.
// Any tensor or I/O failure aborts the run.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::config::TrainConfig;
use crate::data::{
    batcher::DigitBatch,
    dataset::DigitDataset,
    stream::{Split, StreamSet},
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{IterationMetrics, MetricsLogger, RunningAccuracy},
};
use crate::ml::model::DigitCnn;

/// Load the MNIST splits and run a full training loop with `config`.
pub fn run<B: AutodiffBackend>(config: TrainConfig, device: B::Device) -> Result<()> {
    tracing::info!("Loading MNIST train and validation splits");
    let train_dataset = DigitDataset::train();
    let valid_dataset = DigitDataset::valid();

    let ckpt = CheckpointManager::new(config.checkpoint_dir.clone());
    train_loop::<B>(&config, train_dataset, valid_dataset, ckpt, device)
}

/// The training driver. Owns the model parameters, the optimizer state
/// and both batch streams for the whole run; nothing lives in ambient
/// process-wide state.
pub fn train_loop<B: AutodiffBackend>(
    cfg: &TrainConfig,
    train_dataset: DigitDataset,
    valid_dataset: DigitDataset,
    ckpt: CheckpointManager,
    device: B::Device,
) -> Result<()> {
    // ── Initializing ──────────────────────────────────────────────────────
    // The run definition goes to disk before any step executes.
    ckpt.save_config(cfg)?;
    B::seed(&device, cfg.seed);

    let mut model: DigitCnn<B> = cfg.model.init(&device);
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();
    let mut streams = StreamSet::<B>::new(
        train_dataset,
        valid_dataset,
        cfg.train_batch_size,
        cfg.valid_batch_size,
        &device,
    )?;
    let logger = MetricsLogger::new(cfg.checkpoint_dir.clone())?;
    let mut accuracy = RunningAccuracy::new();

    tracing::info!("Model initialised; training for {} iterations", cfg.iters);

    for iter in 0..cfg.iters {
        // ── TrainStep ─────────────────────────────────────────────────────
        let (next, train_loss) = step(
            Split::Train,
            model,
            &mut optim,
            &mut streams,
            &mut accuracy,
            cfg.lr,
        );
        model = next;

        // ── EvalCheckpoint ────────────────────────────────────────────────
        if iter % cfg.eval_every == 0 {
            let (next, val_accuracy) = step(
                Split::Valid,
                model,
                &mut optim,
                &mut streams,
                &mut accuracy,
                cfg.lr,
            );
            model = next;

            println!("iter {iter:>6} | train_loss={train_loss:.4} | val_accuracy={val_accuracy:.4}");
            logger.log(&IterationMetrics {
                iter,
                train_loss,
                val_accuracy,
            })?;
            ckpt.save_model(&model, iter)?;
        }
    }

    // ── Done ──────────────────────────────────────────────────────────────
    tracing::info!("Training complete after {} iterations", cfg.iters);
    Ok(())
}

/// One driver step. `split` selects which stream is advanced — exactly
/// one per call. Returns the model (updated for `Split::Train`) and the
/// step's metric: the batch training loss for `Split::Train`, the running
/// validation accuracy for `Split::Valid`.
pub fn step<B: AutodiffBackend>(
    split: Split,
    model: DigitCnn<B>,
    optim: &mut impl Optimizer<DigitCnn<B>, B>,
    streams: &mut StreamSet<B>,
    accuracy: &mut RunningAccuracy,
    lr: f64,
) -> (DigitCnn<B>, f64) {
    match split {
        Split::Train => {
            let batch = streams.train.next_batch();
            train_step(model, optim, lr, batch)
        }
        Split::Valid => {
            let batch = streams.valid.next_batch();
            let value = eval_step(&model, batch, accuracy);
            (model, value)
        }
    }
}

/// Forward, cross-entropy, backward, one optimizer update.
/// Returns the updated model and the batch loss.
pub fn train_step<B: AutodiffBackend>(
    model: DigitCnn<B>,
    optim: &mut impl Optimizer<DigitCnn<B>, B>,
    lr: f64,
    batch: DigitBatch<B>,
) -> (DigitCnn<B>, f64) {
    let (loss, _logits) = model.forward_loss(batch.images, batch.targets);
    let value: f64 = loss.clone().into_scalar().elem();

    let grads = GradientsParams::from_grads(loss.backward(), &model);
    (optim.step(lr, model, grads), value)
}

/// Score one validation batch with dropout disabled (inner backend) and
/// fold it into the running accuracy. Returns the updated accuracy.
pub fn eval_step<B: AutodiffBackend>(
    model: &DigitCnn<B>,
    batch: DigitBatch<B::InnerBackend>,
    accuracy: &mut RunningAccuracy,
) -> f64 {
    let model = model.valid();
    let logits = model.forward(batch.images);

    // argmax keeps the reduced dimension: [batch, 1] → [batch]
    let predictions = logits.argmax(1).flatten::<1>(0, 1);
    let total = batch.targets.dims()[0];
    let correct: i64 = predictions
        .equal(batch.targets)
        .int()
        .sum()
        .into_scalar()
        .elem();

    accuracy.update(correct as usize, total)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::DigitBatcher;
    use crate::data::dataset::synthetic_items;
    use crate::ml::model::DigitCnnConfig;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn batch_loss(model: &DigitCnn<TestBackend>, batch: &DigitBatch<TestBackend>) -> f64 {
        let (loss, _) = model.forward_loss(batch.images.clone(), batch.targets.clone());
        loss.into_scalar().elem()
    }

    #[test]
    fn test_train_step_reduces_loss_on_its_own_batch() {
        let device = Default::default();
        TestBackend::seed(&device, 7);

        // dropout off so both loss evaluations see the same network
        let model: DigitCnn<TestBackend> =
            DigitCnnConfig::new().with_dropout(0.0).init(&device);
        let mut optim = AdamConfig::new().init();

        let batcher = DigitBatcher::<TestBackend>::new(device);
        let batch = batcher.batch(synthetic_items(10));

        let loss_before = batch_loss(&model, &batch);
        let (model, reported) = train_step(model, &mut optim, 1e-4, batch.clone());
        let loss_after = batch_loss(&model, &batch);

        assert!((reported - loss_before).abs() < 1e-6);
        assert!(
            loss_after < loss_before,
            "loss did not decrease: {loss_before} -> {loss_after}"
        );
    }

    #[test]
    fn test_eval_step_updates_running_accuracy() {
        let device = Default::default();
        let model: DigitCnn<TestBackend> = DigitCnnConfig::new().init(&device);

        let batcher = DigitBatcher::<NdArray>::new(device);
        let batch = batcher.batch(synthetic_items(4));

        let mut accuracy = RunningAccuracy::new();
        let value = eval_step(&model, batch, &mut accuracy);

        assert_eq!(accuracy.total(), 4);
        assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn test_step_advances_only_the_selected_stream() {
        let device = Default::default();
        let model: DigitCnn<TestBackend> = DigitCnnConfig::new().init(&device);
        let mut optim = AdamConfig::new().init();
        let mut accuracy = RunningAccuracy::new();

        let mut streams = StreamSet::<TestBackend>::new(
            DigitDataset::from_items(synthetic_items(6)),
            DigitDataset::from_items(synthetic_items(6)),
            2,
            2,
            &device,
        )
        .unwrap();

        // two train steps leave the validation stream untouched
        let (model, _) = step(
            Split::Train,
            model,
            &mut optim,
            &mut streams,
            &mut accuracy,
            1e-4,
        );
        let (model, _) = step(
            Split::Train,
            model,
            &mut optim,
            &mut streams,
            &mut accuracy,
            1e-4,
        );
        assert_eq!(accuracy.total(), 0);

        // a validation step folds exactly one batch into the accuracy
        let (_, value) = step(
            Split::Valid,
            model,
            &mut optim,
            &mut streams,
            &mut accuracy,
            1e-4,
        );
        assert_eq!(accuracy.total(), 2);
        assert_eq!(value, accuracy.value());
    }
}
