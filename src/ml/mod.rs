// ============================================================
// ML Layer (Burn)
// ============================================================
// All Burn model and optimisation code lives here:
//
//   model.rs   — the convolutional digit classifier
//                Three size-preserving conv + max-pool blocks
//                (36 filters each) into a dense head with
//                dropout, producing 10-way logits.
//
//   trainer.rs — the training driver
//                Fixed-iteration manual loop: one Adam step per
//                iteration, periodic evaluation on the
//                validation stream, checkpoint per evaluation.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Convolutional digit classifier architecture
pub mod model;

/// Manual training loop with periodic evaluation and checkpointing
pub mod trainer;
