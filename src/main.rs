use anyhow::Result;
use burn::backend::{Autodiff, NdArray};

use digit_cnn_train::{config::TrainConfig, ml::trainer};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("digit_cnn_train=info".parse()?),
        )
        .init();

    type Backend = Autodiff<NdArray>;
    let device = Default::default();

    trainer::run::<Backend>(TrainConfig::default(), device)
}
