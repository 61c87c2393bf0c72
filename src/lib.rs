pub mod config;
pub mod data;
pub mod infra;
pub mod ml;

#[cfg(test)]
mod tests {
    use crate::data::batcher::DigitBatcher;
    use crate::data::dataset::synthetic_items;
    use crate::ml::model::{DigitCnn, DigitCnnConfig};

    type Backend = burn::backend::NdArray;

    #[test]
    fn test_model_creation() {
        let device = Default::default();
        let _model: DigitCnn<Backend> = DigitCnnConfig::new().init(&device);
    }

    #[test]
    fn test_batch_through_model() {
        let device = Default::default();
        let model: DigitCnn<Backend> = DigitCnnConfig::new().init(&device);

        let batcher = DigitBatcher::<Backend>::new(device);
        let batch = batcher.batch(synthetic_items(10));
        let logits = model.forward(batch.images);

        assert_eq!(logits.dims(), [10, 10]);
    }
}
