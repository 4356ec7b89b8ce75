use crate::labels::LabelVector;
use crate::latent::LatentVector;
use crate::tensor::RawTensor;

/// The trained generative decoder, treated as an opaque function.
///
/// Implementations receive the latent as a `[1, LATENT_DIM]` row and the label
/// vector as a `[1, labels + 1]` row, and return a `[1, height, width, channels]`
/// tensor.
pub trait Decoder: Send + 'static {
    fn predict(&mut self, latent: &LatentVector, labels: &LabelVector) -> anyhow::Result<RawTensor>;
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn predict(
        &mut self,
        latent: &LatentVector,
        labels: &LabelVector,
    ) -> anyhow::Result<RawTensor> {
        (**self).predict(latent, labels)
    }
}
