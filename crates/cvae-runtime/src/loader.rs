use cvae_core::Decoder;
use std::path::Path;

/// Builds a decoder from the weights a manifest points at.
///
/// `label_dim` is the label vector length the session will feed the decoder
/// (`labels + 1`), so loaders can reject weights trained for another alphabet.
pub trait DecoderLoader {
    fn load(&self, model_path: &Path, label_dim: usize) -> anyhow::Result<Box<dyn Decoder>>;
}

