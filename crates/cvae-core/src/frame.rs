use crate::codec::RawFrame;
use crate::labels::LabelVector;
use crate::latent::LatentVector;
use image::DynamicImage;

/// One synthesized image, with the inputs that produced it.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position in its sequence; `0` for single-shot generation.
    pub index: usize,
    pub raw: RawFrame,
    /// `data:image/png;base64,...`
    pub uri: String,
    pub image: Option<DynamicImage>,
    pub latent: LatentVector,
    pub labels: LabelVector,
}

impl Frame {
    pub fn width(&self) -> usize {
        self.raw.width()
    }

    pub fn height(&self) -> usize {
        self.raw.height()
    }
}
