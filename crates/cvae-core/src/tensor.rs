use derive_new::new;

/// Flat decoder output together with its shape, batch dimension included.
#[derive(Debug, Clone, PartialEq, new)]
pub struct RawTensor {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// A single image as `[height, width, channels]`, values nominally in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelTensor {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f32>,
}

impl PixelTensor {
    /// Crate-internal: shape checks live in [`crate::InferenceEngine::reshape`].
    pub(crate) fn from_parts(height: usize, width: usize, channels: usize, data: Vec<f32>) -> Self {
        Self {
            height,
            width,
            channels,
            data,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.height, self.width, self.channels]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}
