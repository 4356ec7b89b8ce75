//! Building blocks for conditional latent-decoder inference.
//!
//! * [`LabelRegistry`] turns class names into conditioning vectors.
//! * [`LatentSampler`] draws and perturbs [`LatentVector`]s.
//! * [`InferenceEngine`] calls a [`Decoder`] and reshapes its output.
//! * [`FrameCodec`] turns pixel tensors into RGBA buffers and PNG data URIs.
//!
//! Session management, pacing and cancellation live in `cvae-runtime`.

mod codec;
mod decoder;
mod engine;
mod error;
mod frame;
mod labels;
mod latent;
mod tensor;

pub use codec::{
    FrameCodec, ImageMaterializer, MaterializedFrame, PNG_DATA_URI_PREFIX, RawFrame,
    RgbaMaterializer,
};
pub use decoder::Decoder;
pub use engine::{InferenceEngine, SUPPORTED_CHANNELS};
pub use error::{CvaeError, CvaeResult};
pub use frame::Frame;
pub use labels::{LabelRegistry, LabelVector};
pub use latent::{LATENT_DIM, LatentSampler, LatentVector};
pub use tensor::{PixelTensor, RawTensor};

pub use image;
