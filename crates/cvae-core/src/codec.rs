//! Pixel tensor to raster conversion.
//!
//! [`FrameCodec::encode`] quantizes a [`PixelTensor`] into an RGBA byte buffer.
//! [`FrameCodec::materialize`] turns that buffer into a PNG data URI and, when an
//! [`ImageMaterializer`] was supplied, an image handle for a presentation layer.
//! PNG is lossless, so decoding the URI gives back the exact bytes.

use crate::error::{CvaeError, CvaeResult};
use crate::frame::Frame;
use crate::labels::LabelVector;
use crate::latent::LatentVector;
use crate::tensor::PixelTensor;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fmt::{Debug, Formatter};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// RGBA bytes in row-major order plus the `[height, width, channels]` shape of
/// the tensor they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
    shape: [usize; 3],
}

impl RawFrame {
    pub fn new(bytes: Vec<u8>, shape: [usize; 3]) -> Self {
        Self { bytes, shape }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn height(&self) -> usize {
        self.shape[0]
    }

    pub fn width(&self) -> usize {
        self.shape[1]
    }
}

/// Output of [`FrameCodec::materialize`].
#[derive(Debug, Clone)]
pub struct MaterializedFrame {
    pub uri: String,
    pub image: Option<DynamicImage>,
}

/// Optional presentation capability turning an RGBA surface into an image object.
pub trait ImageMaterializer: Send + Sync {
    fn materialize(&self, surface: &RgbaImage) -> CvaeResult<DynamicImage>;
}

/// Hands out the surface itself as an RGBA8 [`DynamicImage`].
#[derive(Debug, Default, Clone, Copy)]
pub struct RgbaMaterializer;

impl ImageMaterializer for RgbaMaterializer {
    fn materialize(&self, surface: &RgbaImage) -> CvaeResult<DynamicImage> {
        Ok(DynamicImage::ImageRgba8(surface.clone()))
    }
}

#[derive(Clone, Default)]
pub struct FrameCodec {
    materializer: Option<Arc<dyn ImageMaterializer>>,
}

impl Debug for FrameCodec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCodec")
            .field("materializer", &self.materializer.is_some())
            .finish()
    }
}

impl FrameCodec {
    pub fn new(materializer: Option<Arc<dyn ImageMaterializer>>) -> Self {
        Self { materializer }
    }

    pub fn with_materializer(mut self, materializer: Arc<dyn ImageMaterializer>) -> Self {
        self.materializer = Some(materializer);
        self
    }

    pub fn has_materializer(&self) -> bool {
        self.materializer.is_some()
    }

    /// Quantizes `pixels` to RGBA8. Grey is replicated into RGB and missing
    /// alpha is opaque.
    pub fn encode(&self, pixels: &PixelTensor) -> RawFrame {
        let channels = pixels.channels();
        let mut bytes = Vec::with_capacity(pixels.height() * pixels.width() * 4);
        for px in pixels.data().chunks_exact(channels) {
            match px {
                [v] => {
                    let v = to_byte(*v);
                    bytes.extend_from_slice(&[v, v, v, u8::MAX]);
                }
                [r, g, b] => {
                    bytes.extend_from_slice(&[to_byte(*r), to_byte(*g), to_byte(*b), u8::MAX])
                }
                _ => bytes.extend(px.iter().map(|v| to_byte(*v))),
            }
        }
        RawFrame::new(bytes, pixels.shape())
    }

    pub fn materialize(&self, frame: &RawFrame) -> CvaeResult<MaterializedFrame> {
        let surface = surface(frame)?;
        let uri = png_data_uri(&surface)?;
        let image = match &self.materializer {
            Some(materializer) => Some(materializer.materialize(&surface)?),
            None => None,
        };
        Ok(MaterializedFrame { uri, image })
    }

    /// Reads a URI produced by [`materialize`](Self::materialize) back into RGBA bytes.
    ///
    /// The source channel count is not recorded in the PNG, so the returned
    /// shape always reports 4 channels.
    pub fn decode_uri(&self, uri: &str) -> CvaeResult<RawFrame> {
        let payload = uri
            .strip_prefix(PNG_DATA_URI_PREFIX)
            .ok_or_else(|| CvaeError::encoding("not a PNG data URI"))?;
        let png = STANDARD
            .decode(payload)
            .map_err(|e| CvaeError::encoding(format!("invalid base64 payload: {e}")))?;
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .map_err(|e| CvaeError::encoding(format!("invalid PNG payload: {e}")))?
            .to_rgba8();
        let shape = [decoded.height() as usize, decoded.width() as usize, 4];
        Ok(RawFrame::new(decoded.into_raw(), shape))
    }

    pub fn write_png(&self, frame: &RawFrame, path: &Path) -> CvaeResult<()> {
        surface(frame)?
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| CvaeError::encoding(format!("failed to write '{}': {e}", path.display())))
    }

    /// Encodes and materializes `pixels` into a deliverable [`Frame`].
    pub fn frame(
        &self,
        index: usize,
        pixels: &PixelTensor,
        latent: LatentVector,
        labels: LabelVector,
    ) -> CvaeResult<Frame> {
        let raw = self.encode(pixels);
        let MaterializedFrame { uri, image } = self.materialize(&raw)?;
        Ok(Frame {
            index,
            raw,
            uri,
            image,
            latent,
            labels,
        })
    }
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn surface(frame: &RawFrame) -> CvaeResult<RgbaImage> {
    let expected = frame
        .width()
        .checked_mul(frame.height())
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| {
            CvaeError::encoding(format!(
                "{}x{} RGBA frame overflows usize",
                frame.width(),
                frame.height()
            ))
        })?;
    if frame.bytes.len() != expected {
        return Err(CvaeError::encoding(format!(
            "{}x{} RGBA frame needs {expected} bytes, got {}",
            frame.width(),
            frame.height(),
            frame.bytes.len()
        )));
    }
    let width = u32::try_from(frame.width())
        .map_err(|_| CvaeError::encoding("frame width exceeds u32"))?;
    let height = u32::try_from(frame.height())
        .map_err(|_| CvaeError::encoding("frame height exceeds u32"))?;
    RgbaImage::from_raw(width, height, frame.bytes.clone())
        .ok_or_else(|| CvaeError::encoding("buffer does not fit the surface"))
}

fn png_data_uri(surface: &RgbaImage) -> CvaeResult<String> {
    let mut png = Vec::new();
    surface
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CvaeError::encoding(format!("PNG serialization failed: {e}")))?;
    Ok(format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(png)))
}
