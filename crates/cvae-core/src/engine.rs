use crate::decoder::Decoder;
use crate::error::{CvaeError, CvaeResult};
use crate::labels::LabelVector;
use crate::latent::LatentVector;
use crate::tensor::{PixelTensor, RawTensor};

/// Channel counts the frame codec knows how to turn into RGBA.
pub const SUPPORTED_CHANNELS: [usize; 3] = [1, 3, 4];

/// Invokes a decoder and turns its batched output into a single pixel tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceEngine {
    label_len: usize,
}

impl InferenceEngine {
    /// `label_len` is the length every label vector passed to [`infer`](Self::infer) must have.
    pub fn new(label_len: usize) -> Self {
        Self { label_len }
    }

    pub fn label_len(&self) -> usize {
        self.label_len
    }

    pub fn infer<D: Decoder + ?Sized>(
        &self,
        decoder: &mut D,
        latent: &LatentVector,
        labels: &LabelVector,
    ) -> CvaeResult<PixelTensor> {
        if labels.len() != self.label_len {
            return Err(CvaeError::shape_mismatch(format!(
                "label vector has {} slots, decoder expects {}",
                labels.len(),
                self.label_len
            )));
        }

        let raw = decoder
            .predict(latent, labels)
            .map_err(CvaeError::InferenceFailed)?;
        log::trace!("Decoder returned tensor of shape {:?}", raw.shape);
        Self::reshape(raw)
    }

    /// Drops the batch dimension of a `[1, H, W, C]` tensor.
    pub fn reshape(raw: RawTensor) -> CvaeResult<PixelTensor> {
        let [batch, height, width, channels] = <[usize; 4]>::try_from(raw.shape.as_slice())
            .map_err(|_| {
                CvaeError::shape_mismatch(format!(
                    "expected rank 4 [1, H, W, C], got shape {:?}",
                    raw.shape
                ))
            })?;

        if batch != 1 {
            return Err(CvaeError::shape_mismatch(format!(
                "expected a batch of 1, got {batch}"
            )));
        }
        if height == 0 || width == 0 {
            return Err(CvaeError::shape_mismatch(format!(
                "empty raster {height}x{width}"
            )));
        }
        if !SUPPORTED_CHANNELS.contains(&channels) {
            return Err(CvaeError::shape_mismatch(format!(
                "unsupported channel count {channels}, expected one of {SUPPORTED_CHANNELS:?}"
            )));
        }
        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| {
                CvaeError::shape_mismatch(format!("shape {:?} overflows usize", raw.shape))
            })?;
        if raw.data.len() != expected {
            return Err(CvaeError::shape_mismatch(format!(
                "shape {:?} needs {expected} values, got {}",
                raw.shape,
                raw.data.len()
            )));
        }

        Ok(PixelTensor::from_parts(height, width, channels, raw.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelRegistry;
    use crate::latent::LATENT_DIM;
    use rstest::rstest;

    struct FixedDecoder {
        shape: Vec<usize>,
        calls: usize,
    }

    impl Decoder for FixedDecoder {
        fn predict(&mut self, _: &LatentVector, _: &LabelVector) -> anyhow::Result<RawTensor> {
            self.calls += 1;
            let len = self
                .shape
                .iter()
                .try_fold(1usize, |n, d| n.checked_mul(*d))
                .unwrap_or(0);
            Ok(RawTensor::new(self.shape.clone(), vec![0.5; len]))
        }
    }

    struct FailingDecoder;

    impl Decoder for FailingDecoder {
        fn predict(&mut self, _: &LatentVector, _: &LabelVector) -> anyhow::Result<RawTensor> {
            anyhow::bail!("weights not finite")
        }
    }

    fn inputs() -> (LatentVector, LabelVector) {
        let registry = LabelRegistry::new(["a", "b"]);
        (LatentVector::new([0.25; LATENT_DIM]), registry.one_hot(1))
    }

    #[test]
    fn drops_the_batch_dimension() {
        let (latent, labels) = inputs();
        let mut decoder = FixedDecoder {
            shape: vec![1, 2, 3, 4],
            calls: 0,
        };
        let pixels = InferenceEngine::new(3)
            .infer(&mut decoder, &latent, &labels)
            .unwrap();

        assert_eq!(pixels.shape(), [2, 3, 4]);
        assert_eq!(pixels.data().len(), 24);
        assert_eq!(decoder.calls, 1);
    }

    #[rstest]
    #[case(vec![2, 3, 4])]
    #[case(vec![2, 2, 3, 4])]
    #[case(vec![1, 2, 3, 2])]
    #[case(vec![1, 0, 3, 4])]
    #[case(vec![1, usize::MAX / 2, 3, 4])]
    fn rejects_incompatible_shapes(#[case] shape: Vec<usize>) {
        let (latent, labels) = inputs();
        let mut decoder = FixedDecoder { shape, calls: 0 };
        let result = InferenceEngine::new(3).infer(&mut decoder, &latent, &labels);
        assert!(matches!(result, Err(CvaeError::ShapeMismatch(_))));
    }

    #[test]
    fn rejects_data_length_mismatch() {
        let raw = RawTensor::new(vec![1, 2, 2, 1], vec![0.0; 3]);
        assert!(matches!(
            InferenceEngine::reshape(raw),
            Err(CvaeError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn wrong_label_length_never_reaches_the_decoder() {
        let (latent, labels) = inputs();
        let mut decoder = FixedDecoder {
            shape: vec![1, 1, 1, 1],
            calls: 0,
        };
        let result = InferenceEngine::new(5).infer(&mut decoder, &latent, &labels);
        assert!(matches!(result, Err(CvaeError::ShapeMismatch(_))));
        assert_eq!(decoder.calls, 0);
    }

    #[test]
    fn decoder_failure_surfaces_as_inference_error() {
        let (latent, labels) = inputs();
        let result = InferenceEngine::new(3).infer(&mut FailingDecoder, &latent, &labels);
        match result {
            Err(CvaeError::InferenceFailed(e)) => assert!(e.to_string().contains("not finite")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
