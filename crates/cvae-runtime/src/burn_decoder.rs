//! Reference decoder built on burn.
//!
//! A two-layer MLP maps `[latent | labels]` to a `height * width * channels`
//! raster squashed into `[0, 1]`. Weights are stored with burn's named
//! MessagePack recorder, and the config sits next to them as JSON
//! (`decoder.mpk` + `decoder.json`).

use crate::loader::DecoderLoader;
use anyhow::{Context, anyhow, ensure};
use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::Backend;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::activation::{relu, sigmoid};
use burn::tensor::{Tensor, TensorData};
use cvae_core::{Decoder, LATENT_DIM, LabelVector, LatentVector, RawTensor};
use std::path::{Path, PathBuf};

type DecoderRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

#[derive(Config, Debug)]
pub struct MlpDecoderConfig {
    /// Label vector length, `labels + 1`.
    pub label_dim: usize,
    pub height: usize,
    pub width: usize,
    #[config(default = 4)]
    pub channels: usize,
    #[config(default = 128)]
    pub hidden_size: usize,
    #[config(default = 16)]
    pub latent_dim: usize,
}

impl MlpDecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MlpDecoder<B> {
        let hidden =
            LinearConfig::new(self.latent_dim + self.label_dim, self.hidden_size).init(device);
        let output = LinearConfig::new(self.hidden_size, self.raster_len()).init(device);
        MlpDecoder { hidden, output }
    }

    pub fn raster_len(&self) -> usize {
        self.height * self.width * self.channels
    }
}

#[derive(Module, Debug)]
pub struct MlpDecoder<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> MlpDecoder<B> {
    /// `[batch, latent]` and `[batch, labels]` to `[batch, raster_len]`.
    pub fn forward(&self, latent: Tensor<B, 2>, labels: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = Tensor::cat(vec![latent, labels], 1);
        let x = relu(self.hidden.forward(x));
        sigmoid(self.output.forward(x))
    }
}

/// Path of the JSON config stored beside the weights at `model_path`.
pub fn config_path(model_path: &Path) -> PathBuf {
    model_path.with_extension("json")
}

/// Writes `model` to `model_path` and its config beside it.
pub fn save_decoder<B: Backend>(
    model: MlpDecoder<B>,
    config: &MlpDecoderConfig,
    model_path: &Path,
) -> anyhow::Result<()> {
    config
        .save(config_path(model_path))
        .with_context(|| format!("failed to write config for '{}'", model_path.display()))?;
    model
        .save_file(model_path.to_path_buf(), &DecoderRecorder::new())
        .with_context(|| format!("failed to write weights to '{}'", model_path.display()))?;
    Ok(())
}

/// [`Decoder`] adapter around an [`MlpDecoder`].
pub struct BurnDecoder<B: Backend> {
    model: MlpDecoder<B>,
    device: B::Device,
    latent_dim: usize,
    label_dim: usize,
    shape: [usize; 3],
}

impl<B: Backend> BurnDecoder<B> {
    pub fn new(
        model: MlpDecoder<B>,
        config: &MlpDecoderConfig,
        device: B::Device,
    ) -> anyhow::Result<Self> {
        ensure!(
            config.latent_dim == LATENT_DIM,
            "decoder expects {} latent components, the engine samples {LATENT_DIM}",
            config.latent_dim
        );
        Ok(Self {
            model,
            device,
            latent_dim: config.latent_dim,
            label_dim: config.label_dim,
            shape: [config.height, config.width, config.channels],
        })
    }

    pub fn load(model_path: &Path, device: &B::Device) -> anyhow::Result<Self> {
        let config = MlpDecoderConfig::load(config_path(model_path))
            .map_err(|e| anyhow!("failed to read decoder config: {e:?}"))?;
        let record = DecoderRecorder::new()
            .load(model_path.to_path_buf(), device)
            .with_context(|| format!("failed to read weights from '{}'", model_path.display()))?;
        let model = config.init::<B>(device).load_record(record);
        log::debug!(
            "Loaded MLP decoder {}x{}x{} from '{}'",
            config.height,
            config.width,
            config.channels,
            model_path.display()
        );
        Self::new(model, &config, device.clone())
    }

    pub fn label_dim(&self) -> usize {
        self.label_dim
    }
}

impl<B: Backend> Decoder for BurnDecoder<B> {
    fn predict(
        &mut self,
        latent: &LatentVector,
        labels: &LabelVector,
    ) -> anyhow::Result<RawTensor> {
        ensure!(
            labels.len() == self.label_dim,
            "label vector has {} slots, decoder was trained with {}",
            labels.len(),
            self.label_dim
        );
        let latent = Tensor::<B, 2>::from_data(
            TensorData::new(latent.as_slice().to_vec(), [1, self.latent_dim]),
            &self.device,
        );
        let labels = Tensor::<B, 2>::from_data(
            TensorData::new(labels.as_slice().to_vec(), [1, self.label_dim]),
            &self.device,
        );

        let [height, width, channels] = self.shape;
        let output: Tensor<B, 4> = self
            .model
            .forward(latent, labels)
            .reshape([1, height, width, channels]);
        let shape = output.dims().to_vec();
        let data = output
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("failed to read decoder output: {e:?}"))?;
        Ok(RawTensor::new(shape, data))
    }
}

/// Loads [`BurnDecoder`]s on a fixed device.
pub struct BurnDecoderLoader<B: Backend> {
    device: B::Device,
}

impl<B: Backend> BurnDecoderLoader<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> DecoderLoader for BurnDecoderLoader<B> {
    fn load(&self, model_path: &Path, label_dim: usize) -> anyhow::Result<Box<dyn Decoder>> {
        let decoder = BurnDecoder::<B>::load(model_path, &self.device)?;
        ensure!(
            decoder.label_dim() == label_dim,
            "decoder was trained for {} label slots, manifest describes {label_dim}",
            decoder.label_dim()
        );
        Ok(Box::new(decoder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use cvae_core::{InferenceEngine, LabelRegistry};

    type TestBackend = NdArray;
    type Device = <TestBackend as Backend>::Device;

    fn config() -> MlpDecoderConfig {
        MlpDecoderConfig::new(4, 3, 2).with_hidden_size(8)
    }

    fn inputs() -> (LatentVector, LabelVector) {
        let registry = LabelRegistry::new(["cat", "dog", "bird"]);
        (LatentVector::new([0.5; LATENT_DIM]), registry.one_hot(1))
    }

    #[test]
    fn predicts_a_batched_raster_in_unit_range() {
        let device = Device::default();
        let config = config();
        let model = config.init::<TestBackend>(&device);
        let mut decoder = BurnDecoder::new(model, &config, device).unwrap();

        let (latent, labels) = inputs();
        let raw = decoder.predict(&latent, &labels).unwrap();
        assert_eq!(raw.shape, vec![1, 3, 2, 4]);
        assert_eq!(raw.data.len(), 24);
        assert!(raw.data.iter().all(|v| (0.0..=1.0).contains(v)));

        let pixels = InferenceEngine::new(4)
            .infer(&mut decoder, &latent, &labels)
            .unwrap();
        assert_eq!(pixels.shape(), [3, 2, 4]);
    }

    #[test]
    fn rejects_label_vectors_of_another_alphabet() {
        let device = Device::default();
        let config = config();
        let model = config.init::<TestBackend>(&device);
        let mut decoder = BurnDecoder::new(model, &config, device).unwrap();
        let latent = LatentVector::new([0.5; LATENT_DIM]);
        let labels = LabelRegistry::new(["a"]).one_hot(0);
        assert!(decoder.predict(&latent, &labels).is_err());
    }

    #[test]
    fn saved_weights_load_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("decoder.mpk");
        let device = Device::default();
        let config = config();

        let model = config.init::<TestBackend>(&device);
        let mut original = BurnDecoder::new(model.clone(), &config, device.clone()).unwrap();
        save_decoder(model, &config, &model_path).unwrap();
        assert!(config_path(&model_path).exists());

        let mut restored = BurnDecoderLoader::<TestBackend>::new(device)
            .load(&model_path, 4)
            .unwrap();

        let (latent, labels) = inputs();
        let expected = original.predict(&latent, &labels).unwrap();
        let actual = restored.predict(&latent, &labels).unwrap();
        assert_eq!(expected.shape, actual.shape);
        for (a, b) in expected.data.iter().zip(actual.data.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn loader_rejects_mismatched_alphabet() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("decoder.mpk");
        let device = Device::default();
        let config = config();
        save_decoder(config.init::<TestBackend>(&device), &config, &model_path).unwrap();

        let result = BurnDecoderLoader::<TestBackend>::new(device).load(&model_path, 7);
        assert!(result.is_err());
    }
}
