use crate::animation::{
    AnimationConfig, AnimationRequest, CancelToken, ChannelEmitter, FrameStream, JobHandle,
    OutStream,
};
use crate::error::RuntimeError;
use crate::host::DecoderHost;
use crate::loader::DecoderLoader;
use crate::manifest::Manifest;
use cvae_core::{
    Decoder, Frame, FrameCodec, ImageMaterializer, InferenceEngine, LabelRegistry, LabelVector,
    LatentSampler, LatentVector,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

static JOB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// State that only exists once the decoder is loaded.
pub(crate) struct Loaded {
    pub(crate) registry: LabelRegistry,
    pub(crate) engine: InferenceEngine,
    pub(crate) host: DecoderHost<Box<dyn Decoder>>,
    pub(crate) model_path: PathBuf,
}

#[derive(Default)]
struct LastInputs {
    latent: Option<LatentVector>,
    labels: Option<LabelVector>,
}

/// Configures a [`ModelSession`] before it is built.
pub struct SessionBuilder {
    manifest_path: PathBuf,
    config: AnimationConfig,
    materializer: Option<Arc<dyn ImageMaterializer>>,
    seed: Option<u64>,
}

impl SessionBuilder {
    pub fn with_config(mut self, config: AnimationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_materializer(mut self, materializer: Arc<dyn ImageMaterializer>) -> Self {
        self.materializer = Some(materializer);
        self
    }

    /// Makes latent sampling reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> ModelSession {
        let sampler = match self.seed {
            Some(seed) => LatentSampler::from_seed(seed),
            None => LatentSampler::from_entropy(),
        };
        ModelSession {
            manifest_path: self.manifest_path,
            config: self.config,
            codec: FrameCodec::new(self.materializer),
            sampler: Mutex::new(sampler),
            loaded: OnceLock::new(),
            load_lock: Mutex::new(()),
            last: Mutex::new(LastInputs::default()),
        }
    }
}

/// A loaded (or loading) decoder together with its label alphabet.
///
/// Generation calls take `&self`. Each animation owns its latent and label
/// vectors, and decoder calls from all of them are serialized by one
/// [`DecoderHost`], so a session can be shared behind an [`Arc`].
pub struct ModelSession {
    manifest_path: PathBuf,
    config: AnimationConfig,
    codec: FrameCodec,
    sampler: Mutex<LatentSampler>,
    loaded: OnceLock<Loaded>,
    load_lock: Mutex<()>,
    last: Mutex<LastInputs>,
}

impl ModelSession {
    pub fn builder(manifest_path: impl Into<PathBuf>) -> SessionBuilder {
        SessionBuilder {
            manifest_path: manifest_path.into(),
            config: AnimationConfig::default(),
            materializer: None,
            seed: None,
        }
    }

    /// Builds a session with default settings and loads it right away.
    pub fn open<L: DecoderLoader + ?Sized>(
        manifest_path: impl Into<PathBuf>,
        loader: &L,
    ) -> Result<Self, RuntimeError> {
        let session = Self::builder(manifest_path).build();
        session.load(loader)?;
        Ok(session)
    }

    /// Reads the manifest and starts the decoder. A no-op once the session is ready.
    pub fn load<L: DecoderLoader + ?Sized>(&self, loader: &L) -> Result<(), RuntimeError> {
        if self.loaded.get().is_some() {
            return Ok(());
        }
        let _guard = lock(&self.load_lock);
        if self.loaded.get().is_some() {
            return Ok(());
        }

        let manifest = Manifest::load(&self.manifest_path)?;
        let model_path = manifest.resolve_model_path(&self.manifest_path);
        let registry = LabelRegistry::new(manifest.labels);
        log::debug!(
            "Loading decoder '{}' for {} labels",
            model_path.display(),
            registry.len()
        );

        let decoder = loader
            .load(&model_path, registry.vector_len())
            .map_err(RuntimeError::ModelLoad)?;
        let loaded = Loaded {
            engine: InferenceEngine::new(registry.vector_len()),
            host: DecoderHost::spawn(decoder),
            registry,
            model_path,
        };
        log::info!(
            "Model ready: {} ({})",
            loaded.model_path.display(),
            loaded.registry.labels().join(", ")
        );
        // The load lock is held, nobody else can have set it.
        let _ = self.loaded.set(loaded);
        Ok(())
    }

    /// Loads on a worker thread and reports the outcome to `on_ready`.
    pub fn load_in_background<L, F>(
        self: &Arc<Self>,
        loader: L,
        on_ready: F,
    ) -> std::thread::JoinHandle<Result<(), RuntimeError>>
    where
        L: DecoderLoader + Send + 'static,
        F: FnOnce(&Result<(), RuntimeError>) + Send + 'static,
    {
        let session = Arc::clone(self);
        std::thread::spawn(move || {
            let result = session.load(&loader);
            if let Err(e) = &result {
                log::error!("Background model load failed: {e}");
            }
            on_ready(&result);
            result
        })
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.get().is_some()
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn model_path(&self) -> Result<&Path, RuntimeError> {
        Ok(&self.loaded()?.model_path)
    }

    /// Class names in slot order.
    pub fn labels(&self) -> Result<&[String], RuntimeError> {
        Ok(self.loaded()?.registry.labels())
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }

    /// Latent of the most recent decoder call, from any stream.
    pub fn last_latent(&self) -> Option<LatentVector> {
        lock(&self.last).latent
    }

    /// Label vector of the most recent decoder call, from any stream.
    pub fn last_label_vector(&self) -> Option<LabelVector> {
        lock(&self.last).labels.clone()
    }

    /// One frame for `label` from a freshly sampled latent.
    pub fn generate_one(&self, label: &str) -> Result<Frame, RuntimeError> {
        self.generate(label, None)
    }

    pub fn generate_one_with_latent(
        &self,
        label: &str,
        latent: LatentVector,
    ) -> Result<Frame, RuntimeError> {
        self.generate(label, Some(latent))
    }

    /// Starts a lazy stream. The label is checked before anything is decoded.
    pub fn animate(
        &self,
        request: &AnimationRequest,
        cancel: CancelToken,
    ) -> Result<FrameStream<'_>, RuntimeError> {
        FrameStream::start(self, self.loaded()?, request, cancel)
    }

    pub fn animate_free_walk(
        &self,
        label: &str,
        cancel: CancelToken,
        latent: Option<LatentVector>,
    ) -> Result<FrameStream<'_>, RuntimeError> {
        let request = AnimationRequest {
            latent,
            ..AnimationRequest::free_walk(label)
        };
        self.animate(&request, cancel)
    }

    pub fn animate_interpolate(
        &self,
        label: &str,
        cancel: CancelToken,
        latent: Option<LatentVector>,
    ) -> Result<FrameStream<'_>, RuntimeError> {
        let request = AnimationRequest {
            latent,
            ..AnimationRequest::interpolate(label)
        };
        self.animate(&request, cancel)
    }

    /// Runs an animation on a worker thread.
    pub fn spawn_animation(
        self: &Arc<Self>,
        request: AnimationRequest,
    ) -> Result<JobHandle<Frame>, RuntimeError> {
        self.loaded()?.registry.require(&request.label)?;

        let id = format!(
            "{}-{}",
            request.kind,
            JOB_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        let (tx, rx) = crossbeam::channel::unbounded::<Frame>();
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let session = Arc::clone(self);
        let join = std::thread::Builder::new()
            .name(format!("cvae-{id}"))
            .spawn(move || -> Result<usize, RuntimeError> {
                let out = OutStream::new(Arc::new(ChannelEmitter::new(tx)));
                let delivered = session.animate(&request, token)?.drive(&out)?;
                log::debug!("Animation worker delivered {delivered} frames");
                Ok(delivered)
            })?;
        Ok(JobHandle::new(id, rx, cancel, join))
    }

    pub(crate) fn loaded(&self) -> Result<&Loaded, RuntimeError> {
        self.loaded.get().ok_or(RuntimeError::NotReady)
    }

    pub(crate) fn fork_sampler(&self) -> LatentSampler {
        lock(&self.sampler).fork()
    }

    /// Decodes one frame through the host and encodes it.
    pub(crate) fn render(
        &self,
        loaded: &Loaded,
        index: usize,
        latent: LatentVector,
        labels: LabelVector,
    ) -> Result<Frame, RuntimeError> {
        {
            let mut last = lock(&self.last);
            last.latent = Some(latent);
            last.labels = Some(labels.clone());
        }

        let engine = loaded.engine;
        let inputs = labels.clone();
        let pixels = loaded
            .host
            .with(move |decoder| engine.infer(decoder, &latent, &inputs))??;
        Ok(self.codec.frame(index, &pixels, latent, labels)?)
    }

    fn generate(&self, label: &str, latent: Option<LatentVector>) -> Result<Frame, RuntimeError> {
        let loaded = self.loaded()?;
        let cursor = loaded.registry.require(label)?;
        let latent = latent.unwrap_or_else(|| lock(&self.sampler).sample());
        log::debug!("Generating single frame for '{label}'");
        self.render(loaded, 0, latent, loaded.registry.one_hot(cursor))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
