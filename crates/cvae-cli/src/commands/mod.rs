use cvae_runtime::{AnimationConfig, BurnDecoderLoader, ModelSession};
use std::path::Path;

pub mod animate;
pub mod generate;
pub mod init_demo;

pub type CliBackend = burn::backend::NdArray;

/// Opens and loads the session every rendering command works on.
pub(crate) fn open_session(
    manifest: &Path,
    config: AnimationConfig,
    seed: Option<u64>,
) -> anyhow::Result<ModelSession> {
    let mut builder = ModelSession::builder(manifest).with_config(config);
    if let Some(seed) = seed {
        builder = builder.with_seed(seed);
    }
    let session = builder.build();
    session.load(&BurnDecoderLoader::<CliBackend>::new(Default::default()))?;
    Ok(session)
}
