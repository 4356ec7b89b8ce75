use super::CliBackend;
use crate::{print_success, print_warn};
use anyhow::{Context, ensure};
use clap::Args;
use cvae_core::SUPPORTED_CHANNELS;
use cvae_runtime::{Manifest, MlpDecoderConfig, save_decoder};
use std::path::PathBuf;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const WEIGHTS_FILE: &str = "decoder.mpk";

#[derive(Args, Debug)]
pub struct InitDemoArgs {
    /// Directory receiving the manifest and the weights.
    #[arg(long)]
    pub out: PathBuf,
    /// Comma separated class names.
    #[arg(long, value_delimiter = ',', required = true)]
    pub labels: Vec<String>,
    #[arg(long, default_value_t = 28)]
    pub height: usize,
    #[arg(long, default_value_t = 28)]
    pub width: usize,
    #[arg(long, default_value_t = 4)]
    pub channels: usize,
    /// Width of the hidden layer.
    #[arg(long, default_value_t = 128)]
    pub hidden: usize,
}

pub fn handle_command(args: InitDemoArgs) -> anyhow::Result<()> {
    let labels: Vec<String> = args
        .labels
        .iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    ensure!(!labels.is_empty(), "at least one label is required");
    ensure!(
        SUPPORTED_CHANNELS.contains(&args.channels),
        "channels must be one of {SUPPORTED_CHANNELS:?}"
    );
    ensure!(
        args.height > 0 && args.width > 0,
        "height and width must be positive"
    );

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create '{}'", args.out.display()))?;

    let config = MlpDecoderConfig::new(labels.len() + 1, args.height, args.width)
        .with_channels(args.channels)
        .with_hidden_size(args.hidden);
    let device = Default::default();
    save_decoder(
        config.init::<CliBackend>(&device),
        &config,
        &args.out.join(WEIGHTS_FILE),
    )?;

    let manifest_path = args.out.join(MANIFEST_FILE);
    Manifest::new(WEIGHTS_FILE, labels).save(&manifest_path)?;

    print_success!("Demo decoder written to {}", manifest_path.display());
    print_warn!("The demo weights are untrained, rendered frames will look like noise");
    Ok(())
}
