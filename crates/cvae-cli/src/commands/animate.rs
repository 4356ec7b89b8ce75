use super::open_session;
use crate::print_success;
use anyhow::Context;
use clap::Args;
use cvae_runtime::{
    AnimationConfig, AnimationRequest, CancelToken, DEFAULT_FRAME_COUNT, DEFAULT_FRAME_DELAY,
    DEFAULT_WALK_RATE, MotionKind,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct AnimateArgs {
    #[arg(long)]
    pub manifest: PathBuf,
    #[arg(long)]
    pub label: String,
    /// Directory receiving `frame_000.png`, `frame_001.png`, ...
    #[arg(long)]
    pub out_dir: PathBuf,
    #[arg(long, default_value_t = DEFAULT_FRAME_COUNT)]
    pub frames: usize,
    /// Pause between two frames, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_FRAME_DELAY.as_millis() as u64)]
    pub delay_ms: u64,
    /// Free-walk step size.
    #[arg(long, default_value_t = DEFAULT_WALK_RATE)]
    pub rate: f32,
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn handle_command(args: AnimateArgs, kind: MotionKind) -> anyhow::Result<()> {
    let config = AnimationConfig::default()
        .with_frame_count(args.frames)
        .with_frame_delay(Duration::from_millis(args.delay_ms))
        .with_walk_rate(args.rate);
    let session = open_session(&args.manifest, config, args.seed)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create '{}'", args.out_dir.display()))?;

    let request = AnimationRequest {
        kind,
        label: args.label.clone(),
        latent: None,
    };
    let mut written = 0;
    for frame in session.animate(&request, CancelToken::new())? {
        let frame = frame?;
        let path = args.out_dir.join(format!("frame_{:03}.png", frame.index));
        session.codec().write_png(&frame.raw, &path)?;
        log::debug!("Wrote {}", path.display());
        written += 1;
    }

    print_success!(
        "{written} {kind} frames for '{}' written to {}",
        args.label,
        args.out_dir.display()
    );
    Ok(())
}
