use super::open_session;
use crate::print_success;
use clap::Args;
use cvae_runtime::AnimationConfig;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long)]
    pub manifest: PathBuf,
    #[arg(long)]
    pub label: String,
    /// PNG file to write.
    #[arg(long)]
    pub out: PathBuf,
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn handle_command(args: GenerateArgs) -> anyhow::Result<()> {
    let session = open_session(&args.manifest, AnimationConfig::default(), args.seed)?;
    let frame = session.generate_one(&args.label)?;
    session.codec().write_png(&frame.raw, &args.out)?;

    print_success!(
        "{}x{} frame for '{}' written to {}",
        frame.width(),
        frame.height(),
        args.label,
        args.out.display()
    );
    Ok(())
}
