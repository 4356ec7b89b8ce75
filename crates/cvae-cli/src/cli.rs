use clap::{Parser, Subcommand};
use cvae_runtime::MotionKind;

use crate::commands;
use crate::logging::init_logger;
use crate::{print_err, print_info};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Print debug logs from the runtime.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a randomly initialized decoder and its manifest.
    InitDemo(commands::init_demo::InitDemoArgs),
    /// Render one frame for a label.
    Generate(commands::generate::GenerateArgs),
    /// Render a free walk through latent space under a fixed label.
    Walk(commands::animate::AnimateArgs),
    /// Render a morph from a label into the next one.
    Morph(commands::animate::AnimateArgs),
}

/// Entry point of the `cvae` binary. Returns the process exit code.
pub fn cli_main() -> i32 {
    let args = CliArgs::parse();
    init_logger(args.verbose);
    let time_begin = std::time::Instant::now();

    let result = handle_command(args.command);
    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            print_err!("{e:#}");
            1
        }
    };

    print_info!("Finished in {:.2?}", time_begin.elapsed());
    code
}

pub fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::InitDemo(args) => commands::init_demo::handle_command(args),
        Commands::Generate(args) => commands::generate::handle_command(args),
        Commands::Walk(args) => commands::animate::handle_command(args, MotionKind::FreeWalk),
        Commands::Morph(args) => commands::animate::handle_command(args, MotionKind::Interpolate),
    }
}
