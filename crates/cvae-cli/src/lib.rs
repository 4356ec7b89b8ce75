//! The `cvae` command line tool.
pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::cli_main;
