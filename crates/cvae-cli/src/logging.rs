use colored::{Colorize, CustomColor};

pub const CVAE_TEAL: CustomColor = CustomColor {
    r: 0,
    g: 168,
    b: 150,
};

fn tag() -> colored::ColoredString {
    "cvae".custom_color(CVAE_TEAL)
}

pub fn print_err(err_message: &str) {
    eprintln!("[{}] {}: {}", tag(), "error".red().bold(), err_message);
}

#[macro_export]
macro_rules! print_err {
    ($($arg:tt)*) => {
        $crate::logging::print_err(&format!($($arg)*));
    };
}

pub fn print_warn(warn_message: &str) {
    println!("[{}] {}: {}", tag(), "warning".yellow().bold(), warn_message);
}

#[macro_export]
macro_rules! print_warn {
    ($($arg:tt)*) => {
        $crate::logging::print_warn(&format!($($arg)*));
    };
}

pub fn print_info(info_message: &str) {
    println!("[{}] {}: {}", tag(), "info".cyan().bold(), info_message);
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        $crate::logging::print_info(&format!($($arg)*));
    };
}

pub fn print_success(success_message: &str) {
    println!("[{}] {}: {}", tag(), "done".green().bold(), success_message);
}

#[macro_export]
macro_rules! print_success {
    ($($arg:tt)*) => {
        $crate::logging::print_success(&format!($($arg)*));
    };
}

/// Routes `log` records to stderr. `RUST_LOG` overrides the default level.
pub fn init_logger(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}
