fn main() {
    std::process::exit(cvae_cli::cli_main());
}
