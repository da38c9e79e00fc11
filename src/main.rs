mod cli;
mod execute;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use crate::cli::CLI;
use anyhow::Result;

fn main() -> Result<()>{
    let cli = CLI::parse();
    init_logging(cli.verbose);
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();
    execute::execute(cli)
}

/// Logs go to stderr. `--verbose` means `debug`; otherwise `RUST_LOG`
/// applies, defaulting to `warn`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
