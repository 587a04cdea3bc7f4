mod app;
mod cli;
mod config;
mod consts;
mod core;
mod error;
mod launcher;
mod logdir;
mod output;
mod provision;
mod utils;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

/// Logs go to stderr; stdout carries command output only
fn init_tracing(debug: bool) {
    let default_directive = if debug { "hubtrack=debug" } else { "hubtrack=info" };
    let filter = EnvFilter::try_from_env("HUBTRACK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = app::run(&cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
