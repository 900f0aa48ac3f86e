//! dashclient binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dashclient::cli::Cli;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_env("DASHCLIENT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(message) = dashclient::cli::commands::run(cli).await {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}
