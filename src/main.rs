//! Sounder binary entry point.

use clap::Parser;
use sounder::cli::{Cli, Commands};
use sounder::output;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Probe(cmd) => cmd.execute(cli.verbose, cli.quiet, cli.config.as_deref()).await,
        Commands::Monitor(cmd) => {
            cmd.execute(cli.verbose, cli.quiet, cli.config.as_deref()).await
        }
    };

    if let Err(e) = result {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
