//! Mixbridge CLI
//!
//! Entry point for the mixbridge command-line application.

use anyhow::Result;
use clap::Parser;

use mixbridge::cli::output::{display_error, OutputConfig};
use mixbridge::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output_config = OutputConfig::new(cli.quiet, cli.json, cli.verbose);

    // RUST_LOG directives are applied on top of the verbosity level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(output_config.log_level().into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    output_config.apply_global();

    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
