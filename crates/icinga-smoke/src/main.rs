//! Main entry point for the Icinga smoke harness

use anyhow::Result;
use clap::Parser;
use icinga_smoke::cli::Args;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let binary_name = env!("CARGO_BIN_NAME").replace("-", "_");
    let default_filter = format!("{}=info", binary_name);
    icinga_smoke_common::logging::init_logging(
        &args.verbosity,
        &default_filter,
        args.log_format,
    )?;

    info!("Starting icinga-smoke v{}", icinga_smoke::VERSION);

    args.run().await
}
