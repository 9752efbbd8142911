//! triPOD CLI
//!
//! Command-line interface for submitting triPOD jobs and waiting for their
//! results.

mod commands;
mod config;
mod panel;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tripod")]
#[command(about = "Submit triPOD analyses and wait for their results", long_about = None)]
struct Cli {
    /// triPOD server URL
    #[arg(long, env = "TRIPOD_SERVER_URL", default_value = "http://localhost:5000")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripod=info,tripod_poller=info,tripod_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
