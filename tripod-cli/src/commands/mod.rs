//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod submit;

pub use job::WaitOptions;
pub use submit::SubmitArgs;

use anyhow::{Context, Result};
use clap::Subcommand;
use std::sync::Arc;
use tripod_client::TripodClient;
use tripod_core::domain::job::JobId;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit an analysis and print its job id
    Submit {
        #[command(flatten)]
        args: SubmitArgs,

        /// Print the job ticket as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the server once whether a job is ready
    Status {
        /// Job id returned at submission
        id: JobId,
    },
    /// Fetch and print the results of a job
    Results {
        /// Job id returned at submission
        id: JobId,

        /// Fetch the most recently completed job of the session instead
        #[arg(long)]
        latest: bool,
    },
    /// Wait for a job to finish and show its results
    Wait {
        /// Job id returned at submission
        id: JobId,

        #[command(flatten)]
        options: WaitOptions,
    },
    /// Submit an analysis, then wait for its results
    Run {
        #[command(flatten)]
        args: SubmitArgs,

        #[command(flatten)]
        options: WaitOptions,
    },
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = Arc::new(
        TripodClient::new(config.server_url.clone()).context("Failed to build HTTP client")?,
    );

    match command {
        Commands::Submit { args, json } => {
            submit::submit(&client, &args, json).await?;
            Ok(())
        }
        Commands::Status { id } => job::show_status(&client, &id).await,
        Commands::Results { id, latest } => job::show_results(&client, &id, latest).await,
        Commands::Wait { id, options } => job::wait_for_job(client, id, &options).await,
        Commands::Run { args, options } => {
            let ticket = submit::submit(&client, &args, false).await?;
            job::wait_for_job(client, ticket.id, &options).await
        }
    }
}
