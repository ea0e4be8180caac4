//! Command-line interface.
//!
//! `serve` runs the HTTP API; `summary` runs one summary for the keys in the
//! environment and prints the response body to stdout.

use std::env;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    cancellation::Cancellation,
    configuration::{get_configuration, set_configuration, Config, State},
    controller::rollover_summary::Response,
    error::Error,
    handler::{Progress, SummaryService},
    types::SummaryRequest,
};

pub const API_KEY_VAR: &str = "KRAKEN_API_KEY";
pub const API_SECRET_VAR: &str = "KRAKEN_API_SECRET";

/// Kraken rollover fee summary
#[derive(Parser)]
#[command(name = "rollover")]
#[command(about = "Kraken rollover fee summary service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default if no command specified)
    Serve,

    /// Summarize the ledger of the keys in KRAKEN_API_KEY and KRAKEN_API_SECRET
    Summary {
        /// Print the JSON response indented
        #[arg(long)]
        pretty: bool,
    },
}

/// Initialize configuration and return Config
pub fn init_config() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

fn request_from_env() -> SummaryRequest {
    SummaryRequest {
        public_key: env::var(API_KEY_VAR).ok(),
        private_key: env::var(API_SECRET_VAR).ok(),
    }
}

fn log_progress(event: &Progress) {
    match event {
        Progress::PageFetched {
            page,
            received,
            total,
        } => {
            info!("Page {}: {} entries, {} so far", page, received, total);
        },
        Progress::Waiting { page, delay } => {
            info!("Waiting {:?} before page {}", delay, page + 1);
        },
    }
}

/// Run one summary, cancelling it on Ctrl-C.
pub async fn run_summary(pretty: bool) -> Result<(), Error> {
    let config = init_config()?;
    let state = State::new(config.clone())?;
    let request = request_from_env();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            log_progress(&event);
        }
    });

    let cancellation = Cancellation::new();
    let service = SummaryService::new(config);
    let result = {
        let summary =
            service.summarize(&state.http, request, &cancellation, Some(tx));
        tokio::pin!(summary);

        tokio::select! {
            result = &mut summary => result,
            signal = tokio::signal::ctrl_c() => {
                signal?;
                warn!("Interrupted, cancelling summary");
                cancellation.cancel();
                summary.await
            },
        }
    };

    progress.await?;

    let report = result?;
    let response = Response { ok: true, report };
    let body = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", body);

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command() {
        let cli = Cli::try_parse_from(["rollover"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["rollover", "summary", "--pretty"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::Summary { pretty: true })));
    }
}
