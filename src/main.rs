//! Lbtopo - load-balanced topology sample
//!
//! Provisions a complete load-balanced VM topology, exercises it, and
//! tears it down again.
//!
//! This is the main entry point for the lbtopo CLI.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lbtopo::client::arm::ArmClient;
use lbtopo::client::memory::{InMemoryClient, FAKE_SUBSCRIPTION};
use lbtopo::client::ResourceClient;
use lbtopo::config::{Credentials, Settings};
use lbtopo::output::Reporter;
use lbtopo::workflow::Workflow;

/// Provision, exercise and tear down a load-balanced VM topology.
#[derive(Debug, Parser)]
#[command(name = "lbtopo", version, about)]
struct Cli {
    /// Region to deploy into
    #[arg(long, default_value = "westus")]
    location: String,

    /// Prefix for every generated resource name
    #[arg(long, default_value = "lbtopo")]
    prefix: String,

    /// Run against an in-memory fake instead of the real service
    #[arg(long)]
    dry_run: bool,

    /// Leave the resource group in place after a successful run
    #[arg(long)]
    keep: bool,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings {
        location: cli.location.clone(),
        prefix: cli.prefix.clone(),
        keep: cli.keep,
        ..Settings::default()
    };
    let reporter = Reporter::stdout();

    let (client, subscription): (Arc<dyn ResourceClient>, String) = if cli.dry_run {
        reporter.warn("dry run: using the in-memory fake service");
        (Arc::new(InMemoryClient::new()), FAKE_SUBSCRIPTION.to_string())
    } else {
        let credentials = match Credentials::from_env() {
            Ok(credentials) => credentials,
            Err(err) => {
                reporter.error(&format!("{err}"));
                std::process::exit(err.exit_code());
            }
        };
        let subscription = credentials.subscription_id.clone();
        match ArmClient::new(credentials) {
            Ok(client) => (Arc::new(client), subscription),
            Err(err) => {
                reporter.error(&format!("{err}"));
                std::process::exit(err.exit_code());
            }
        }
    };

    let workflow = Workflow::new(client, settings, reporter.clone(), &subscription);
    let report = workflow.run().await;

    if report.succeeded() {
        reporter.info("all done");
        return;
    }
    // A provisioning failure takes precedence over a teardown failure
    // when picking the exit code.
    let code = report
        .error
        .as_ref()
        .or(report.cleanup_error.as_ref())
        .map_or(1, lbtopo::error::Error::exit_code);
    std::process::exit(code);
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}
