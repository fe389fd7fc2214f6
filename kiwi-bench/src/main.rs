//! # KiwiStore Load/Fuzz Harness
//!
//! Purpose: Hammer a running store with concurrent clients and report how
//! many commands succeeded, how many failed, and the latency they saw.
//!
//! - `load`: valid `SET` commands through `StoreClient`.
//! - `fuzz`: malformed raw lines; a correct store rejects every one, so
//!   they are expected to show up as failures.

mod metrics;
mod runner;
mod workload;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use kiwi_client::{ClientConfig, Endpoint, StoreClient};

use crate::metrics::TestKind;
use crate::runner::RunPlan;

/// Load/fuzz test client for KiwiStore
#[derive(Parser, Debug)]
#[command(name = "kiwi-bench")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5555")]
    address: String,

    /// Type of test to run
    #[arg(short, long, value_enum, default_value_t = TestKind::Load)]
    kind: TestKind,

    /// Number of concurrent clients
    #[arg(short, long, default_value = "10")]
    client_count: usize,

    /// Number of commands per client
    #[arg(short, long, default_value = "50")]
    sample_count: usize,

    /// Per-request timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Append the summary line to this file
    #[arg(long)]
    append: Option<PathBuf>,

    /// Print the summary as JSON instead of a text line
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let endpoint: Endpoint = args
        .address
        .parse()
        .with_context(|| format!("invalid --address '{}'", args.address))?;
    let timeout = Duration::from_millis(args.timeout_ms);
    let plan = RunPlan {
        clients: args.client_count,
        commands_per_client: args.sample_count,
    };

    tracing::info!(
        %endpoint,
        kind = %args.kind,
        clients = plan.clients,
        commands_per_client = plan.commands_per_client,
        "starting run"
    );

    let metrics = match args.kind {
        TestKind::Load => {
            let config = ClientConfig::for_endpoint(endpoint).with_timeout(timeout);
            let client = StoreClient::with_config(config)?;
            runner::run_load(&client, plan).await
        }
        TestKind::Fuzz => runner::run_fuzz(&endpoint, timeout, plan).await,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        println!("{}", metrics);
    }

    if let Some(path) = &args.append {
        metrics
            .append_to(path)
            .with_context(|| format!("appending metrics to {}", path.display()))?;
        tracing::info!(path = %path.display(), "metrics appended");
    }

    Ok(())
}
