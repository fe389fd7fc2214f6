//! KiwiStore CLI
//!
//! Issues a single command against a KiwiStore server and prints the reply.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use kiwi_client::{ClientConfig, Endpoint, StoreClient, DEFAULT_SECTION};

/// KiwiStore command-line client
#[derive(Parser, Debug)]
#[command(name = "kiwi-cli")]
#[command(about = "A simple key-value store client")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5555")]
    address: String,

    /// JSON configuration file holding the endpoint section (overrides --address)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Section name inside the configuration file
    #[arg(long, default_value = DEFAULT_SECTION)]
    section: String,

    /// Connect/write/read timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to store
        value: String,
    },

    /// Get the value of a key
    Get {
        /// The key to get
        key: String,
    },

    /// Remove a key
    Remove {
        /// The key to remove
        key: String,
    },

    /// Ping the server for health check
    Ping,

    /// List all keys in the store
    List,

    /// Get store statistics
    Stats,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = build_client(&args)?;
    tracing::debug!(endpoint = %client.endpoint(), "client ready");

    match args.command {
        Commands::Set { key, value } => {
            println!("{}", client.set(&key, &value).await?);
        }
        Commands::Get { key } => match client.get(&key).await? {
            Some(value) => println!("{}", value),
            None => println!("(not found)"),
        },
        Commands::Remove { key } => {
            println!("{}", client.remove(&key).await?);
        }
        Commands::Ping => {
            println!("{}", client.ping().await?);
        }
        Commands::List => {
            for key in client.list().await? {
                println!("{}", key);
            }
        }
        Commands::Stats => {
            println!("{}", client.stats().await?);
        }
    }

    Ok(())
}

fn build_client(args: &Args) -> Result<StoreClient> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path, &args.section)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let endpoint: Endpoint = args
                .address
                .parse()
                .with_context(|| format!("invalid --address '{}'", args.address))?;
            ClientConfig::for_endpoint(endpoint)
        }
    };

    if let Some(ms) = args.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }

    Ok(StoreClient::with_config(config)?)
}
