//! ccpay
//!
//! Command-line front end for buying credit with an on-chain payment:
//! create an order, inspect it, and follow it until the backend confirms
//! payment.

mod commands;
mod config;
mod shutdown;

use clap::{Parser, Subcommand};
use commands::Context;
use config::{ConfigLoader, Overrides};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// ccpay - credit checkout client
#[derive(Parser, Debug)]
#[command(name = "ccpay")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "CCPAY_CONFIG", default_value = "./ccpay.toml")]
    config: PathBuf,

    /// Override the order API base (e.g., https://api.example.com)
    #[arg(long, env = "CCPAY_API_BASE", global = true)]
    api_base: Option<String>,

    /// Override the session file location
    #[arg(long, env = "CCPAY_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an order and print its checkout URL
    Create {
        /// Credit to buy
        credit: String,

        /// User the order is created for (defaults to the last one used)
        #[arg(short, long, env = "CCPAY_USER_ID")]
        user_id: Option<String>,
    },

    /// Fetch an order once and print it
    Show {
        /// Order id (defaults to the last created order)
        order_id: Option<String>,
    },

    /// Follow an order until it is paid
    Watch {
        /// Order id (defaults to the last created order)
        order_id: Option<String>,
    },

    /// Print the persisted session, or clear it
    Session {
        #[arg(long)]
        clear: bool,
    },

    /// Summarize a landing-page redirect URL
    Landing { url: Url },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::debug!("Starting ccpay v{}", env!("CARGO_PKG_VERSION"));

    let loader = ConfigLoader::new(
        &args.config,
        Overrides {
            api_base: args.api_base,
            session_file: args.session_file,
        },
    );
    let loaded_config = loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::debug!(chain_id = %loaded_config.chain.chain_id, "Configuration loaded from {:?}", args.config);

    if let Command::Landing { url } = &args.command {
        commands::landing(url);
        return Ok(());
    }

    let ctx = Context::new(loaded_config)?;
    match args.command {
        Command::Create { credit, user_id } => commands::create(&ctx, user_id, credit).await,
        Command::Show { order_id } => commands::show(&ctx, order_id).await,
        Command::Watch { order_id } => commands::watch(&ctx, order_id).await,
        Command::Session { clear } => commands::session(&ctx, clear),
        Command::Landing { .. } => Ok(()),
    }
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
