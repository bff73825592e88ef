//! Nodewatch CLI
//!
//! Triggers prediction nodes and follows their runs to completion.

mod commands;
mod config;
mod console;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nodewatch")]
#[command(about = "Trigger prediction nodes and monitor their runs", long_about = None)]
struct Cli {
    /// Node gateway URL
    #[arg(
        long,
        env = "NODEWATCH_GATEWAY_URL",
        default_value = "http://localhost:8080"
    )]
    gateway_url: String,

    /// Gateway API token
    #[arg(long, env = "NODEWATCH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Show debug diagnostics, including raw gateway responses
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "nodewatch_monitor=debug,nodewatch_cli=debug"
    } else {
        "nodewatch_monitor=warn,nodewatch_cli=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config {
        gateway_url: cli.gateway_url,
        token: cli.token,
    };

    handle_command(cli.command, &config).await
}
