//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod node;

pub use node::NodeCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Test and inspect a deployed prediction node
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },
}

/// Routes the command to its handler module
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Node { command } => node::handle_node_command(command, config).await,
    }
}
