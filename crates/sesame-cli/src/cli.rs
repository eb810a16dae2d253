//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::config::ConfigCommand;
use crate::commands::login::LoginArgs;

/// Check login configuration and dry-run logins.
#[derive(Parser, Debug)]
#[command(name = "sesame")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configuration file operations
    Config(ConfigCommand),

    /// Log a user in against in-memory collaborators
    Login(LoginArgs),
}
