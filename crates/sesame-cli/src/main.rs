//! sesame - check login configuration and dry-run logins.
//!
//! `config check` validates a login configuration file. `login` replays a
//! single login against it, using the in-memory collaborators from
//! `sesame-memory`, and reports the credential, session change, cookies and
//! events it produced.

mod cli;
mod commands;
mod output;
mod settings;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{config, login};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Config(cmd) => config::handle(cmd),
        Commands::Login(args) => login::run(args).await,
    }
}

/// Set up tracing for the login managers.
///
/// `-v` shows each login outcome, `-vv` shows every step of the sequence.
/// `RUST_LOG` overrides both.
fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // stdout carries only the login report, which `--json` callers parse.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
