//! Configuration subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use sesame_core::LoginConfig;

use crate::output;
use crate::settings;

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Load and validate a configuration file
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Configuration file (defaults to login.json in the config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the parsed configuration as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn handle(cmd: ConfigCommand) -> Result<()> {
    match cmd.command {
        ConfigSubcommand::Check(args) => check(args),
    }
}

fn check(args: CheckArgs) -> Result<()> {
    let path = settings::config_path(args.config)?;
    let config = LoginConfig::from_path(&path)
        .with_context(|| format!("Invalid configuration {}", path.display()))?;

    if args.json {
        return output::json_pretty(&config);
    }

    output::success(&format!(
        "{} is valid ({} managers)",
        path.display(),
        config.managers.len()
    ));

    for (name, manager) in &config.managers {
        let realm = manager.realm();
        println!();
        println!("{}", name.bold());
        output::field("  Firewall", realm.name().as_str());
        output::field("  Remember me", on_off(realm.remember_me()));

        let oauth = realm.oauth();
        if oauth.enabled {
            output::field(
                "  OAuth",
                &format!(
                    "on (user provider {}, {:?} credentials{}{})",
                    oauth.user_provider.as_deref().unwrap_or("-"),
                    oauth.token_kind,
                    if oauth.always_authenticated { ", always authenticated" } else { "" },
                    if oauth.use_username_password_token {
                        ", username/password token"
                    } else {
                        ""
                    },
                ),
            );
        } else {
            output::field("  OAuth", "off");
        }
    }

    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
