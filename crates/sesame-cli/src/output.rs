//! Human-readable report lines on stdout.
//!
//! Commands either print through these helpers or emit one JSON document
//! with [`json_pretty`]; the two never mix in one run.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Headline for a check that passed or a session that was established.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Headline for an outcome that ends quietly, like an ineligible account.
pub fn notice(msg: &str) {
    println!("{} {}", "•".yellow(), msg);
}

/// One indented `label: value` line under a headline.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// The whole report as a single JSON document.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
