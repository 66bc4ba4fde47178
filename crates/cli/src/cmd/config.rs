//! Show the effective configuration

use crate::config::{self, SweepConfig};
use owo_colors::OwoColorize;
use std::path::Path;

/// Print the resolved configuration and where the file layer came from
pub fn run(config: &SweepConfig, explicit_path: Option<&Path>) {
    let location = explicit_path
        .map(Path::to_path_buf)
        .or_else(config::default_config_path);

    println!("{}", "Effective Configuration".bold());
    match location {
        Some(path) if path.exists() => {
            println!("{}: {}\n", "Location".dimmed(), path.display().dimmed())
        }
        Some(path) => println!(
            "{}: {} {}\n",
            "Location".dimmed(),
            path.display().dimmed(),
            "(not found, using defaults)".dimmed()
        ),
        None => println!("{}: {}\n", "Location".dimmed(), "(none)".dimmed()),
    }

    println!("{}", "[cluster]".yellow());
    if config.endpoint.is_empty() {
        println!("  {} = {}", "endpoint".cyan(), "(none)".red());
    } else {
        println!("  {} = {}", "endpoint".cyan(), config.endpoint);
    }
    println!(
        "  {} = {} {}",
        "request_timeout_secs".cyan(),
        config.request_timeout.as_secs(),
        format!("({}s)", config.request_timeout.as_secs()).dimmed()
    );
    println!("  {} = {}", "max_retries".cyan(), config.retry.max_retries);
    println!(
        "  {} = {}",
        "retry_backoff_ms".cyan(),
        config.retry.initial_backoff.as_millis()
    );

    println!("\n{}", "[policy]".yellow());
    println!(
        "  {} = {} {}",
        "stale_age_days".cyan(),
        config.stale_age_days,
        format!("(older than {} days is deleted)", config.stale_age_days).dimmed()
    );
    println!(
        "  {} = {}",
        "orphan_markers".cyan(),
        if config.orphan_markers.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            format!("{:?}", config.orphan_markers)
        }
    );
    println!("  {} = {}", "missing_timestamp".cyan(), config.missing_timestamp);

    println!("\n{}", "[logging]".yellow());
    println!("  {} = {}", "log_level".cyan(), config.log_level);

    if let Err(e) = config.validate() {
        println!("\n{} {}", "Invalid:".red().bold(), e);
    }
}
