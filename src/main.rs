//! `vibe-validator`: find every declared dependency and flag the ones that
//! are brand new or missing from their public registry.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and load config ([`config::load_config`]).
//! 2. Walk the project once per ecosystem, dispatching manifests and
//!    lockfiles to their parsers ([`scanner`], [`analyzer`]).
//! 3. Look every unique package up in its registry with bounded concurrency
//!    and classify it by first-publish age ([`registry`]).
//! 4. Render the report ([`report`]).
//! 5. Exit `0`, `1` with `--strict` when anything is not safe, or `130` when
//!    interrupted.

mod analyzer;
mod audit;
mod cli;
mod config;
mod error;
mod models;
mod registry;
mod report;
mod scanner;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::Level;

use cli::{Cli, ReportFormat};
use config::load_config;
use models::Status;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let mut config = load_config(&path, cli.config.as_deref())?;
    cli.apply_to(&mut config);

    let show_progress = matches!(cli.report, ReportFormat::Terminal);
    if show_progress {
        eprintln!("{} Scanning: {}", "[oo]".cyan(), path.display());
    }

    // Dropping the audit future on Ctrl-C aborts any lookups still in flight.
    let results = tokio::select! {
        results = audit::run_audit(&path, &config, show_progress) => results?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, abandoning in-flight lookups");
            eprintln!("{}", "Interrupted".red());
            std::process::exit(130);
        }
    };

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&results, &path, config.scan.verbosity);
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    if cli.strict && results.iter().any(|r| r.status != Status::Safe) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
