//! # evpack CLI entry point
//!
//! Parses command-line arguments, loads configuration, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use evpack_cli::config::PackConfig;
use evpack_cli::digest::{run_digest, DigestArgs};
use evpack_cli::publish::{run_publish, PublishArgs};
use evpack_cli::render::{run_check, run_render, CheckArgs, RenderArgs};

/// Evidence packager
///
/// Records SHA-256 checksums of evidence files in markdown documents and
/// publishes the result as a repository with an open pull request.
#[derive(Parser, Debug)]
#[command(name = "evpack", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the SHA-256 digest of every evidence file.
    Digest(DigestArgs),

    /// Render document templates with evidence digests.
    Render(RenderArgs),

    /// Report placeholders that name no evidence file.
    Check(CheckArgs),

    /// Build, publish, and open a pull request for an evidence package.
    Publish(PublishArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "evpack starting");

    let config = match PackConfig::load(cli.config.as_deref()) {
        Ok(mut config) => {
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Digest(args) => run_digest(&args),
        Commands::Render(args) => run_render(&args, &config),
        Commands::Check(args) => run_check(&args, &config),
        Commands::Publish(args) => run_publish(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
