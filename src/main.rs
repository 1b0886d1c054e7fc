//! CLI entry point for grab.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use grab_core::Diagnostic;
use tracing::debug;

mod cli;
mod commands;

use cli::{Args, Command, ConfigCommand};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = log_level(args.verbose, args.quiet);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let diagnostic = err.downcast::<Diagnostic>().unwrap_or_else(|other| {
                Diagnostic::error("Unexpected error", format!("{other:#}"))
            });
            eprint!("{}", diagnostic.render());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Get(get) => commands::run_get_command(&get).await,
        Command::Config(ConfigCommand::Check { config }) => {
            commands::run_config_check_command(config.as_deref())
        }
        Command::Config(ConfigCommand::Find { path }) => {
            commands::run_config_find_command(path.as_deref())
        }
    }
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
