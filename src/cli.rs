//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Scrape pages with per-site regex rules and download what they reference.
///
/// Sites, patterns and destinations are declared in a `grab.hcl` file, found
/// by searching the working directory and its ancestors.
#[derive(Parser, Debug)]
#[command(name = "grab")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the given URLs, or files listing URLs, and download the results
    Get(GetArgs),

    /// Inspect the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GetArgs {
    /// URLs to scrape, or paths to files with one URL per line
    #[arg(required = true, value_name = "URL|FILE")]
    pub urls: Vec<String>,

    /// Config file to use instead of searching for grab.hcl
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Overwrite files that already exist
    #[arg(short, long)]
    pub force: bool,

    /// Stop at the first failed fetch or download
    #[arg(short, long)]
    pub strict: bool,

    /// Print what would be written without writing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show a progress bar while downloading
    #[arg(short, long)]
    pub progress: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate the configuration file
    Check {
        /// Config file to use instead of searching for grab.hcl
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the path of the closest grab.hcl
    Find {
        /// Directory to start searching from
        #[arg(short, long, value_name = "DIR")]
        path: Option<PathBuf>,
    },
}
