//! # pipq
//!
//! Package inspector and dependency explorer for the PyPI JSON API.
//!
//! This is the main entry point for the pipq CLI tool. It handles command
//! parsing, sets up logging, and dispatches to the command handlers.

use clap::{Parser, Subcommand};

use pipq_core::error::PipqResult;

mod commands;
mod output;

use commands::CommandContext;

/// Inspect packages, releases and dependency trees on PyPI
#[derive(Parser)]
#[command(name = "pipq", version, about = "Inspect packages on the Python package index")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Package to look up
    #[arg(value_name = "PACKAGE")]
    pub package: Option<String>,

    /// Specific release to look up
    #[arg(value_name = "RELEASE")]
    pub release: Option<String>,

    /// Print the release file listing instead of the info card
    #[arg(long)]
    pub urls: bool,

    /// Print known vulnerabilities (needs an explicit release)
    #[arg(long = "vulns", alias = "vulnerabilities")]
    pub vulns: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Interpreter version environment markers are evaluated against
    #[arg(long, global = true, value_name = "VERSION", default_value = "3.12.3")]
    pub python: String,

    /// Alternate package index URL
    #[arg(long, global = true, value_name = "URL")]
    pub registry: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List releases for a package
    Releases {
        package: String,
        /// Only releases strictly above this version
        #[arg(long, value_name = "VERSION")]
        after_version: Option<String>,
        /// Only releases strictly below this version
        #[arg(long, value_name = "VERSION")]
        before_version: Option<String>,
        /// Only releases uploaded after this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        after_date: Option<String>,
        /// Only releases uploaded before this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        before_date: Option<String>,
    },
    /// Show the dependency tree for a package
    Deps {
        package: String,
        /// Specific release to resolve (defaults to the newest stable)
        release: Option<String>,
        /// How deep to populate transitive dependencies
        #[arg(long, default_value_t = 1)]
        depth: u32,
        /// Extras to activate when filtering dependencies
        #[arg(long, value_delimiter = ',')]
        extras: Vec<String>,
        /// Allow resolving to pre-release versions
        #[arg(long)]
        pre: bool,
    },
}

fn main() -> PipqResult<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    run_cli(cli)
}

fn run_cli(cli: Cli) -> PipqResult<()> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        pipq_core::error::PipqError::io("Failed to create async runtime".to_string(), e)
    })?;

    let result = rt.block_on(async {
        let ctx = CommandContext::new(&cli.python, cli.registry.as_deref())?;

        match cli.command {
            Some(command) => commands::dispatch_command(command, &ctx).await,
            None => match cli.package {
                Some(package) => {
                    commands::show_package(package, cli.release, cli.urls, cli.vulns, &ctx).await
                },
                None => {
                    ctx.output
                        .error("Please supply a package to search for, e.g. 'pipq sampleproject'");
                    std::process::exit(2);
                },
            },
        }
    });

    if let Err(err) = result {
        let output = output::OutputHandler::new();
        output.error(&err.to_string());
        if let Some(suggestion) = err.suggestion() {
            output.info(suggestion);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pipq={level},pipq_core={level},pipq_registry={level},pipq_resolver={level}"
        ))
        .with_target(false)
        .init();
}
