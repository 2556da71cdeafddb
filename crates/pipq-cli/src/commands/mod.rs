//! Command implementations and dispatch logic.
//!
//! This module contains all command handlers and the central dispatch
//! system. Each command is an async function taking a CommandContext.

use std::sync::Arc;

use tracing::info;

use pipq_core::error::PipqResult;
use pipq_core::MarkerEnvironment;
use pipq_registry::RegistryClient;
use pipq_resolver::PackageFetcher;

pub mod deps;
pub mod info;
pub mod releases;

use crate::output::OutputHandler;
use crate::Commands;

/// Shared context for all commands
pub struct CommandContext {
    pub fetcher: PackageFetcher,
    pub env: MarkerEnvironment,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Create a new command context against the given interpreter version
    /// and optional alternate index URL
    pub fn new(python: &str, registry: Option<&str>) -> PipqResult<Self> {
        let client = match registry {
            Some(url) => RegistryClient::with_base_url(url)?,
            None => RegistryClient::new()?,
        };
        let env = MarkerEnvironment::host(python)?;
        Ok(Self {
            fetcher: PackageFetcher::new(Arc::new(client)),
            env,
            output: OutputHandler::new(),
        })
    }
}

/// Dispatch a subcommand to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> PipqResult<()> {
    match command {
        Commands::Releases {
            package,
            after_version,
            before_version,
            after_date,
            before_date,
        } => {
            info!("Listing releases for {}", package);
            releases::execute(
                package,
                after_version,
                before_version,
                after_date,
                before_date,
                ctx,
            )
            .await
        },
        Commands::Deps {
            package,
            release,
            depth,
            extras,
            pre,
        } => {
            info!("Resolving dependency tree for {} (depth: {})", package, depth);
            deps::execute(package, release, depth, extras, pre, ctx).await
        },
    }
}

/// Handle the default invocation: show info for a package
pub async fn show_package(
    package: String,
    release: Option<String>,
    urls: bool,
    vulnerabilities: bool,
    ctx: &CommandContext,
) -> PipqResult<()> {
    info!("Fetching package info for {}", package);
    info::execute(package, release, urls, vulnerabilities, ctx).await
}
