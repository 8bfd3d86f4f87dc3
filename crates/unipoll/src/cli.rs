//! Clap derive structures for the `unipoll` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unipoll -- UniFi controller metrics poller for InfluxDB
#[derive(Debug, Parser)]
#[command(
    name = "unipoll",
    version,
    about = "Poll a UniFi controller and write its metrics to InfluxDB",
    long_about = "Polls a UniFi network controller for sites, clients, and devices\n\
        on a fixed interval and records them as InfluxDB measurements.\n\n\
        Settings come from config.toml and UNIPOLL_* environment variables.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, env = "UNIPOLL_CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Log errors only
    #[arg(long, short = 'q', global = true, conflicts_with = "debug")]
    pub quiet: bool,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the controller and report to InfluxDB
    Run,

    /// Fetch data once and print it as JSON
    Dump(DumpArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// What to fetch
    pub target: DumpTarget,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DumpTarget {
    /// Configured sites, with subsystem health
    Sites,
    /// Connected clients across configured sites
    Clients,
    /// Access points, gateways, and switches across configured sites
    Devices,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
