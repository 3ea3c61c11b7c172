use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
}

/// Top-level CLI parser for the `ush` binary.
#[derive(Debug, Parser)]
#[command(name = "ush", version, about = "Usher - meeting round automation toolbox")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Parse and inspect a conflict CSV.
    Parse(ParseArgs),
    /// Dry-run one round's conflicts against a participant snapshot.
    Plan(PlanArgs),
    /// List round states for a session.
    Rounds(RoundsArgs),
    /// Show one round in detail.
    Status(StatusArgs),
}

/// Arguments for `ush parse`.
#[derive(Clone, Debug, Args)]
pub struct ParseArgs {
    /// Path to the conflict CSV file.
    pub csv: PathBuf,

    /// Optional registrant CSV used to rewrite emails to the addresses
    /// the meeting platform reports.
    #[arg(long)]
    pub registrants: Option<PathBuf>,
}

/// Arguments for `ush plan`.
#[derive(Clone, Debug, Args)]
pub struct PlanArgs {
    /// Path to the conflict CSV file.
    pub csv: PathBuf,

    /// Round identifier to plan.
    #[arg(long)]
    pub round: String,

    /// Path to a participant directory snapshot (JSON array).
    #[arg(long)]
    pub participants: PathBuf,

    /// Session whose stored email overrides should be applied.
    #[arg(long)]
    pub session: Option<String>,
}

/// Arguments for `ush rounds`.
#[derive(Clone, Debug, Args)]
pub struct RoundsArgs {
    /// Session identifier.
    #[arg(long)]
    pub session: String,
}

/// Arguments for `ush status`.
#[derive(Clone, Debug, Args)]
pub struct StatusArgs {
    /// Session identifier.
    #[arg(long)]
    pub session: String,

    /// Round identifier.
    #[arg(long)]
    pub round: String,
}
