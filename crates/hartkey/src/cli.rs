//! Clap derive structures for the `hartkey` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hartkey -- watch and open Hartkey intercoms and gates
#[derive(Debug, Parser)]
#[command(
    name = "hartkey",
    version,
    about = "Watch and open Hartkey intercoms and gates from the command line",
    long_about = "Polls the Hartkey household and events APIs for your intercoms and gates,\n\
        shows recent door activity, and sends open commands.",
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
    /// Bearer token (overrides config and keyring)
    #[arg(long, env = "HARTKEY_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HARTKEY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Minutes between refreshes in `watch` (1-1440)
    #[arg(long, global = true)]
    pub interval: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List intercoms and gates
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Show recent door events
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Open a door or gate
    Open(OpenArgs),

    /// Poll continuously and print every refresh until Ctrl-C
    Watch,

    /// Verify that the bearer token is accepted
    Check,

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only list devices that can be opened
    #[arg(long)]
    pub actionable: bool,
}

// ── Events ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Only show events for this device id
    #[arg(long, short = 'd')]
    pub device: Option<String>,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,
}

// ── Open ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Device id (see `hartkey devices`)
    pub device_id: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value
    Set {
        /// Key: update_interval, timeout, bearer_token_env, household_url, events_url
        key: String,
        /// Value
        value: String,
    },

    /// Store the bearer token in the system keyring
    SetToken {
        /// Token (prompted for when omitted)
        token: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
