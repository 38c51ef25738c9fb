//! Clap derive structures for the `statusmail` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// statusmail -- incident status notifications by email
#[derive(Debug, Parser)]
#[command(
    name = "statusmail",
    version,
    about = "Send formatted incident status reports by email",
    long_about = "Serve the authenticated incident status form, or validate, preview and\n\
        send status reports (RED / AMBER / GREEN) straight from the command line.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "STATUSMAIL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STATUSMAIL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server (login page, status form, send endpoint)
    Serve(ServeArgs),

    /// Validate, render and send a status report from a JSON file
    Send(ReportArgs),

    /// Validate and render a status report without sending it
    Preview(ReportArgs),

    /// List incident statuses and the fields each one requires
    Statuses,

    /// Manage configuration and stored secrets
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Directory with the static pages (overrides server.static_dir)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report JSON file, or `-` for stdin
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a config file with guided setup
    Init,

    /// Display the resolved configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Store a secret in the system keyring
    SetSecret {
        /// Which secret to store
        secret: SecretTarget,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SecretTarget {
    /// Password for the web login
    LoginPassword,
    /// API key for the mail relay
    MailApiKey,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
