//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// retrier - run a command until it succeeds or the retry budget runs out
#[derive(Parser, Debug)]
#[command(name = "retrier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a retrier.yaml policy file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command, retrying it on failure
    Run(RunArgs),

    /// Retry policy inspection
    #[command(subcommand)]
    Policy(PolicyCommands),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Named policy from the policy file (default policy if omitted)
    #[arg(short, long)]
    pub policy: Option<String>,

    /// Total attempts including the first
    #[arg(short = 'n', long)]
    pub attempts: Option<u32>,

    /// Delay growth between attempts
    #[arg(short, long, value_enum)]
    pub backoff: Option<BackoffKind>,

    /// Backoff base unit in milliseconds
    #[arg(short, long)]
    pub delay_ms: Option<u64>,

    /// Ceiling for exponential backoff in milliseconds
    #[arg(long)]
    pub max_delay_ms: Option<u64>,

    /// Log failed attempts numbered at or above this value
    #[arg(long)]
    pub log_threshold: Option<u32>,

    /// Only retry these exit codes (comma separated); any non-zero code otherwise
    #[arg(long = "retry-on", value_delimiter = ',')]
    pub retry_on: Vec<i32>,

    /// Command to run, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackoffKind {
    /// Same delay every time
    Constant,

    /// Delay grows by the base unit each attempt
    Linear,

    /// Delay doubles each attempt
    Exponential,
}

#[derive(Subcommand, Debug)]
pub enum PolicyCommands {
    /// Show a resolved retry policy
    Show(PolicyShowArgs),
}

#[derive(Args, Debug)]
pub struct PolicyShowArgs {
    /// Named policy from the policy file (default policy if omitted)
    #[arg(short, long)]
    pub policy: Option<String>,
}
