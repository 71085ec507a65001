//! Run command

use anyhow::{anyhow, Context, Result};
use camino::Utf8Path;
use retrier_core::retry::{RetryPredicate, TracingObserver};
use retrier_core::types::{BackoffSpec, RetryPolicy};
use retrier_core::PolicyLoader;
use std::io;
use std::process::{Command, ExitStatus};

use crate::cli::{BackoffKind, RunArgs};
use crate::output;

/// Why a single run of the child command failed
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The program could not be started at all
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program ran and exited unsuccessfully
    #[error("'{program}' failed: {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Classifies child failures by exit code
///
/// Spawn failures are never retried. With no codes configured, every
/// unsuccessful exit is retried.
#[derive(Debug, Clone, Default)]
pub struct ExitCodePredicate {
    codes: Vec<i32>,
}

impl ExitCodePredicate {
    pub fn new(codes: Vec<i32>) -> Self {
        Self { codes }
    }
}

impl RetryPredicate<CommandError> for ExitCodePredicate {
    fn should_retry(&self, error: &CommandError) -> bool {
        match error {
            CommandError::Spawn { .. } => false,
            CommandError::Failed { status, .. } if self.codes.is_empty() => !status.success(),
            CommandError::Failed { status, .. } => status
                .code()
                .map(|code| self.codes.contains(&code))
                .unwrap_or(false),
        }
    }
}

pub fn run(args: RunArgs, config: Option<&Utf8Path>) -> Result<()> {
    let policies = PolicyLoader::new()
        .load(config)
        .context("Failed to load retry policies")?;
    let base = policies.policy(args.policy.as_deref())?;
    let policy = resolve_policy(base, &args);

    let (program, program_args) = args
        .command
        .split_first()
        .ok_or_else(|| anyhow!("No command given"))?;

    let retry = policy
        .build()
        .with_observer(TracingObserver::new(program.as_str()));
    tracing::debug!(program = %program, config = ?retry.config(), "running under retry");

    let predicate = ExitCodePredicate::new(args.retry_on.clone());
    let result = retry.execute(|| run_once(program, program_args), &predicate);

    match result {
        Ok(()) => {
            output::success(&format!("'{}' succeeded", program));
            Ok(())
        }
        Err(CommandError::Failed { status, .. }) => {
            output::error(&format!("'{}' failed: {}", program, status));
            std::process::exit(exit_code(status));
        }
        Err(err) => Err(err.into()),
    }
}

/// Exit code mirroring the child's final status; 1 when it has none
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Run the child once, inheriting stdio
fn run_once(program: &str, args: &[String]) -> std::result::Result<(), CommandError> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CommandError::Failed {
            program: program.to_string(),
            status,
        })
    }
}

/// Layer CLI flags over a policy from configuration
fn resolve_policy(base: &RetryPolicy, args: &RunArgs) -> RetryPolicy {
    RetryPolicy {
        max_attempts: args.attempts.unwrap_or(base.max_attempts),
        log_threshold: args.log_threshold.unwrap_or(base.log_threshold),
        backoff: resolve_backoff(base.backoff, args),
    }
}

fn resolve_backoff(base: Option<BackoffSpec>, args: &RunArgs) -> Option<BackoffSpec> {
    if args.backoff.is_none() && args.delay_ms.is_none() && args.max_delay_ms.is_none() {
        return base;
    }

    let current = base.unwrap_or_default();
    let (current_kind, current_delay, current_max) = match current {
        BackoffSpec::Constant { delay_ms } => (BackoffKind::Constant, delay_ms, None),
        BackoffSpec::Linear { base_ms } => (BackoffKind::Linear, base_ms, None),
        BackoffSpec::Exponential {
            base_ms,
            max_delay_ms,
        } => (BackoffKind::Exponential, base_ms, max_delay_ms),
    };

    let kind = args.backoff.unwrap_or(current_kind);
    if args.max_delay_ms.is_some() && kind != BackoffKind::Exponential {
        tracing::warn!(
            backoff = ?kind,
            "--max-delay-ms only applies to exponential backoff, ignoring it"
        );
    }

    let delay = args.delay_ms.unwrap_or(current_delay);
    Some(match kind {
        BackoffKind::Constant => BackoffSpec::Constant { delay_ms: delay },
        BackoffKind::Linear => BackoffSpec::Linear { base_ms: delay },
        BackoffKind::Exponential => BackoffSpec::Exponential {
            base_ms: delay,
            max_delay_ms: args.max_delay_ms.or(current_max),
        },
    })
}
