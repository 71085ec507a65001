//! Policy commands

use anyhow::{Context, Result};
use camino::Utf8Path;
use retrier_core::PolicyLoader;

use crate::cli::{PolicyCommands, PolicyShowArgs};
use crate::output;

pub fn run(cmd: PolicyCommands, config: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        PolicyCommands::Show(args) => show(args, config),
    }
}

fn show(args: PolicyShowArgs, config: Option<&Utf8Path>) -> Result<()> {
    let loader = PolicyLoader::new();
    let policies = loader
        .load(config)
        .context("Failed to load retry policies")?;
    let policy = policies.policy(args.policy.as_deref())?;
    let resolved = policy.to_config();

    let source = match config {
        Some(path) => path.to_string(),
        None => loader
            .default_path()
            .filter(|path| path.exists())
            .map(|path| path.to_string())
            .unwrap_or_else(|| "built-in defaults".to_string()),
    };

    output::header(&format!(
        "Policy: {}",
        args.policy.as_deref().unwrap_or("default")
    ));
    output::kv("Source", &source);
    output::kv("Max attempts", &resolved.max_attempts().to_string());
    output::kv("Backoff", &resolved.backoff().to_string());
    output::kv("Log threshold", &resolved.log_threshold().to_string());

    println!();
    print!("{}", serde_yaml_ng::to_string(policy)?);

    Ok(())
}
