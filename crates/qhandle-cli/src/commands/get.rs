//! Get command implementation.
//!
//! Resume a handle file, wait for the job to leave the pending state, then
//! print results.

use std::time::Duration;

use anyhow::Result;
use console::style;

use qhandle_future::{FutureHandle, HandleStatus};

use super::common::{create_platform, print_results, print_results_json, read_record, spinner};
use crate::config::Config;

/// Execute the get command.
pub async fn execute(
    config: &Config,
    file: &str,
    platform: Option<&str>,
    timeout: u64,
    format: &str,
    update: bool,
) -> Result<()> {
    let record = read_record(file).await?;

    let platform_name = platform
        .map(str::to_string)
        .or_else(|| record.metadata.platform.clone());
    let platform = create_platform(config, platform_name.as_deref())?;
    let handle = FutureHandle::from_record(record, platform, config.poll_interval())?;

    if handle.status() == HandleStatus::Pending {
        println!(
            "{} Waiting for job {} on {} (timeout: {}s)",
            style("→").cyan().bold(),
            style(handle.id()).dim(),
            style(handle.platform().name()).yellow(),
            timeout
        );
    }

    let spinner = spinner("Waiting for job to complete...")?;
    let outcome = tokio::time::timeout(Duration::from_secs(timeout), handle.get()).await;
    spinner.finish_and_clear();

    let Ok(outcome) = outcome else {
        anyhow::bail!(
            "Timeout after {timeout}s. Job {} is still pending. Run 'qhandle get {file}' again later.",
            handle.id()
        );
    };

    if update && handle.status() != HandleStatus::Pending {
        handle.save(file).await?;
        println!(
            "  Updated {} ({})",
            style(file).green(),
            handle.status()
        );
    }

    let counts = outcome?;
    match format {
        "json" => print_results_json(&counts)?,
        _ => print_results(&counts),
    }

    Ok(())
}
