//! Submit command implementation.
//!
//! Submits a program to a platform. Results from a local platform are
//! retrieved and printed right away; jobs on a remote platform are saved
//! as a handle file to be retrieved later with `qhandle get`.

use anyhow::{Context, Result};
use console::style;

use qhandle_hal::JobRequest;

use super::common::{create_submitter, load_program, print_results, spinner};
use crate::config::Config;

/// Execute the submit command.
#[allow(clippy::too_many_arguments)]
pub async fn execute(
    config: &Config,
    input: &str,
    measured: u32,
    shots: u32,
    platform: Option<&str>,
    output: &str,
    qpu: usize,
    name: Option<&str>,
) -> Result<()> {
    let submitter = create_submitter(config, platform)?;

    println!(
        "{} Submitting {} to {} ({} shots)",
        style("→").cyan().bold(),
        style(input).green(),
        style(submitter.platform().name()).yellow(),
        shots
    );

    let program = load_program(input)?;
    let mut job = JobRequest::new(program, measured);
    if let Some(name) = name {
        job = job.with_name(name);
    }

    let handle = submitter
        .submit_on(&job, shots, qpu)
        .await
        .context("Submit failed")?;

    println!(
        "{} Job submitted: {}",
        style("✓").green().bold(),
        style(handle.id()).cyan()
    );

    if submitter.is_remote() {
        handle.save(output).await?;
        println!("  Handle saved to {}", style(output).green());
        println!();
        println!("{}", handle.serialize()?);
        println!();
        println!(
            "  Retrieve with: {}",
            style(format!("qhandle get {output}")).dim()
        );
    } else {
        let spinner = spinner("Waiting for results...")?;
        let counts = handle.get().await;
        spinner.finish_and_clear();
        print_results(&counts?);
    }

    Ok(())
}
