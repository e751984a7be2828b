//! Show command implementation.
//!
//! Print a stored handle without contacting any platform.

use anyhow::Result;
use console::style;

use qhandle_future::HandleState;

use super::common::{print_results, read_record};

/// Execute the show command.
pub async fn execute(file: &str, format: &str) -> Result<()> {
    let record = read_record(file).await?;

    if format == "json" {
        println!("{}", record.encode()?);
        return Ok(());
    }

    let status = match &record.state {
        HandleState::Pending => style(record.status().to_string()).yellow(),
        HandleState::Ready(_) => style(record.status().to_string()).green(),
        HandleState::Failed(_) => style(record.status().to_string()).red(),
    };

    println!("{} Job {}", style("Handle").cyan().bold(), style(&record.id).cyan());
    println!("  Status:    {status}");

    let meta = &record.metadata;
    if let Some(platform) = &meta.platform {
        println!("  Platform:  {platform}");
    }
    if let Some(shots) = meta.shots {
        println!("  Shots:     {shots}");
    }
    if let Some(qpu) = meta.qpu {
        println!("  QPU:       {qpu}");
    }
    if let Some(submitted_at) = &meta.submitted_at {
        println!("  Submitted: {}", submitted_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    match &record.state {
        HandleState::Pending => {
            println!(
                "\n  Retrieve with: {}",
                style(format!("qhandle get {file}")).dim()
            );
        }
        HandleState::Ready(counts) => print_results(counts),
        HandleState::Failed(msg) => {
            println!("\n{} {}", style("✗").red().bold(), style(msg).red());
        }
    }

    Ok(())
}

