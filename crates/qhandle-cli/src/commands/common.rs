//! Shared helpers for CLI commands.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qhandle_adapter_mock::MockPlatform;
use qhandle_adapter_rest::RestPlatform;
use qhandle_future::{HandleRecord, Submitter};
use qhandle_hal::{Counts, ExecutionPlatform, PlatformRegistry};

use crate::config::Config;

/// Registry of every platform kind this binary can build.
pub fn platform_registry() -> PlatformRegistry {
    let mut registry = PlatformRegistry::new();
    registry.register::<MockPlatform>("mock");
    registry.register::<RestPlatform>("rest");
    registry
}

/// Build the named platform, falling back to the configured default.
pub fn create_platform(config: &Config, name: Option<&str>) -> Result<Arc<dyn ExecutionPlatform>> {
    let name = name.unwrap_or(config.platform.as_str());
    let kind = config.kind_of(name);
    platform_registry()
        .create(&kind, config.platform_config(name))
        .with_context(|| format!("Failed to create platform '{name}'"))
}

/// Build a submitter for the named platform.
pub fn create_submitter(config: &Config, name: Option<&str>) -> Result<Submitter> {
    let platform = create_platform(config, name)?;
    Ok(Submitter::new(platform).with_poll_interval(config.poll_interval()))
}

/// Read a program file as opaque text.
pub fn load_program(path: &str) -> Result<String> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    let program =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    if program.trim().is_empty() {
        anyhow::bail!("Program file is empty: {path}");
    }
    Ok(program)
}

/// Read and decode a handle file.
pub async fn read_record(path: &str) -> Result<HandleRecord> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read handle file: {path}"))?;
    HandleRecord::decode(&text).with_context(|| format!("Invalid handle file: {path}"))
}

/// Spinner shown while waiting on a job.
pub fn spinner(message: impl Into<String>) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Print a histogram in a table format (shared by submit, get, show).
pub fn print_results(counts: &Counts) {
    let total = counts.total_shots();
    println!(
        "\n{} Results ({} shots):",
        style("✓").green().bold(),
        total
    );

    let sorted = counts.sorted();
    for (bitstring, count) in sorted.iter().take(16) {
        let prob = counts.probability(bitstring) * 100.0;
        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar(prob)).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }

    if let Some((bitstring, count)) = counts.most_frequent() {
        println!(
            "\n  Most frequent: {} ({} shots)",
            style(bitstring).cyan().bold(),
            count
        );
    }

    if let Some(z) = counts.expectation_z() {
        println!("\n  <Z...Z> = {}", style(format!("{z:.4}")).yellow());
    }
}

/// Print a histogram as a JSON object.
pub fn print_results_json(counts: &Counts) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(counts)?);
    Ok(())
}

fn bar(percent: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let len = (percent / 2.0).round() as usize;
    "█".repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_knows_builtin_kinds() {
        let registry = platform_registry();
        assert_eq!(registry.available_platforms(), vec!["mock", "rest"]);
    }

    #[test]
    fn test_create_default_platform() {
        let platform = create_platform(&Config::default(), None).unwrap();
        assert_eq!(platform.name(), "mock");
        assert!(!platform.is_remote());
    }

    #[test]
    fn test_create_unknown_platform() {
        let err = create_platform(&Config::default(), Some("nowhere")).err().unwrap();
        assert!(format!("{err:#}").contains("nowhere"));
    }

    #[test]
    fn test_rest_without_endpoint_fails() {
        assert!(create_platform(&Config::default(), Some("rest")).is_err());
    }

    #[test]
    fn test_load_program() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bell.qasm");
        std::fs::write(&path, "h q[0];\ncx q[0], q[1];\n").unwrap();
        let program = load_program(path.to_str().unwrap()).unwrap();
        assert!(program.contains("cx"));

        assert!(load_program("/nonexistent/program.qasm").is_err());
    }

    #[test]
    fn test_load_program_rejects_blank_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.qasm");
        std::fs::write(&path, "  \n").unwrap();
        assert!(load_program(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_print_results_handles_empty_and_wide_histograms() {
        print_results(&Counts::new());

        let wide: Counts = (0..40u32).map(|i| (format!("{i:06b}"), u64::from(i) + 1)).collect();
        assert_eq!(wide.most_frequent(), Some(("100111", 40)));
        print_results(&wide);
    }

    #[test]
    fn test_bar_length() {
        assert_eq!(bar(50.0).chars().count(), 25);
        assert_eq!(bar(0.0), "");
    }
}
