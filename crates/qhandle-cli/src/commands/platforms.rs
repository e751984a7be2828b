//! Platforms command implementation.

use anyhow::Result;
use console::style;

use super::common::{create_platform, platform_registry};
use crate::config::Config;

/// Execute the platforms command.
pub fn execute(config: &Config) -> Result<()> {
    let registry = platform_registry();

    println!("{} Platform kinds:\n", style("qhandle").cyan().bold());
    for kind in registry.available_platforms() {
        println!("  {}", style(&kind).bold());
    }

    println!("\n{} Configured platforms:\n", style("qhandle").cyan().bold());

    let mut names: Vec<String> = config.platforms.keys().cloned().collect();
    if !names.contains(&config.platform) {
        names.push(config.platform.clone());
        names.sort();
    }

    for name in names {
        let marker = if name == config.platform { "*" } else { " " };
        match create_platform(config, Some(name.as_str())) {
            Ok(platform) => {
                println!(
                    " {} {} {} ({})",
                    marker,
                    style("●").green(),
                    style(&name).bold(),
                    config.kind_of(&name)
                );
                println!(
                    "      {}, {} QPU(s)",
                    if platform.is_remote() { "remote" } else { "local" },
                    platform.num_qpus()
                );
                if let Some(endpoint) = &config.platform_config(&name).endpoint {
                    println!("      Endpoint: {endpoint}");
                }
            }
            Err(e) => {
                println!(
                    " {} {} {} ({})",
                    marker,
                    style("○").red(),
                    style(&name).bold(),
                    config.kind_of(&name)
                );
                println!("      {}", style(format!("{e:#}")).dim());
            }
        }
    }

    println!("\n  * default platform");
    Ok(())
}
