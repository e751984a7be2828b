//! qhandle Command-Line Interface
//!
//! Submit jobs to an execution platform, keep the returned handles in
//! files, and retrieve results later.
//!
//! ```text
//! qhandle submit -i bell.qasm -m 2 -s 1000 -p lab -o bell.json
//! qhandle show bell.json
//! qhandle get bell.json --update
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{get, platforms, show, submit, version};
use config::Config;

/// qhandle - future result handles for remote job execution
#[derive(Parser)]
#[command(name = "qhandle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: ~/.qhandle/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a program to a platform
    Submit {
        /// Program file (passed to the platform as-is)
        #[arg(short, long)]
        input: String,

        /// Number of measured positions (bitstring width)
        #[arg(short, long)]
        measured: u32,

        /// Number of shots
        #[arg(short, long, default_value = "1000")]
        shots: u32,

        /// Platform to use (default from config)
        #[arg(short, long)]
        platform: Option<String>,

        /// Handle file written for remote platforms
        #[arg(short, long, default_value = "job.json")]
        output: String,

        /// QPU index on multi-QPU platforms
        #[arg(long, default_value = "0")]
        qpu: usize,

        /// Job label
        #[arg(long)]
        name: Option<String>,
    },

    /// Resume a handle file and wait for its result
    Get {
        /// Handle file
        file: String,

        /// Platform to resume against (default: the one recorded in the file)
        #[arg(short, long)]
        platform: Option<String>,

        /// Timeout in seconds
        #[arg(short, long, default_value = "3600")]
        timeout: u64,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Rewrite the handle file with the resolved state
        #[arg(short, long)]
        update: bool,
    },

    /// Print a handle file without contacting the platform
    Show {
        /// Handle file
        file: String,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// List available platforms
    Platforms,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Execute command
    let result = run(cli).await;

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let load_config = || -> anyhow::Result<Config> {
        let config = Config::load(cli.config.as_deref())?;
        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    };

    match cli.command {
        Commands::Submit {
            input,
            measured,
            shots,
            platform,
            output,
            qpu,
            name,
        } => {
            submit::execute(
                &load_config()?,
                &input,
                measured,
                shots,
                platform.as_deref(),
                &output,
                qpu,
                name.as_deref(),
            )
            .await
        }

        Commands::Get {
            file,
            platform,
            timeout,
            format,
            update,
        } => {
            get::execute(
                &load_config()?,
                &file,
                platform.as_deref(),
                timeout,
                &format,
                update,
            )
            .await
        }

        Commands::Show { file, format } => show::execute(&file, &format).await,

        Commands::Platforms => platforms::execute(&load_config()?),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
