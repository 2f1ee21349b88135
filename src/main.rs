//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `site_audit` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use site_audit::initialization::{init_crypto_provider, init_logger_with};
use site_audit::{fingerprint, site_summary, Acquirer, Config};

/// Acquires a website and prints the normalized site data.
#[derive(Debug, Parser)]
#[command(name = "site_audit", version, about)]
struct Cli {
    /// Website to acquire (scheme optional)
    url: String,

    /// Print the plain-text summary instead of JSON
    #[arg(long)]
    summary: bool,

    /// Also write the JSON result to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[command(flatten)]
    config: Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load API keys from .env when present, then from next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    let log_level = cli.config.log_level.clone();
    let log_format = cli.config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    let acquirer = match Acquirer::new(cli.config) {
        Ok(acquirer) => acquirer,
        Err(e) => {
            eprintln!("site_audit error: {:#}", e);
            process::exit(1);
        }
    };

    let result = acquirer.acquire(&cli.url).await;
    let signature = fingerprint(&result);

    if let Some(path) = &cli.output {
        result
            .write_json(path)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if cli.summary {
        print!("{}", site_summary(&result));
    } else {
        let document = json!({ "result": result, "signature": signature });
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    acquirer.stats().log_summary();
    Ok(())
}
