use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use romferry_core::{
    load_config, validate_config, Config, JsonCatalogStore, RsyncTransfer, RunOptions, RunReport,
    SyncRunner,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code for fatal configuration/precondition failures, distinct from
/// "run completed with failed categories" (1).
const EXIT_FATAL: i32 = 2;

#[derive(Parser)]
#[command(name = "romferry", version)]
#[command(about = "Synchronize a ROM catalog to a handheld device")]
struct Cli {
    /// Device to synchronize (a [devices.<id>] section in the config)
    device: String,

    /// Categories to synchronize (default: all non-excluded categories)
    categories: Vec<String>,

    /// Path to the configuration file
    #[arg(long, short = 'c', default_value = "romferry.toml")]
    config: PathBuf,

    /// Suppress console output (the run log file is always written)
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Simulate the transfer step, leaving destination files unchanged
    #[arg(long, short = 'n')]
    dry_run: bool,

    /// Skip merging device-side state back into the source catalogs
    #[arg(long)]
    skip_reconcile: bool,

    /// Delete destination files with no source counterpart
    #[arg(long)]
    purge: bool,

    /// Also copy the device's BIOS folder
    #[arg(long)]
    include_bios: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration must load before logging: the run-log directory lives
    // in it.
    let config = match load_and_validate(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("romferry: {e:#}");
            std::process::exit(EXIT_FATAL);
        }
    };

    if let Err(e) = init_logging(&config, cli.quiet) {
        eprintln!("romferry: failed to set up logging: {e:#}");
        std::process::exit(EXIT_FATAL);
    }

    match run(cli, config).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {e:#}");
            std::process::exit(EXIT_FATAL);
        }
    }
}

fn load_and_validate(path: &PathBuf) -> Result<Config> {
    let config = load_config(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

/// Logging goes to a timestamped file in the configured log directory,
/// retained across invocations; the console layer is optional.
fn init_logging(config: &Config, quiet: bool) -> Result<()> {
    let log_dir = &config.paths.log_dir;
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let filename = format!(
        "romferry-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    );
    let log_path = log_dir.join(filename);
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("Failed to create run log {}", log_path.display()))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));
    let console_layer = (!quiet).then(|| tracing_subscriber::fmt::layer());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(())
}

async fn run(cli: Cli, config: Config) -> Result<i32> {
    info!("romferry {VERSION} starting");
    info!("Source root: {}", config.paths.source_root.display());

    let options = RunOptions::new(&cli.device)
        .with_categories(cli.categories)
        .with_dry_run(cli.dry_run)
        .with_skip_reconcile(cli.skip_reconcile)
        .with_purge(cli.purge)
        .with_bios(cli.include_bios);

    let store = Arc::new(JsonCatalogStore::new());
    let transfer = Arc::new(RsyncTransfer::new(config.transfer.clone()));

    let runner = SyncRunner::new(config, options, store, transfer)
        .context("Failed to prepare the run")?;
    let report = runner.run().await.context("Run aborted")?;

    print_summary(&report, cli.quiet);
    Ok(report.exit_code())
}

fn print_summary(report: &RunReport, quiet: bool) {
    if quiet {
        return;
    }
    println!();
    println!(
        "Device {}: {} succeeded, {} failed{}",
        report.device,
        report.succeeded().count(),
        report.failed().count(),
        if report.dry_run { " (dry run)" } else { "" },
    );
    for category in &report.categories {
        let status = if category.failed() { "FAILED" } else { "ok" };
        let files = category
            .transfer
            .as_ref()
            .and_then(|t| t.stats())
            .map(|s| format!(", {} files", s.files_transferred))
            .unwrap_or_default();
        println!(
            "  {:<16} {status}{files} ({} ms)",
            category.category, category.duration_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "romferry",
            "pocket",
            "snes",
            "gba",
            "--dry-run",
            "--purge",
            "--include-bios",
            "--skip-reconcile",
            "-q",
        ]);
        assert_eq!(cli.device, "pocket");
        assert_eq!(cli.categories, vec!["snes", "gba"]);
        assert!(cli.dry_run);
        assert!(cli.purge);
        assert!(cli.include_bios);
        assert!(cli.skip_reconcile);
        assert!(cli.quiet);
        assert_eq!(cli.config, PathBuf::from("romferry.toml"));
    }

    #[test]
    fn test_cli_requires_device() {
        assert!(Cli::try_parse_from(["romferry"]).is_err());
    }
}
