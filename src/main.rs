use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use job_monitor::config::{LoadedConfig, LoggingConfig, MonitorConfig};
use job_monitor::storage::{retention, LocalStorage};

#[derive(Parser)]
#[command(
    name = "job-monitor",
    about = "Run reports, KPI gates and log retention for batch jobs",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file (defaults to $JOB_MONITOR_CONFIG, then ./job-monitor.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate KPI thresholds, save the run report, fail if any KPI fails
    Check {
        /// TOML file with [[kpi]] tables
        #[arg(long)]
        kpis: PathBuf,

        /// Suite name written as the report line heading the KPIs
        #[arg(long, default_value = "")]
        suite: String,

        /// Log folder (overrides storage.log_folder)
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Purge old reports after saving
        #[arg(long)]
        purge: bool,

        /// Purge window in days (overrides storage.purge_window_days)
        #[arg(long)]
        window_days: Option<u32>,

        /// Report title (overrides report.title)
        #[arg(long)]
        title: Option<String>,

        /// Point of contact (overrides report.point_of_contact)
        #[arg(long)]
        poc: Option<String>,

        /// JSON output (run id, saved paths, report records) instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Delete reports older than the purge window
    Purge {
        /// Log folder (overrides storage.log_folder)
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Purge window in days (overrides storage.purge_window_days)
        #[arg(long)]
        window_days: Option<u32>,
    },

    /// Print the report behind the current.* alias
    Current {
        /// Log folder (overrides storage.log_folder)
        #[arg(long)]
        folder: Option<PathBuf>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    // Logs go to stderr; stdout carries the report.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => LoadedConfig {
            config: MonitorConfig::load(path)?,
            source: Some(path.clone()),
            skipped: Vec::new(),
        },
        None => MonitorConfig::load_or_default(),
    };

    init_tracing(&loaded.config.logging);
    loaded.log();
    let mut config = loaded.config;

    let storage = LocalStorage::new();

    match cli.command {
        Commands::Check {
            kpis,
            suite,
            folder,
            purge,
            window_days,
            title,
            poc,
            json,
        } => {
            if let Some(folder) = folder {
                config.storage.log_folder = folder;
            }
            if purge {
                config.storage.purge = true;
            }
            if let Some(days) = window_days {
                config.storage.purge_window_days = days;
            }
            if let Some(title) = title {
                config.report.title = title;
            }
            if let Some(poc) = poc {
                config.report.point_of_contact = poc;
            }

            tracing::info!(kpis = %kpis.display(), %suite, "Running KPI check");
            let check = job_monitor::run_kpi_check(&config, &kpis, &suite, &storage);

            if json {
                println!("{}", serde_json::to_string_pretty(&check.summary())?);
            } else {
                print!("{}", check.monitor.report());
            }

            let saved = check.saved?;
            if !check.monitor.is_success() {
                anyhow::bail!("run failed; report saved to {}", saved.log_path.display());
            }
        }
        Commands::Purge {
            folder,
            window_days,
        } => {
            let folder = folder.unwrap_or(config.storage.log_folder);
            let days = window_days.unwrap_or(config.storage.purge_window_days);
            let now = chrono::Local::now().naive_local();

            let deleted = retention::purge(&storage, &folder, days, now)?;
            if deleted.is_empty() {
                println!("Nothing older than {} days in {}.", days, folder.display());
            } else {
                for path in &deleted {
                    println!("deleted {}", path.display());
                }
            }
        }
        Commands::Current { folder, json } => {
            let folder = folder.unwrap_or(config.storage.log_folder);

            match retention::current_report(&storage, &folder)? {
                Some(current) if json => {
                    println!("{}", serde_json::to_string_pretty(&current)?);
                }
                Some(current) => {
                    println!("Status: {}", current.status);
                    println!("{}", "-".repeat(40));
                    print!("{}", current.content);
                }
                None => {
                    anyhow::bail!("no current report in {}", folder.display());
                }
            }
        }
    }

    Ok(())
}
