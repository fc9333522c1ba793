//! job-monitor -- run reports, KPI gates, and log retention for batch jobs.
//!
//! This crate provides a report accumulator that a job's driver code feeds
//! between stages, threshold checks on the job's KPIs, and persistence of
//! the final report into a log folder with age-based retention.

pub mod config;
pub mod monitor;
pub mod storage;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use uuid::Uuid;

use config::MonitorConfig;
use monitor::kpi::KpiFile;
use monitor::{Monitor, MonitorError, ReportLine, SaveOptions, SavedReport};
use storage::ReportStorage;

/// Start a monitor whose header comes from the configuration.
pub fn monitor_from_config(config: &MonitorConfig) -> Monitor {
    Monitor::new(config.report.title.clone())
        .with_point_of_contact(config.report.point_of_contact.clone())
        .with_header(config.report.header.clone())
}

/// Read `[[kpi]]` definitions from a TOML file.
pub fn load_kpis(path: &Path) -> Result<KpiFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read KPI file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse KPI file: {}", path.display()))
}

/// A finished KPI check. The monitor is kept even when saving failed so
/// the report can still be shown.
#[derive(Debug)]
pub struct KpiCheck {
    pub monitor: Monitor,
    pub saved: Result<SavedReport, MonitorError>,
}

/// Machine-readable view of a [`KpiCheck`].
#[derive(Debug, Serialize)]
pub struct CheckSummary<'a> {
    pub run_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<&'a SavedReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
    pub lines: &'a [ReportLine],
}

impl KpiCheck {
    pub fn summary(&self) -> CheckSummary<'_> {
        CheckSummary {
            run_id: self.monitor.run_id(),
            success: self.monitor.is_success(),
            saved: self.saved.as_ref().ok(),
            save_error: self.saved.as_ref().err().map(|e| e.to_string()),
            lines: self.monitor.lines(),
        }
    }
}

/// Evaluate the KPIs in `kpi_path` as one suite and save the report.
///
/// A KPI file that cannot be loaded fails the run but the report is still
/// saved; the returned monitor tells the caller whether the run succeeded.
pub fn run_kpi_check(
    config: &MonitorConfig,
    kpi_path: &Path,
    suite: &str,
    storage: &dyn ReportStorage,
) -> KpiCheck {
    let mut monitor = monitor_from_config(config);
    let span = tracing::info_span!("kpi_check", run_id = %monitor.run_id());
    let _enter = span.enter();

    match load_kpis(kpi_path) {
        Ok(file) => {
            tracing::info!(
                count = file.kpis.len(),
                path = %kpi_path.display(),
                "evaluating KPIs"
            );
            monitor.update_with_kpis(&file.kpis, suite);
        }
        Err(e) => {
            monitor.update_with_error(
                &e,
                "Load KPI definitions",
                Some("check the [[kpi]] tables and comparator names"),
            );
        }
    }

    let options = SaveOptions {
        purge: config.storage.purge,
        purge_window_days: config.storage.purge_window_days,
    };
    let saved = monitor.save(storage, &config.storage.log_folder, options);
    if let Err(e) = &saved {
        tracing::error!(error = %e, "failed to save report");
    }

    KpiCheck { monitor, saved }
}
