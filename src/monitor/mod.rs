//! Run report accumulation for batch jobs.
//!
//! A [`Monitor`] is created when a job starts and is fed one update per
//! stage. It keeps an ordered list of report lines and a success flag that,
//! once cleared, stays cleared. At the end of the job the report is saved
//! into a log folder as `<yyyyMMdd_HHmmss>.log.<success|failed>` plus a
//! `current.<success|failed>` alias.
//!
//! The monitor is meant for the driver/orchestration code of a job, called
//! sequentially between stages. It is not meant to be shared with parallel
//! workers.
//!
//! ```no_run
//! use job_monitor::monitor::{Monitor, SaveOptions};
//! use job_monitor::storage::{LocalStorage, ReportStatus};
//!
//! let mut monitor = Monitor::new("Nightly load")
//!     .with_point_of_contact("data-team@example.com");
//! monitor.update_with_success("Extract");
//! monitor.update_with_failure("Transform");
//! let saved = monitor
//!     .save(&LocalStorage::new(), "logs".as_ref(), SaveOptions::default())
//!     .unwrap();
//! assert_eq!(saved.status, ReportStatus::Failed);
//! ```

pub mod clock;
pub mod kpi;
pub mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::storage::{retention, ReportStatus, ReportStorage, StorageError};

pub use clock::{Clock, ManualClock, SystemClock};
pub use kpi::{Comparator, KpiTest, KpiUnit};
pub use report::ReportLine;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Options for [`Monitor::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Purge old reports from the folder after saving.
    pub purge: bool,
    /// Reports dated strictly before `today - purge_window_days` are purged.
    pub purge_window_days: u32,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            purge: false,
            purge_window_days: retention::DEFAULT_WINDOW_DAYS,
        }
    }
}

impl SaveOptions {
    pub fn purging(window_days: u32) -> Self {
        Self {
            purge: true,
            purge_window_days: window_days,
        }
    }
}

/// Where a saved report ended up.
#[derive(Debug, Clone, Serialize)]
pub struct SavedReport {
    pub status: ReportStatus,
    pub log_path: PathBuf,
    pub current_path: PathBuf,
    pub purged: Vec<PathBuf>,
}

/// State of one monitored job run.
pub struct Monitor {
    run_id: Uuid,
    title: String,
    point_of_contact: String,
    header: String,
    started_at: NaiveDateTime,
    last_update: NaiveDateTime,
    lines: Vec<ReportLine>,
    success: bool,
    clock: Arc<dyn Clock>,
}

impl Monitor {
    /// Start a session stamped with the system clock.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_clock(title, Arc::new(SystemClock))
    }

    pub fn with_clock(title: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let title = title.into();
        let run_id = Uuid::new_v4();
        debug!(%run_id, %title, "monitor started");

        Self {
            run_id,
            title,
            point_of_contact: String::new(),
            header: String::new(),
            started_at: now,
            last_update: now,
            lines: vec![ReportLine::At {
                at: now,
                text: "Beginning".to_string(),
            }],
            success: true,
            clock,
        }
    }

    /// Builder-style setter for the point of contact.
    pub fn with_point_of_contact(mut self, poc: impl Into<String>) -> Self {
        self.point_of_contact = poc.into();
        self
    }

    /// Builder-style setter for the free-text header.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn point_of_contact(&self) -> &str {
        &self.point_of_contact
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn last_update(&self) -> NaiveDateTime {
        self.last_update
    }

    /// Report records in the order they were appended.
    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Append `text` stamped with `[last update - now]`.
    pub fn update(&mut self, text: impl Into<String>) {
        let now = self.clock.now();
        let text = text.into();
        debug!(run_id = %self.run_id, %text, "report update");

        self.lines.push(ReportLine::Span {
            from: self.last_update,
            to: now,
            text,
        });
        self.last_update = now;
    }

    /// Record a successful stage. Always returns `true`.
    pub fn update_with_success(&mut self, description: &str) -> bool {
        self.update(format!("{}: success", description));
        true
    }

    /// Record a failed stage and mark the run failed. Always returns `false`.
    pub fn update_with_failure(&mut self, description: &str) -> bool {
        self.update(format!("{}: failed", description));
        self.fail();
        false
    }

    /// Record an error caught by the job and mark the run failed.
    ///
    /// The error is written into the report (message, cause chain, and the
    /// backtrace when one was captured), not returned. Callers check
    /// [`is_success`](Self::is_success) afterwards to decide whether to
    /// escalate. Always returns `false`.
    pub fn update_with_error(
        &mut self,
        error: &anyhow::Error,
        description: &str,
        diagnostic: Option<&str>,
    ) -> bool {
        self.fail();

        if !description.is_empty() {
            self.update(format!("{}: failed", description));
        }
        if let Some(diagnostic) = diagnostic {
            self.lines
                .push(ReportLine::detail(1, format!("Diagnostic: {}", diagnostic)));
        }

        self.lines.push(ReportLine::detail(2, error.to_string()));
        for cause in error.chain().skip(1) {
            self.lines
                .push(ReportLine::detail(2, format!("Caused by: {}", cause)));
        }

        let backtrace = error.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            for frame in backtrace.to_string().lines() {
                let frame = frame.trim();
                if !frame.is_empty() {
                    self.lines.push(ReportLine::detail(2, frame));
                }
            }
        }

        warn!(run_id = %self.run_id, error = %error, %description, "stage error recorded");
        false
    }

    /// Evaluate a KPI suite, fold the outcome into the run, and append the
    /// suite header (when `suite_name` is non-empty) and every test's block.
    pub fn update_with_kpis(&mut self, tests: &[KpiTest], suite_name: &str) -> bool {
        let passed = tests.iter().all(KpiTest::evaluate);

        if !passed {
            self.fail();
        }

        if !suite_name.is_empty() {
            let status = if passed { "success" } else { "failed" };
            self.update(format!("{}: {}", suite_name, status));
        }

        for test in tests {
            for line in test.format() {
                self.lines.push(ReportLine::text(line));
            }
        }

        debug!(
            run_id = %self.run_id,
            suite = %suite_name,
            count = tests.len(),
            passed,
            "kpi suite evaluated"
        );
        passed
    }

    /// Full report text, header first.
    pub fn report(&self) -> String {
        let mut head = Vec::new();
        if !self.title.is_empty() {
            head.push(ReportLine::text(format!("\t\t\t\t\t{}", self.title)));
        }
        if !self.point_of_contact.is_empty() {
            head.push(ReportLine::text(format!(
                "Point of contact: {}",
                self.point_of_contact
            )));
        }
        if !self.header.is_empty() {
            head.push(ReportLine::text(self.header.clone()));
        }

        let mut out = report::render(&head);
        out.push_str(&report::render(&self.lines));
        out
    }

    /// Finalize the report with its duration and persist it into `folder`.
    ///
    /// Writes `<yyyyMMdd_HHmmss>.log.<status>`, replaces any `current.*`
    /// alias with `current.<status>`, then optionally purges old reports.
    pub fn save(
        &mut self,
        storage: &dyn ReportStorage,
        folder: &Path,
        options: SaveOptions,
    ) -> Result<SavedReport, MonitorError> {
        let now = self.clock.now();
        let elapsed = now - self.started_at;
        self.lines.push(ReportLine::At {
            at: now,
            text: format!("Duration: {}", report::format_duration(elapsed)),
        });

        let status = ReportStatus::from_success(self.success);
        let content = self.report();

        let log_path = folder.join(format!(
            "{}.log.{}",
            now.format("%Y%m%d_%H%M%S"),
            status.suffix()
        ));
        storage.write(&log_path, &content)?;

        retention::clear_current(storage, folder)?;
        let current_path = folder.join(status.current_name());
        storage.write(&current_path, &content)?;

        let purged = if options.purge {
            retention::purge(storage, folder, options.purge_window_days, now)?
        } else {
            Vec::new()
        };

        info!(
            run_id = %self.run_id,
            %status,
            log = %log_path.display(),
            purged = purged.len(),
            "report saved"
        );

        Ok(SavedReport {
            status,
            log_path,
            current_path,
            purged,
        })
    }

    /// Publish the in-progress report as `current.ongoing` without
    /// finalizing it.
    pub fn checkpoint(
        &self,
        storage: &dyn ReportStorage,
        folder: &Path,
    ) -> Result<PathBuf, MonitorError> {
        let path = folder.join(ReportStatus::Ongoing.current_name());
        storage.write(&path, &self.report())?;
        debug!(run_id = %self.run_id, path = %path.display(), "report checkpoint written");
        Ok(path)
    }

    fn fail(&mut self) {
        if self.success {
            info!(run_id = %self.run_id, "run marked as failed");
        }
        self.success = false;
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("run_id", &self.run_id)
            .field("title", &self.title)
            .field("started_at", &self.started_at)
            .field("last_update", &self.last_update)
            .field("success", &self.success)
            .field("lines", &self.lines.len())
            .finish()
    }
}
