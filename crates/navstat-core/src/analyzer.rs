//! Batch orchestration over a roster.
//!
//! Securities are processed one at a time, in roster order:
//!
//! ```text
//! Pending ──fetch──▶ Fetched ──series+stats──▶ Processed ──report──▶ Reported ──append──▶ Recorded
//! ```
//!
//! A failure at any step drops that security's partial work, is logged with
//! its full error chain, and the loop moves on. Only roster loading and the
//! final summary write can fail the batch as a whole.

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::AnalyzerConfig;
use crate::nav_client::{FetchError, NavSource};
use crate::report::{report_file_name, report_title, ReportEmitter, ReportError, ReportRequest};
use crate::roster::{Roster, RosterError};
use crate::statistics::{compute_metrics, StatisticsError};
use crate::summary::{summary_file_name, BatchResult, ResultRow, SummaryError};
use crate::{Isin, NavSeries, SecurityRecord, SeriesError};

/// Progress of one security through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SecurityStage {
    Pending,
    Fetched,
    Processed,
    Reported,
    Recorded,
}

impl SecurityStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetched => "fetched",
            Self::Processed => "processed",
            Self::Reported => "reported",
            Self::Recorded => "recorded",
        }
    }
}

impl Display for SecurityStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single security was skipped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed")]
    Fetch(#[from] FetchError),
    #[error("nav series could not be built")]
    Series(#[from] SeriesError),
    #[error("statistics could not be computed")]
    Statistics(#[from] StatisticsError),
    #[error("report could not be emitted")]
    Report(#[from] ReportError),
}

/// A skipped security, with the last stage it completed.
#[derive(Debug)]
pub struct SecurityFailure {
    pub isin: Isin,
    pub stage: SecurityStage,
    pub error: PipelineError,
}

/// Failures that stop the whole batch.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
    #[error("failed to create output directory {}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a completed run produced.
#[derive(Debug)]
pub struct BatchOutcome {
    pub summary_path: PathBuf,
    pub batch: BatchResult,
    pub failures: Vec<SecurityFailure>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.batch.len()
    }
}

/// Create the reports directory ahead of a run.
pub fn prepare_output_dir(config: &AnalyzerConfig) -> Result<(), AnalyzerError> {
    let path = config.reports_dir();
    fs::create_dir_all(path).map_err(|source| AnalyzerError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

/// A security that got through reporting, awaiting its summary row.
struct Completed {
    row: ResultRow,
    stage: SecurityStage,
}

/// Drives every roster entry through fetch, statistics and reporting.
pub struct NavAnalyzer {
    config: AnalyzerConfig,
    source: Arc<dyn NavSource>,
    emitter: Arc<dyn ReportEmitter>,
}

impl NavAnalyzer {
    pub fn new(
        config: AnalyzerConfig,
        source: Arc<dyn NavSource>,
        emitter: Arc<dyn ReportEmitter>,
    ) -> Self {
        Self {
            config,
            source,
            emitter,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Load the roster at `path` and analyze it.
    pub async fn analyze_path(&self, path: impl AsRef<Path>) -> Result<BatchOutcome, AnalyzerError> {
        let roster = Roster::load(path)?;
        self.analyze(&roster).await
    }

    pub async fn analyze(&self, roster: &Roster) -> Result<BatchOutcome, AnalyzerError> {
        let mut batch = BatchResult::new();
        let mut failures = Vec::new();

        for record in roster.records() {
            let isin = record.isin();
            info!(%isin, "processing ISIN: {isin}");

            match self.process(record).await {
                Ok(completed) => {
                    debug!(
                        %isin,
                        from = %completed.stage,
                        stage = %SecurityStage::Recorded,
                        "security recorded"
                    );
                    batch.push(completed.row);
                }
                Err(failure) => {
                    error!(
                        isin = %failure.isin,
                        stage = %failure.stage,
                        error = %error_chain(&failure.error),
                        "error processing ISIN {}",
                        failure.isin
                    );
                    failures.push(failure);
                }
            }
        }

        let summary_path = self
            .config
            .report_path(&summary_file_name(self.config.run_date));
        batch.write_csv(roster.columns(), &summary_path)?;

        info!(
            succeeded = batch.len(),
            failed = failures.len(),
            summary = %summary_path.display(),
            "analysis completed"
        );

        Ok(BatchOutcome {
            summary_path,
            batch,
            failures,
        })
    }

    /// Run one security up to [`SecurityStage::Reported`]; the caller records it.
    async fn process(&self, record: &SecurityRecord) -> Result<Completed, SecurityFailure> {
        let isin = record.isin();
        let mut stage = SecurityStage::Pending;
        let fail = |stage: SecurityStage, error: PipelineError| SecurityFailure {
            isin: isin.clone(),
            stage,
            error,
        };

        let payload = self
            .source
            .fetch_nav(isin)
            .await
            .map_err(|e| fail(stage, e.into()))?;
        stage = SecurityStage::Fetched;

        let series = NavSeries::from_raw_rows(&payload.data).map_err(|e| fail(stage, e.into()))?;
        let metrics = compute_metrics(&series, self.config.risk_free_rate)
            .map_err(|e| fail(stage, e.into()))?;
        stage = SecurityStage::Processed;

        let output = self.config.report_path(&report_file_name(isin));
        let title = report_title(record.display_name());
        let report = self
            .emitter
            .emit(&ReportRequest {
                series: &series,
                metrics: &metrics,
                title: &title,
                output: &output,
            })
            .map_err(|e| fail(stage, e.into()))?;
        stage = SecurityStage::Reported;
        debug!(%isin, %stage, report = %report.display(), "report written");

        Ok(Completed {
            row: ResultRow {
                record: record.clone(),
                metrics,
            },
            stage,
        })
    }
}

/// Render an error followed by each of its sources.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
