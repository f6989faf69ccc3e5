//! Fixed runtime constants and the orchestrator configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use time::{Date, OffsetDateTime};

/// Upstream location of per-ISIN NAV history documents.
pub const NAV_BASE_URL: &str = "https://staticassets.zerodha.com/coin/historical-nav";
pub const REFERER: &str = "https://coin.zerodha.com/";
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36";
pub const ACCEPT: &str = "application/json, text/plain, */*";
pub const SEC_CH_UA: &str = "\"Not A(Brand\";v=\"8\", \"Chromium\";v=\"132\", \"Brave\";v=\"132\"";
pub const SEC_CH_UA_MOBILE: &str = "?0";
pub const SEC_CH_UA_PLATFORM: &str = "Linux";
pub const CSRF_HEADER: &str = "x-csrftoken";
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

pub const MAX_FETCH_ATTEMPTS: u32 = 5;
pub const MIN_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Annual risk-free rate used for Sharpe and Sortino.
pub const RISK_FREE_RATE: f64 = 0.03;
pub const PERIODS_PER_YEAR: f64 = 252.0;
pub const VAR_CONFIDENCE: f64 = 0.95;

pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Settings handed to [`crate::NavAnalyzer`] by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub reports_dir: PathBuf,
    pub risk_free_rate: f64,
    /// Calendar date naming the consolidated summary file.
    pub run_date: Date,
}

impl AnalyzerConfig {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            risk_free_rate: RISK_FREE_RATE,
            run_date: today(),
        }
    }

    pub fn with_run_date(mut self, run_date: Date) -> Self {
        self.run_date = run_date;
        self
    }

    pub fn report_path(&self, file_name: &str) -> PathBuf {
        self.reports_dir.join(file_name)
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REPORTS_DIR)
    }
}

/// Local calendar date, or the UTC date when the local offset is unknown.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
