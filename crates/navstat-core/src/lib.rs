//! # Navstat Core
//!
//! NAV history retrieval, risk statistics and batch reporting for funds
//! identified by ISIN.
//!
//! ## Overview
//!
//! For every security in an input roster, the pipeline:
//!
//! - **fetches** the NAV history with bounded, jittered retries
//! - **builds** a chronologically indexed NAV series
//! - **computes** CAGR, volatility, Sharpe, Sortino, max drawdown and VaR
//! - **emits** a per-security HTML report
//!
//! and finally writes one dated CSV summary for the whole batch. A failing
//! security is logged and skipped; it never aborts the batch.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`analyzer`] | Batch orchestrator and per-security failure isolation |
//! | [`config`] | Fixed constants and orchestrator configuration |
//! | [`domain`] | ISIN, security records, NAV series, timestamps |
//! | [`error`] | Domain validation errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`nav_client`] | Retry-fetch client for NAV history |
//! | [`report`] | Per-security report emitters |
//! | [`retry`] | Attempt cap and jittered delay policy |
//! | [`roster`] | CSV roster loading |
//! | [`statistics`] | Metric computation |
//! | [`summary`] | Consolidated CSV summary |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Roster (CSV)   │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  NavAnalyzer    │────▶│ NavSource        │──▶ HttpClient (reqwest)
//! └────────┬────────┘     │ (retry + jitter) │
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ NavSeries       │────▶│ Statistics       │
//! └─────────────────┘     └────────┬─────────┘
//!                                  ▼
//!                         ┌──────────────────┐
//!                         │ ReportEmitter    │
//!                         └────────┬─────────┘
//!                                  ▼
//!                         BatchResult ──▶ <date>_report.csv
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use navstat_core::{
//!     csrf_auth, prepare_output_dir, AnalyzerConfig, HtmlReportEmitter, NavAnalyzer, NavClient,
//!     ReqwestHttpClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalyzerConfig::default();
//!     prepare_output_dir(&config)?;
//!
//!     let client = NavClient::new(Arc::new(ReqwestHttpClient::new()), csrf_auth("token"));
//!     let analyzer = NavAnalyzer::new(config, Arc::new(client), Arc::new(HtmlReportEmitter));
//!
//!     let outcome = analyzer.analyze_path("funds.csv").await?;
//!     println!("{} securities analyzed", outcome.succeeded());
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod nav_client;
pub mod report;
pub mod retry;
pub mod roster;
pub mod statistics;
pub mod summary;

// Orchestration
pub use analyzer::{
    prepare_output_dir, AnalyzerError, BatchOutcome, NavAnalyzer, PipelineError, SecurityFailure,
    SecurityStage,
};

// Configuration
pub use config::AnalyzerConfig;

// Domain models
pub use domain::{Isin, NavPoint, NavSeries, SecurityRecord, SeriesError, UtcDateTime};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Fetching
pub use nav_client::{csrf_auth, FetchError, FetchErrorKind, NavClient, NavPayload, NavSource};

// Reporting
pub use report::{HtmlReportEmitter, ReportEmitter, ReportError, ReportRequest};

// Retry logic
pub use retry::{RetryPolicy, Retryable};

// Roster and summary
pub use roster::{Roster, RosterError};
pub use statistics::{compute_metrics, MetricSet, StatisticsError};
pub use summary::{BatchResult, ResultRow, SummaryError};
