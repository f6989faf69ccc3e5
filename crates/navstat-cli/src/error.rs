use thiserror::Error;

/// Failures that end a run before or after the per-security loop.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Analyzer(#[from] navstat_core::AnalyzerError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
