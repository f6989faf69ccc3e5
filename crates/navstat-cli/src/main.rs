mod cli;
mod error;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use navstat_core::analyzer::error_chain;
use navstat_core::{
    csrf_auth, prepare_output_dir, AnalyzerConfig, HtmlReportEmitter, NavAnalyzer, NavClient,
    ReqwestHttpClient,
};
use tracing::error;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = logging::init() {
        eprintln!("error: {error}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %error_chain(&err), "run aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AnalyzerConfig::default();
    prepare_output_dir(&config)?;

    let client = NavClient::new(Arc::new(ReqwestHttpClient::new()), csrf_auth(cli.csrf_token));
    let analyzer = NavAnalyzer::new(config, Arc::new(client), Arc::new(HtmlReportEmitter));

    let outcome = analyzer.analyze_path(&cli.csv_path).await?;
    if !outcome.failures.is_empty() {
        tracing::warn!(
            failed = outcome.failures.len(),
            succeeded = outcome.succeeded(),
            "some securities were skipped, see errors above"
        );
    }

    Ok(())
}
