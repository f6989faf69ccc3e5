//! CLI argument definitions for navstat.
//!
//! # Options
//!
//! | Option | Description |
//! |--------|-------------|
//! | `--csv-path` | Roster CSV with an `isin` column |
//! | `--csrf-token` | Token sent as `X-CSRFToken` to the NAV host |
//!
//! Reports and the dated summary are written to `./reports`.
//!
//! # Examples
//!
//! ```bash
//! navstat --csv-path funds.csv --csrf-token "$CSRF_TOKEN"
//!
//! # More detail on retries
//! RUST_LOG=navstat_core=debug navstat --csv-path funds.csv --csrf-token "$CSRF_TOKEN"
//! ```

use std::path::PathBuf;

use clap::Parser;

/// Analyze NAV history for mutual funds.
///
/// Fetches the NAV series of every ISIN in the roster, computes risk and
/// return statistics, writes one HTML report per fund and a dated CSV
/// summary of all funds that were analyzed successfully.
#[derive(Debug, Parser)]
#[command(name = "navstat", author, version, about = "Analyze NAV data for mutual funds")]
pub struct Cli {
    /// Path to input CSV file containing ISIN data.
    #[arg(long)]
    pub csv_path: PathBuf,

    /// CSRF token for API authentication.
    #[arg(long)]
    pub csrf_token: String,
}
