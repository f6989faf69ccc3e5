//! Per-security report artifacts.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::statistics::MetricSet;
use crate::{Isin, NavSeries};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot render report for an empty nav series")]
    EmptySeries,
}

/// Everything an emitter gets to see for one security.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest<'a> {
    pub series: &'a NavSeries,
    pub metrics: &'a MetricSet,
    pub title: &'a str,
    pub output: &'a Path,
}

/// Renders a single security's analysis to `request.output`.
pub trait ReportEmitter: Send + Sync {
    fn emit(&self, request: &ReportRequest<'_>) -> Result<PathBuf, ReportError>;
}

/// File name of the per-security report.
///
/// Path separators in the identifier become `_` so the report always lands
/// directly inside the reports directory.
pub fn report_file_name(isin: &Isin) -> String {
    let stem: String = isin
        .as_str()
        .chars()
        .map(|ch| if matches!(ch, '/' | '\\') { '_' } else { ch })
        .collect();
    format!("{stem}_report.html")
}

/// Title shown at the top of a report.
pub fn report_title(display_name: &str) -> String {
    format!("{display_name} Analysis")
}

/// Self-contained HTML page with the metric table and the NAV history.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlReportEmitter;

impl HtmlReportEmitter {
    pub fn render(&self, request: &ReportRequest<'_>) -> Result<String, ReportError> {
        let (Some(first), Some(last)) = (request.series.first(), request.series.last()) else {
            return Err(ReportError::EmptySeries);
        };

        let title = escape_html(request.title);
        let mut html = String::with_capacity(4096 + request.series.len() * 96);

        // Writing into a String cannot fail.
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>\n\
             body {{ font-family: sans-serif; margin: 2rem; }}\n\
             table {{ border-collapse: collapse; margin-bottom: 2rem; }}\n\
             th, td {{ border: 1px solid #ccc; padding: 0.25rem 0.75rem; text-align: right; }}\n\
             th {{ background: #f4f4f4; }}\n\
             </style>\n</head>\n<body>\n<h1>{title}</h1>\n\
             <p>{} observations from {} to {}</p>\n",
            request.series.len(),
            first.at.date(),
            last.at.date(),
        );

        html.push_str("<h2>Key Metrics</h2>\n<table>\n<tr><th>Metric</th><th>Value</th></tr>\n");
        for (name, value) in request.metrics.named() {
            let _ = writeln!(html, "<tr><td>{name}</td><td>{value:.6}</td></tr>");
        }
        html.push_str("</table>\n");

        html.push_str(
            "<h2>NAV History</h2>\n<table>\n<tr><th>Date</th><th>NAV</th><th>Drawdown</th></tr>\n",
        );
        let mut peak = f64::MIN;
        for point in request.series.points() {
            peak = peak.max(point.value);
            let drawdown = if peak > 0.0 { point.value / peak - 1.0 } else { 0.0 };
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{:.4}</td><td>{:.2}%</td></tr>",
                point.at.date(),
                point.value,
                drawdown * 100.0
            );
        }
        html.push_str("</table>\n</body>\n</html>\n");

        Ok(html)
    }
}

impl ReportEmitter for HtmlReportEmitter {
    fn emit(&self, request: &ReportRequest<'_>) -> Result<PathBuf, ReportError> {
        let html = self.render(request)?;
        fs::write(request.output, html).map_err(|source| ReportError::Io {
            path: request.output.to_path_buf(),
            source,
        })?;

        debug!(path = %request.output.display(), "wrote html report");
        Ok(request.output.to_path_buf())
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
