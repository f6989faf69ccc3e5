//! Risk and return statistics over a NAV series.
//!
//! Moments and the normal quantile come from `statrs`; this module only
//! shapes the series into periodic returns and applies the annualization
//! conventions (252 periods per year, 365-day years for growth).

use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::config::{PERIODS_PER_YEAR, VAR_CONFIDENCE};
use crate::{NavSeries, UtcDateTime};

/// Observations needed for a sample standard deviation of returns.
pub const MIN_OBSERVATIONS: usize = 3;

/// Summary column names, in output order.
pub const METRIC_NAMES: [&str; 6] = [
    "cagr",
    "volatility",
    "sharpe",
    "sortino",
    "max_drawdown",
    "value_at_risk",
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatisticsError {
    #[error("need at least {required} nav observations, found {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("nav value {value} at {at} is not positive")]
    NonPositiveValue { at: UtcDateTime, value: f64 },
    #[error("nav series spans less than one day")]
    ZeroSpan,
    #[error("distribution rejected parameters: {0}")]
    Distribution(String),
}

/// Fixed metric set computed per security.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSet {
    pub cagr: f64,
    pub volatility: f64,
    pub sharpe: f64,
    pub sortino: f64,
    /// Largest peak-to-trough decline, as a non-positive fraction.
    pub max_drawdown: f64,
    /// One-period parametric loss quantile at 95% confidence.
    pub value_at_risk: f64,
}

impl MetricSet {
    pub fn named(&self) -> [(&'static str, f64); 6] {
        [
            (METRIC_NAMES[0], self.cagr),
            (METRIC_NAMES[1], self.volatility),
            (METRIC_NAMES[2], self.sharpe),
            (METRIC_NAMES[3], self.sortino),
            (METRIC_NAMES[4], self.max_drawdown),
            (METRIC_NAMES[5], self.value_at_risk),
        ]
    }
}

/// Compute every metric for `series` with the given annual risk-free rate.
pub fn compute_metrics(series: &NavSeries, risk_free_rate: f64) -> Result<MetricSet, StatisticsError> {
    if series.len() < MIN_OBSERVATIONS {
        return Err(StatisticsError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: series.len(),
        });
    }
    if let Some(point) = series.points().iter().find(|point| point.value <= 0.0) {
        return Err(StatisticsError::NonPositiveValue {
            at: point.at,
            value: point.value,
        });
    }

    let prices = series.values();
    let returns = period_returns(&prices);

    Ok(MetricSet {
        cagr: cagr(series)?,
        volatility: volatility(&returns),
        sharpe: sharpe(&returns, risk_free_rate),
        sortino: sortino(&returns, risk_free_rate),
        max_drawdown: max_drawdown(&prices),
        value_at_risk: value_at_risk(&returns, VAR_CONFIDENCE)?,
    })
}

/// Simple returns between consecutive observations.
///
/// `n` prices give `n - 1` returns. There is no leading zero return for the
/// first observation, so dispersion-based metrics are computed over real
/// price moves only and differ slightly from tools that pad that slot with 0.
pub fn period_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect()
}

fn cagr(series: &NavSeries) -> Result<f64, StatisticsError> {
    let (Some(first), Some(last), Some(span)) = (series.first(), series.last(), series.span()) else {
        return Err(StatisticsError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: series.len(),
        });
    };

    let days = span.whole_days();
    if days <= 0 {
        return Err(StatisticsError::ZeroSpan);
    }
    let years = days as f64 / 365.0;

    Ok((last.value / first.value).powf(1.0 / years) - 1.0)
}

fn volatility(returns: &[f64]) -> f64 {
    returns.std_dev() * PERIODS_PER_YEAR.sqrt()
}

fn per_period_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / PERIODS_PER_YEAR) - 1.0
}

fn sharpe(returns: &[f64], risk_free_rate: f64) -> f64 {
    // Excess returns share the raw returns' dispersion.
    let std = returns.std_dev();
    if std == 0.0 {
        return 0.0;
    }
    let excess_mean = returns.mean() - per_period_rate(risk_free_rate);
    excess_mean / std * PERIODS_PER_YEAR.sqrt()
}

fn sortino(returns: &[f64], risk_free_rate: f64) -> f64 {
    let rf = per_period_rate(risk_free_rate);
    let excess: Vec<f64> = returns.iter().map(|r| r - rf).collect();

    let downside_sq: f64 = excess.iter().filter(|r| **r < 0.0).map(|r| r * r).sum();
    let downside = (downside_sq / excess.len() as f64).sqrt();
    if downside == 0.0 {
        return 0.0;
    }
    excess.mean() / downside * PERIODS_PER_YEAR.sqrt()
}

fn max_drawdown(prices: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for &price in prices {
        peak = peak.max(price);
        worst = worst.min(price / peak - 1.0);
    }
    worst
}

fn value_at_risk(returns: &[f64], confidence: f64) -> Result<f64, StatisticsError> {
    let mean = returns.mean();
    let std = returns.std_dev();
    if std == 0.0 {
        return Ok(mean);
    }

    let normal = Normal::new(mean, std).map_err(|e| StatisticsError::Distribution(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - confidence))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    fn daily(values: &[f64]) -> NavSeries {
        NavSeries::from_pairs(values.iter().enumerate().map(|(i, v)| {
            (
                UtcDateTime::from_unix_seconds(1_700_000_000 + i as i64 * DAY).expect("valid ts"),
                *v,
            )
        }))
    }

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "actual={actual}, expected={expected}"
        );
    }

    #[test]
    fn flat_series_has_no_growth_volatility_or_drawdown() {
        let metrics = compute_metrics(&daily(&[10.0; 30]), 0.03).expect("metrics");

        assert_eq!(metrics.cagr, 0.0);
        assert_eq!(metrics.volatility, 0.0);
        assert_eq!(metrics.max_drawdown, 0.0);
        assert_eq!(metrics.sharpe, 0.0);
        assert_eq!(metrics.value_at_risk, 0.0);
        assert!(metrics.sortino < 0.0, "flat nav trails the risk-free rate");
    }

    #[test]
    fn cagr_annualizes_over_calendar_span() {
        let start = UtcDateTime::from_unix_seconds(0).expect("valid ts");
        let mid = UtcDateTime::from_unix_seconds(200 * DAY).expect("valid ts");
        let end = UtcDateTime::from_unix_seconds(730 * DAY).expect("valid ts");
        let series = NavSeries::from_pairs([(start, 100.0), (mid, 90.0), (end, 121.0)]);

        let metrics = compute_metrics(&series, 0.03).expect("metrics");
        approx(metrics.cagr, 0.1);
    }

    #[test]
    fn drawdown_measures_largest_peak_to_trough_decline() {
        let metrics = compute_metrics(&daily(&[100.0, 120.0, 90.0, 110.0, 60.0, 130.0]), 0.03)
            .expect("metrics");
        approx(metrics.max_drawdown, 60.0 / 120.0 - 1.0);
    }

    #[test]
    fn returns_skip_the_undefined_first_period() {
        let returns = period_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        approx(returns[0], 0.1);
        approx(returns[1], -0.1);
    }

    #[test]
    fn volatility_is_annualized_sample_deviation() {
        let prices = [100.0, 101.0, 100.0, 102.0];
        let returns = period_returns(&prices);
        let mean = returns.iter().sum::<f64>() / 3.0;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 2.0;

        let metrics = compute_metrics(&daily(&prices), 0.03).expect("metrics");
        approx(metrics.volatility, var.sqrt() * 252f64.sqrt());
    }

    #[test]
    fn sharpe_uses_per_period_risk_free_rate() {
        let prices = [100.0, 101.0, 100.5, 102.0, 103.0];
        let returns = period_returns(&prices);
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let std = returns.std_dev();
        let rf = 1.03f64.powf(1.0 / 252.0) - 1.0;

        let metrics = compute_metrics(&daily(&prices), 0.03).expect("metrics");
        approx(metrics.sharpe, (mean - rf) / std * 252f64.sqrt());
    }

    #[test]
    fn sortino_penalizes_only_downside() {
        let metrics = compute_metrics(&daily(&[100.0, 105.0, 110.0, 120.0]), 0.0).expect("metrics");
        assert_eq!(metrics.sortino, 0.0, "no downside deviation without losses");

        let metrics = compute_metrics(&daily(&[100.0, 110.0, 99.0, 120.0]), 0.0).expect("metrics");
        assert!(metrics.sortino > metrics.sharpe);
    }

    #[test]
    fn value_at_risk_is_lower_tail_quantile() {
        let prices = [100.0, 102.0, 99.0, 103.0, 98.0, 104.0];
        let returns = period_returns(&prices);
        let metrics = compute_metrics(&daily(&prices), 0.03).expect("metrics");

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        assert!(metrics.value_at_risk < mean);
        let z = (metrics.value_at_risk - mean) / returns.std_dev();
        assert!((z + 1.6448536).abs() < 1e-5, "z={z}");
    }

    #[test]
    fn metrics_follow_chronology_not_input_order() {
        let t = |d: i64| UtcDateTime::from_unix_seconds(d * DAY).expect("valid ts");
        let shuffled = NavSeries::from_pairs([(t(400), 80.0), (t(0), 100.0), (t(200), 120.0)]);

        let metrics = compute_metrics(&shuffled, 0.03).expect("metrics");
        approx(metrics.max_drawdown, 80.0 / 120.0 - 1.0);
        assert!(metrics.cagr < 0.0);
    }

    #[test]
    fn rejects_short_series() {
        let err = compute_metrics(&daily(&[10.0, 11.0]), 0.03).expect_err("must fail");
        assert_eq!(
            err,
            StatisticsError::InsufficientData {
                required: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn rejects_non_positive_nav() {
        let err = compute_metrics(&daily(&[10.0, 0.0, 11.0]), 0.03).expect_err("must fail");
        assert!(matches!(err, StatisticsError::NonPositiveValue { value, .. } if value == 0.0));
    }

    #[test]
    fn rejects_intraday_span() {
        let t = |s: i64| UtcDateTime::from_unix_seconds(s).expect("valid ts");
        let series = NavSeries::from_pairs([(t(0), 10.0), (t(60), 10.5), (t(120), 10.2)]);

        let err = compute_metrics(&series, 0.03).expect_err("must fail");
        assert_eq!(err, StatisticsError::ZeroSpan);
    }

    #[test]
    fn named_metrics_follow_column_order() {
        let metrics = compute_metrics(&daily(&[10.0, 10.5, 10.2, 10.8]), 0.03).expect("metrics");
        let names: Vec<&str> = metrics.named().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, METRIC_NAMES.to_vec());
    }
}
