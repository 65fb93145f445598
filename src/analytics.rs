//! Descriptive statistics over a prepared price table.

use crate::error::Result;
use crate::types::PriceTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// First and last date of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Moments of the price column over non-missing values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Sample standard deviation (N-1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Moments of the log-return column over defined values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnStats {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    /// Adjusted Fisher-Pearson skewness (G1).
    pub skewness: Option<f64>,
    /// Bias-corrected excess kurtosis (G2).
    pub kurtosis: Option<f64>,
}

/// Snapshot summary of a price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub n_observations: usize,
    pub date_range: Option<DateRange>,
    pub price_stats: PriceStats,
    pub missing_values: usize,
    /// Present only when the table carries a log-return column.
    pub returns_stats: Option<ReturnStats>,
}

impl SummaryStatistics {
    /// Export as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; the average of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample standard deviation (N-1). Needs at least two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Sums of powered deviations below this are rounding noise.
const FP_NOISE: f64 = 1e-14;

fn zero_out_noise(sum: f64) -> f64 {
    if sum.abs() < FP_NOISE {
        0.0
    } else {
        sum
    }
}

/// Second, third and fourth central moments (biased, divided by N).
///
/// A series that is constant up to rounding reports exactly zero moments.
fn central_moments(values: &[f64]) -> Option<(f64, f64, f64)> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(a, b, c), x| {
        let d = x - m;
        let d2 = d * d;
        (a + d2, b + d2 * d, c + d2 * d2)
    });
    Some((
        zero_out_noise(m2) / n,
        zero_out_noise(m3) / n,
        zero_out_noise(m4) / n,
    ))
}

/// Adjusted Fisher-Pearson skewness G1. Needs at least three values.
///
/// A constant series has zero skewness.
pub fn skewness(values: &[f64]) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }
    let n = values.len() as f64;
    let (m2, m3, _) = central_moments(values)?;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let g1 = m3 / m2.powf(1.5);
    Some((n * (n - 1.0)).sqrt() / (n - 2.0) * g1)
}

/// Bias-corrected excess kurtosis G2. Needs at least four values.
///
/// A constant series has zero excess kurtosis.
pub fn kurtosis(values: &[f64]) -> Option<f64> {
    if values.len() < 4 {
        return None;
    }
    let n = values.len() as f64;
    let (m2, _, m4) = central_moments(values)?;
    if m2 == 0.0 {
        return Some(0.0);
    }
    let g2 = m4 / (m2 * m2);
    Some((n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 - 3.0 * (n - 1.0)))
}

fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Summarize a price table.
///
/// Missing prices are excluded from the price moments and counted in
/// `missing_values`. Return moments skip undefined and NaN log returns;
/// infinite returns (from a zero price) are kept and carry into the moments.
pub fn summarize(table: &PriceTable) -> SummaryStatistics {
    let prices: Vec<f64> = table
        .rows()
        .iter()
        .filter(|r| !r.is_missing())
        .filter_map(|r| r.price)
        .collect();
    let missing_values = table.len() - prices.len();

    let date_range = table
        .rows()
        .iter()
        .map(|r| r.date)
        .min()
        .zip(table.rows().iter().map(|r| r.date).max())
        .map(|(start, end)| DateRange { start, end });

    let price_stats = PriceStats {
        mean: mean(&prices),
        median: median(&prices),
        std: sample_std(&prices),
        min: min(&prices),
        max: max(&prices),
    };

    let returns_stats = table.log_returns().map(|column| {
        let returns: Vec<f64> = column
            .into_iter()
            .flatten()
            .filter(|r| !r.is_nan())
            .collect();
        ReturnStats {
            mean: mean(&returns),
            std: sample_std(&returns),
            skewness: skewness(&returns),
            kurtosis: kurtosis(&returns),
        }
    });

    SummaryStatistics {
        n_observations: table.len(),
        date_range,
        price_stats,
        missing_values,
        returns_stats,
    }
}
