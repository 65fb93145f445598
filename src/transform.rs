//! Return and volatility derivation, and date-range filtering.
//!
//! All functions are pure: they take a price or return column and produce
//! a new column of the same length, with `None` where the value is
//! undefined.

use crate::config::PrepConfig;
use crate::data::{
    load_event_log_with, load_price_series, load_price_series_with, parse_date_flexible,
};
use crate::error::{DataError, Result};
use crate::types::{EventRecord, PricePoint, PriceTable};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{debug, info};

/// Window used for the volatility column of [`prepare_modeling_data`].
pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;

/// Apply `f(previous, current)` to each consecutive pair of defined prices.
fn pairwise<F>(prices: &[Option<f64>], f: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    let mut out = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(prices.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(curr)) => Some(f(prev, curr)),
        _ => None,
    }));
    out
}

/// Log returns: `ln(p[i]) - ln(p[i-1])`, with element 0 undefined.
///
/// Non-positive prices are not guarded and yield NaN or infinities.
pub fn log_returns(prices: &[Option<f64>]) -> Vec<Option<f64>> {
    pairwise(prices, |prev, curr| curr.ln() - prev.ln())
}

/// Simple returns: `(p[i] - p[i-1]) / p[i-1]`, with element 0 undefined.
pub fn simple_returns(prices: &[Option<f64>]) -> Vec<Option<f64>> {
    pairwise(prices, |prev, curr| (curr - prev) / prev)
}

/// Sample standard deviation (N-1) of a window with no undefined values.
fn window_std(window: &[Option<f64>]) -> Option<f64> {
    let values: Vec<f64> = window
        .iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect::<Option<Vec<f64>>>()?;

    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Rolling sample standard deviation over a trailing window.
///
/// Position `i` is defined only when `returns[i + 1 - window ..= i]` holds
/// `window` defined, finite values. A single undefined value makes every
/// window containing it undefined.
pub fn rolling_volatility(returns: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; returns.len()];
    if window == 0 || returns.len() < window {
        return out;
    }

    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        *slot = window_std(&returns[i + 1 - window..=i]);
    }
    out
}

/// Attach the log-return column computed from the table's prices.
pub fn with_log_returns(table: PriceTable) -> PriceTable {
    let returns = log_returns(&table.prices());
    let mut columns = table.columns();
    columns.log_returns = true;

    let rows = table
        .into_rows()
        .into_iter()
        .zip(returns)
        .map(|(row, r)| PricePoint {
            log_return: r,
            ..row
        })
        .collect();
    PriceTable::with_columns(rows, columns)
}

/// Attach the simple-return column computed from the table's prices.
pub fn with_simple_returns(table: PriceTable) -> PriceTable {
    let returns = simple_returns(&table.prices());
    let mut columns = table.columns();
    columns.simple_returns = true;

    let rows = table
        .into_rows()
        .into_iter()
        .zip(returns)
        .map(|(row, r)| PricePoint {
            simple_return: r,
            ..row
        })
        .collect();
    PriceTable::with_columns(rows, columns)
}

/// Attach a rolling volatility column over the log returns, deriving the
/// log returns first if the table does not carry them.
pub fn with_volatility(table: PriceTable, window: usize) -> PriceTable {
    let table = if table.columns().log_returns {
        table
    } else {
        with_log_returns(table)
    };

    let returns: Vec<Option<f64>> = table.rows().iter().map(|r| r.log_return).collect();
    let vol = rolling_volatility(&returns, window);
    let mut columns = table.columns();
    columns.volatility_window = Some(window);

    let rows = table
        .into_rows()
        .into_iter()
        .zip(vol)
        .map(|(row, v)| PricePoint {
            volatility: v,
            ..row
        })
        .collect();
    PriceTable::with_columns(rows, columns)
}

/// Attach log returns, simple returns and volatility over `window`.
pub fn with_returns(table: PriceTable, window: usize) -> PriceTable {
    with_volatility(with_simple_returns(with_log_returns(table)), window)
}

/// Keep rows with `start <= date <= end`. A missing bound is unbounded.
///
/// Row order and derived columns are carried over unchanged; a range
/// outside the data gives an empty table.
pub fn filter_date_range(
    table: &PriceTable,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> PriceTable {
    let rows: Vec<PricePoint> = table
        .rows()
        .iter()
        .filter(|r| start.map_or(true, |s| r.date >= s))
        .filter(|r| end.map_or(true, |e| r.date <= e))
        .cloned()
        .collect();

    debug!(
        "Date filter {:?}..={:?} kept {} of {} rows",
        start,
        end,
        rows.len(),
        table.len()
    );
    PriceTable::with_columns(rows, table.columns())
}

fn finish_preparation(
    table: PriceTable,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    calculate_returns: bool,
    window: usize,
) -> PriceTable {
    let table = if start.is_some() || end.is_some() {
        filter_date_range(&table, start, end)
    } else {
        table
    };

    let table = if calculate_returns {
        with_returns(table, window)
    } else {
        table
    };

    info!(
        "Prepared {} rows (returns: {})",
        table.len(),
        calculate_returns
    );
    table
}

/// Load, optionally filter, and optionally derive returns and 30-day
/// volatility.
///
/// Returns are computed after filtering, so the first row of the result
/// always has undefined returns.
pub fn prepare_modeling_data(
    path: impl AsRef<Path>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    calculate_returns: bool,
) -> Result<PriceTable> {
    let table = load_price_series(path)?;
    Ok(finish_preparation(
        table,
        start,
        end,
        calculate_returns,
        DEFAULT_VOLATILITY_WINDOW,
    ))
}

fn parse_bound(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| parse_date_flexible(s).map(|dt| dt.date()))
        .transpose()
}

/// Run the preparation pipeline described by a configuration.
pub fn prepare(config: &PrepConfig) -> Result<PriceTable> {
    let path = config
        .data
        .price_file
        .as_deref()
        .ok_or_else(|| DataError::ConfigError("data.price_file is not set".to_string()))?;

    let start = parse_bound(config.prepare.start_date.as_deref())?;
    let end = parse_bound(config.prepare.end_date.as_deref())?;

    let table = load_price_series_with(path, &config.data_config())?;
    Ok(finish_preparation(
        table,
        start,
        end,
        config.prepare.calculate_returns,
        config.prepare.volatility_window,
    ))
}

/// Keep events dated within `start ..= end` (compared by calendar day).
pub fn filter_events(
    events: &[EventRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<EventRecord> {
    events
        .iter()
        .filter(|e| start.map_or(true, |s| e.date.date() >= s))
        .filter(|e| end.map_or(true, |d| e.date.date() <= d))
        .cloned()
        .collect()
}

/// Load the configured event log, restricted to the configured date range.
///
/// Returns an empty list when no event file is configured.
pub fn prepare_events(config: &PrepConfig) -> Result<Vec<EventRecord>> {
    let Some(path) = config.data.event_file.as_deref() else {
        return Ok(Vec::new());
    };

    let start = parse_bound(config.prepare.start_date.as_deref())?;
    let end = parse_bound(config.prepare.end_date.as_deref())?;

    let events = load_event_log_with(path, &config.data_config())?;
    Ok(filter_events(&events, start, end))
}
