//! Core data types: price rows, the price table, and event records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single daily observation with optional derived columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// `None` when the source cell was empty or a missing-value marker.
    pub price: Option<f64>,
    pub log_return: Option<f64>,
    pub simple_return: Option<f64>,
    pub volatility: Option<f64>,
}

impl PricePoint {
    /// Create a row with no derived values.
    pub fn new(date: NaiveDate, price: Option<f64>) -> Self {
        Self {
            date,
            price,
            log_return: None,
            simple_return: None,
            volatility: None,
        }
    }

    /// Whether the price cell is missing or NaN.
    pub fn is_missing(&self) -> bool {
        self.price.map_or(true, f64::is_nan)
    }
}

/// Which derived columns a [`PriceTable`] carries.
///
/// Presence is independent of values: a present column may hold only
/// undefined entries (e.g. a one-row table).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedColumns {
    pub log_returns: bool,
    pub simple_returns: bool,
    /// Window length of the volatility column, if present.
    pub volatility_window: Option<usize>,
}

/// Date-indexed price table, sorted non-decreasing by date after loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    rows: Vec<PricePoint>,
    columns: DerivedColumns,
}

impl PriceTable {
    /// Build a table from rows with no derived columns.
    pub fn new(rows: Vec<PricePoint>) -> Self {
        Self {
            rows,
            columns: DerivedColumns::default(),
        }
    }

    /// Build a table from (date, price) pairs.
    pub fn from_prices<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            prices
                .into_iter()
                .map(|(date, price)| PricePoint::new(date, Some(price)))
                .collect(),
        )
    }

    pub(crate) fn with_columns(rows: Vec<PricePoint>, columns: DerivedColumns) -> Self {
        Self { rows, columns }
    }

    pub fn rows(&self) -> &[PricePoint] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<PricePoint> {
        self.rows
    }

    pub fn columns(&self) -> DerivedColumns {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn prices(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.price).collect()
    }

    /// Log return column, or `None` if the column has not been derived.
    pub fn log_returns(&self) -> Option<Vec<Option<f64>>> {
        self.columns
            .log_returns
            .then(|| self.rows.iter().map(|r| r.log_return).collect())
    }

    /// Simple return column, or `None` if the column has not been derived.
    pub fn simple_returns(&self) -> Option<Vec<Option<f64>>> {
        self.columns
            .simple_returns
            .then(|| self.rows.iter().map(|r| r.simple_return).collect())
    }

    /// Volatility column, or `None` if the column has not been derived.
    pub fn volatility(&self) -> Option<Vec<Option<f64>>> {
        self.columns
            .volatility_window
            .map(|_| self.rows.iter().map(|r| r.volatility).collect())
    }

    /// First and last date. Assumes the table is sorted.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date, self.rows.last()?.date))
    }
}

/// A market event annotation from the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub date: NaiveDateTime,
    pub event_name: String,
    pub category: String,
    pub description: String,
    pub expected_impact: String,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.date.date(),
            self.category,
            self.event_name
        )
    }
}
