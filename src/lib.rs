//! Crude - commodity price series preparation.
//!
//! # Overview
//!
//! Crude loads a daily commodity price series (such as Brent crude) and a
//! log of market events from delimited text, derives returns and rolling
//! volatility, filters by date, and summarizes the result for downstream
//! modelling:
//!
//! - **Loading**: strict `01-Jan-20` dates for prices, flexible dates for events
//! - **Returns**: log and simple returns, rolling sample volatility
//! - **Filtering**: inclusive date ranges that never fail on out-of-span bounds
//! - **Summaries**: price and return moments, including skewness and kurtosis
//! - **Configuration files**: TOML-described preparation runs
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use crude::{prepare_modeling_data, summarize};
//!
//! let start = NaiveDate::from_ymd_opt(2012, 1, 1);
//! let table = prepare_modeling_data("data/BrentOilPrices.csv", start, None, true).unwrap();
//!
//! let summary = summarize(&table);
//! println!("{} observations", summary.n_observations);
//! if let Some(returns) = summary.returns_stats {
//!     println!("Return kurtosis: {:?}", returns.kurtosis);
//! }
//! ```
//!
//! # Modules
//!
//! - [`types`]: Price rows, the price table, and event records
//! - [`data`]: Price and event file loading
//! - [`transform`]: Returns, volatility, date filtering, preparation pipeline
//! - [`analytics`]: Summary statistics
//! - [`config`]: TOML configuration file support
//! - [`error`]: Error taxonomy

pub mod analytics;
pub mod config;
pub mod data;
pub mod error;
pub mod transform;
pub mod types;

pub use analytics::{summarize, DateRange, PriceStats, ReturnStats, SummaryStatistics};
pub use config::PrepConfig;
pub use data::{
    load_event_log, load_event_log_with, load_price_series, load_price_series_with,
    parse_date_flexible, DataConfig,
};
pub use error::{DataError, ErrorKind, Result};
pub use transform::{
    filter_date_range, filter_events, log_returns, prepare, prepare_events,
    prepare_modeling_data, rolling_volatility, simple_returns, with_log_returns, with_returns,
    with_simple_returns, with_volatility, DEFAULT_VOLATILITY_WINDOW,
};
pub use types::{DerivedColumns, EventRecord, PricePoint, PriceTable};
