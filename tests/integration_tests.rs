//! Integration tests for the load → filter → derive → summarize pipeline.

use chrono::NaiveDate;
use crude::analytics::summarize;
use crude::config::PrepConfig;
use crude::data::{load_event_log, load_price_series};
use crude::error::{DataError, ErrorKind};
use crude::transform::{
    filter_date_range, log_returns, prepare, prepare_events, prepare_modeling_data,
    rolling_volatility, with_log_returns, with_volatility,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).unwrap();
    write!(file, "{}", content).unwrap();
    file
}

fn sample_price_csv() -> NamedTempFile {
    write_file(
        ".csv",
        "Date,Price\n\
         01-Jan-20,60.5\n\
         02-Jan-20,61.2\n\
         03-Jan-20,59.8\n\
         04-Jan-20,62.1\n\
         05-Jan-20,63.5\n",
    )
}

/// Write `days` consecutive daily prices starting 20-May-87 with a
/// deterministic oscillation.
fn synthetic_price_csv(days: i64) -> NamedTempFile {
    let start = date(1987, 5, 20);
    let mut content = String::from("Date,Price\n");
    for i in 0..days {
        let day = start + chrono::Duration::days(i);
        let noise = ((i as f64 * 0.7).sin() * 2.0 + (i as f64 * 1.3).cos()) * 0.5;
        let price = 18.0 + i as f64 * 0.01 + noise;
        content.push_str(&format!("{},{:.2}\n", day.format("%d-%b-%y"), price));
    }
    write_file(".csv", &content)
}

#[test]
fn test_full_data_preparation() {
    let file = sample_price_csv();

    let table = load_price_series(file.path()).unwrap();
    let table = with_volatility(with_log_returns(table), 3);
    let filtered = filter_date_range(&table, Some(date(2020, 1, 2)), None);
    let summary = summarize(&filtered);

    assert_eq!(summary.n_observations, 4);
    assert!(summary.returns_stats.is_some());
    assert_eq!(summary.date_range.unwrap().start, date(2020, 1, 2));
    assert_eq!(summary.date_range.unwrap().end, date(2020, 1, 5));
}

#[test]
fn test_prepare_modeling_data_columns() {
    let file = synthetic_price_csv(60);
    let table = prepare_modeling_data(file.path(), None, None, true).unwrap();

    assert_eq!(table.len(), 60);
    let columns = table.columns();
    assert!(columns.log_returns);
    assert!(columns.simple_returns);
    assert_eq!(columns.volatility_window, Some(30));

    let vol = table.volatility().unwrap();
    assert!(vol[..30].iter().all(Option::is_none));
    assert!(vol[30..].iter().all(Option::is_some));

    let summary = summarize(&table);
    let stats = summary.returns_stats.unwrap();
    assert!(stats.skewness.is_some());
    assert!(stats.kurtosis.is_some());
}

#[test]
fn test_prepare_filters_before_deriving() {
    let file = synthetic_price_csv(60);
    let start = date(1987, 6, 1);
    let end = date(1987, 6, 10);
    let table = prepare_modeling_data(file.path(), Some(start), Some(end), true).unwrap();

    assert_eq!(table.len(), 10);
    assert_eq!(table.rows()[0].date, start);
    assert!(table.rows()[0].log_return.is_none());
    assert!(table.rows()[1].log_return.is_some());
    // Ten rows never fill a 30-observation window.
    assert!(table.volatility().unwrap().iter().all(Option::is_none));
}

#[test]
fn test_prepare_without_returns() {
    let file = sample_price_csv();
    let table = prepare_modeling_data(file.path(), None, Some(date(2020, 1, 3)), false).unwrap();

    assert_eq!(table.len(), 3);
    assert!(table.log_returns().is_none());
    assert!(summarize(&table).returns_stats.is_none());
}

#[test]
fn test_prepare_out_of_range_is_empty() {
    let file = sample_price_csv();
    let table =
        prepare_modeling_data(file.path(), Some(date(2030, 1, 1)), None, true).unwrap();

    assert!(table.is_empty());
    let summary = summarize(&table);
    assert_eq!(summary.n_observations, 0);
    assert!(summary.date_range.is_none());
}

#[test]
fn test_two_digit_years_span_centuries() {
    let file = write_file(
        ".csv",
        "Date,Price\n02-Jan-01,24.0\n20-May-87,18.63\n31-Dec-99,25.0\n",
    );
    let table = load_price_series(file.path()).unwrap();
    let dates = table.dates();

    assert_eq!(dates[0], date(1987, 5, 20));
    assert_eq!(dates[1], date(1999, 12, 31));
    assert_eq!(dates[2], date(2001, 1, 2));
}

#[test]
fn test_loader_errors() {
    let err = load_price_series("nonexistent_file.csv").unwrap_err();
    assert!(matches!(err, DataError::FileNotFound { .. }));

    let err = load_event_log("nonexistent_events.csv").unwrap_err();
    assert!(matches!(err, DataError::FileNotFound { .. }));

    let wrong = write_file(".csv", "Wrong,Columns\n1,3\n2,4\n");
    assert_eq!(load_price_series(wrong.path()).unwrap_err().kind(), ErrorKind::Schema);

    let iso = write_file(".csv", "Date,Price\n2020-01-01,60.5\n");
    assert_eq!(load_price_series(iso.path()).unwrap_err().kind(), ErrorKind::Parse);

    let err = prepare_modeling_data("nonexistent_file.csv", None, None, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);
}

#[test]
fn test_events_alongside_prices() {
    let events = write_file(
        ".csv",
        "Date,Event_Name,Category,Description,Expected_Impact\n\
         2020-03-09,Test Event 2,Geopolitical,Test description 2,Downward\n\
         2020-01-15,Test Event 1,OPEC Policy,Test description 1,Upward\n",
    );
    let loaded = load_event_log(events.path()).unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].event_name, "Test Event 1");
    assert_eq!(loaded[1].category, "Geopolitical");
}

#[test]
fn test_prepare_from_config() {
    let prices = sample_price_csv();
    let events = write_file(
        ".csv",
        "Date,Event_Name\n2019-12-31,Before\n2020-01-03,Inside\n2020-02-01,After\n",
    );

    let mut config = PrepConfig::default();
    config.data.price_file = Some(prices.path().display().to_string());
    config.data.event_file = Some(events.path().display().to_string());
    config.prepare.start_date = Some("2020-01-02".to_string());
    config.prepare.end_date = Some("2020-01-04".to_string());
    config.prepare.volatility_window = 2;

    let table = prepare(&config).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.columns().volatility_window, Some(2));
    assert_eq!(table.volatility().unwrap().iter().flatten().count(), 1);

    let kept = prepare_events(&config).unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].event_name, "Inside");
}

#[test]
fn test_prepare_from_config_file() {
    let prices = sample_price_csv();
    let config_file = write_file(
        ".toml",
        &format!(
            "[data]\nprice_file = {:?}\n\n[prepare]\ncalculate_returns = false\n",
            prices.path().display().to_string()
        ),
    );

    let config = PrepConfig::load(config_file.path()).unwrap();
    let table = prepare(&config).unwrap();
    assert_eq!(table.len(), 5);
    assert!(table.log_returns().is_none());
}

#[test]
fn test_bad_config_bound() {
    let prices = sample_price_csv();
    let mut config = PrepConfig::default();
    config.data.price_file = Some(prices.path().display().to_string());
    config.prepare.start_date = Some("next tuesday".to_string());

    assert_eq!(prepare(&config).unwrap_err().kind(), ErrorKind::Parse);
}

#[test]
fn test_volatility_from_loaded_prices() {
    let file = synthetic_price_csv(100);
    let table = load_price_series(file.path()).unwrap();
    let returns = log_returns(&table.prices());

    let vol_10 = rolling_volatility(&returns, 10);
    let vol_30 = rolling_volatility(&returns, 30);

    assert!(vol_10[8].is_none());
    assert!(vol_10[10].is_some());
    assert!(vol_10.iter().flatten().count() > vol_30.iter().flatten().count());
}
