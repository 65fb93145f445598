//! Loading of the price series and the event log from delimited text.
//!
//! Price dates are parsed strictly (`01-Jan-20`), event dates with a
//! flexible multi-format parser. Both loaders sort their output by date
//! with a stable sort, so rows sharing a date keep their file order.

use crate::error::{DataError, Result};
use crate::types::{EventRecord, PricePoint, PriceTable};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Date format used by the price file, e.g. `01-Jan-20`.
pub const PRICE_DATE_FORMAT: &str = "%d-%b-%y";

const DATE_COLUMNS: [&str; 3] = ["Date", "date", "DATE"];
const PRICE_COLUMNS: [&str; 3] = ["Price", "price", "PRICE"];

/// Cell values read as a missing price.
const MISSING_MARKERS: [&str; 6] = ["", "nan", "na", "n/a", "null", "none"];

const EVENT_NAME_COLUMNS: [&str; 2] = ["Event_Name", "event_name"];
const CATEGORY_COLUMNS: [&str; 2] = ["Category", "category"];
const DESCRIPTION_COLUMNS: [&str; 2] = ["Description", "description"];
const IMPACT_COLUMNS: [&str; 2] = ["Expected_Impact", "expected_impact"];

/// Loader options.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Field delimiter. If None, the delimiter is auto-detected.
    pub delimiter: Option<u8>,
    /// Strict date format for the price file.
    pub price_date_format: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            price_date_format: PRICE_DATE_FORMAT.to_string(),
        }
    }
}

/// Detect the delimiter by analyzing the first few lines of the file.
///
/// Tries comma, tab, semicolon and pipe, and returns the one that gives the
/// most consistent field count (at least two fields) across lines.
fn detect_delimiter(path: &Path) -> Result<u8> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let lines: Vec<String> = reader
        .lines()
        .take(5)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Ok(b',');
    }

    let delimiters = [b',', b'\t', b';', b'|'];

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in &delimiters {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| line.as_bytes().iter().filter(|&&b| b == delim).count() + 1)
            .collect();

        let first_count = counts[0];
        let all_consistent = counts.iter().all(|&c| c == first_count);

        if all_consistent && first_count >= 2 && first_count > best_score {
            best_score = first_count;
            best_delimiter = delim;
        }
    }

    // Quoted fields can break consistency; fall back to the header line.
    if best_score == 0 {
        for &delim in &delimiters {
            if lines[0].as_bytes().contains(&delim) {
                debug!("Falling back to header delimiter {:?}", delim as char);
                return Ok(delim);
            }
        }
    }

    debug!(
        "Detected delimiter {:?} with {} fields",
        best_delimiter as char, best_score
    );
    Ok(best_delimiter)
}

/// Open a delimited file after checking that it exists.
fn open_reader(path: &Path, config: &DataConfig) -> Result<Reader<File>> {
    if !path.exists() {
        return Err(DataError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let delimiter = match config.delimiter {
        Some(d) => d,
        None => detect_delimiter(path)?,
    };

    let reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;
    Ok(reader)
}

/// Position of the first header matching any accepted spelling.
fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| names.contains(&h))
}

/// Resolve every required column (matched against any of its accepted
/// spellings) to its header position.
fn require_columns(
    path: &Path,
    headers: &StringRecord,
    required: &[&[&str]],
) -> Result<Vec<usize>> {
    let mut indices = Vec::with_capacity(required.len());
    let mut missing = Vec::new();

    for names in required {
        match find_column(headers, names) {
            Some(idx) => indices.push(idx),
            None => missing.push(names[0].to_string()),
        }
    }

    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(DataError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        })
    }
}

/// Field at `idx`, or empty when the row stops short of it.
fn field(record: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).unwrap_or("")
}

/// Parse a price date under a strict format.
fn parse_price_date(s: &str, format: &str, row: usize) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, format).map_err(|_| DataError::DateParse {
        row,
        value: s.to_string(),
        expected: format.to_string(),
    })
}

/// Parse a price cell. Missing markers give `None`.
fn parse_price(s: &str, row: usize) -> Result<Option<f64>> {
    let lowered = s.to_ascii_lowercase();
    if MISSING_MARKERS.contains(&lowered.as_str()) {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|_| DataError::InvalidValue {
            row,
            column: "Price".to_string(),
            value: s.to_string(),
        })
}

/// `%Y` also accepts one or two digits; those are two-digit years and
/// belong to a `%y` format further down the list.
fn has_full_year(fmt: &str, year: i32) -> bool {
    !fmt.contains("%Y") || year >= 1000
}

/// Parse a date string with multiple format attempts.
///
/// Accepts ISO dates and date-times, slash/dash separated day-month orders,
/// named-month forms, and Unix timestamps in seconds. Date-only inputs are
/// placed at midnight.
pub fn parse_date_flexible(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y/%m/%d %H:%M:%S",
        "%d-%m-%Y %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];

    for fmt in &datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            if has_full_year(fmt, dt.year()) {
                return Ok(dt);
            }
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }

    // Month-first wins over day-first for ambiguous slash dates.
    let date_formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%Y%m%d",
        "%m/%d/%y",
        "%m/%d/%Y",
        "%d/%m/%y",
        "%d/%m/%Y",
        "%d-%m-%y",
        "%d-%m-%Y",
        "%d-%b-%y",
        "%d-%b-%Y",
        "%d %b %Y",
        "%d %B %Y",
        "%b %d, %Y",
        "%B %d, %Y",
    ];

    for fmt in &date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if has_full_year(fmt, d.year()) {
                return Ok(d.and_time(NaiveTime::MIN));
            }
        }
    }

    // Short digit strings are more likely years or compact dates than epochs.
    if s.len() >= 9 {
        if let Ok(ts) = s.parse::<i64>() {
            if let Some(dt) = DateTime::from_timestamp(ts, 0) {
                return Ok(dt.naive_utc());
            }
        }
    }

    Err(DataError::DateParse {
        row: 0,
        value: s.to_string(),
        expected: "a recognised date format".to_string(),
    })
}

/// Load the price series with default options.
pub fn load_price_series(path: impl AsRef<Path>) -> Result<PriceTable> {
    load_price_series_with(path, &DataConfig::default())
}

/// Load the price series.
///
/// Fails with [`DataError::FileNotFound`] if the path does not exist,
/// [`DataError::MissingColumns`] if `Date` or `Price` is absent, and
/// [`DataError::DateParse`] on the first date not matching
/// `config.price_date_format`.
pub fn load_price_series_with(path: impl AsRef<Path>, config: &DataConfig) -> Result<PriceTable> {
    let path = path.as_ref();
    info!("Loading prices from: {}", path.display());

    let mut reader = open_reader(path, config)?;
    let headers = reader.headers()?.clone();
    let indices = require_columns(path, &headers, &[&DATE_COLUMNS[..], &PRICE_COLUMNS[..]])?;
    let (date_idx, price_idx) = (Some(indices[0]), Some(indices[1]));

    let mut rows = Vec::new();
    let mut missing = 0;

    for (idx, result) in reader.records().enumerate() {
        let row_num = idx + 1;
        let record = result?;

        let date = parse_price_date(field(&record, date_idx), &config.price_date_format, row_num)?;
        // A row that stops before the price column reads as a missing price.
        let price = parse_price(field(&record, price_idx), row_num)?;
        if price.is_none() {
            missing += 1;
        }

        rows.push(PricePoint::new(date, price));
    }

    // Vec::sort_by_key is stable, so equal dates keep file order.
    rows.sort_by_key(|r| r.date);

    if missing > 0 {
        warn!("{} rows have a missing price", missing);
    }

    let duplicates = rows.windows(2).filter(|w| w[0].date == w[1].date).count();
    if duplicates > 0 {
        warn!("{} duplicate dates kept in file order", duplicates);
    }

    let table = PriceTable::new(rows);
    match table.span() {
        Some((first, last)) => info!(
            "Loaded {} prices from {} to {}",
            table.len(),
            first,
            last
        ),
        None => warn!("Price file {} has no data rows", path.display()),
    }

    Ok(table)
}

/// Load the event log with default options.
pub fn load_event_log(path: impl AsRef<Path>) -> Result<Vec<EventRecord>> {
    load_event_log_with(path, &DataConfig::default())
}

/// Load the event log.
///
/// Only the `Date` column is required; the descriptive columns are passed
/// through and left empty when absent.
pub fn load_event_log_with(
    path: impl AsRef<Path>,
    config: &DataConfig,
) -> Result<Vec<EventRecord>> {
    let path = path.as_ref();
    info!("Loading events from: {}", path.display());

    let mut reader = open_reader(path, config)?;
    let headers = reader.headers()?.clone();
    let date_idx = Some(require_columns(path, &headers, &[&DATE_COLUMNS[..]])?[0]);
    let name_idx = find_column(&headers, &EVENT_NAME_COLUMNS);
    let category_idx = find_column(&headers, &CATEGORY_COLUMNS);
    let description_idx = find_column(&headers, &DESCRIPTION_COLUMNS);
    let impact_idx = find_column(&headers, &IMPACT_COLUMNS);

    let mut events = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let row_num = idx + 1;
        let record = result?;

        let date = parse_date_flexible(field(&record, date_idx)).map_err(|e| match e {
            DataError::DateParse {
                value, expected, ..
            } => DataError::DateParse {
                row: row_num,
                value,
                expected,
            },
            other => other,
        })?;

        events.push(EventRecord {
            date,
            event_name: field(&record, name_idx).to_string(),
            category: field(&record, category_idx).to_string(),
            description: field(&record, description_idx).to_string(),
            expected_impact: field(&record, impact_idx).to_string(),
        });
    }

    events.sort_by_key(|e| e.date);

    info!("Loaded {} events", events.len());
    Ok(events)
}
