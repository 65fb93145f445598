//! Configuration file support for preparation runs.
//!
//! Allows describing a preparation run in a TOML file for reproducibility.

use crate::data::{DataConfig, PRICE_DATE_FORMAT};
use crate::error::{DataError, Result};
use crate::transform::DEFAULT_VOLATILITY_WINDOW;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Complete preparation configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Input file settings.
    #[serde(default)]
    pub data: DataSettings,
    /// Filtering and derivation settings.
    #[serde(default)]
    pub prepare: PrepareSettings,
}

/// Input file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    /// Path to the price file.
    pub price_file: Option<String>,
    /// Path to the event file.
    pub event_file: Option<String>,
    /// Strict date format of the price file.
    #[serde(default = "default_price_date_format")]
    pub price_date_format: String,
    /// Field delimiter; auto-detected when unset.
    pub delimiter: Option<char>,
}

fn default_price_date_format() -> String { PRICE_DATE_FORMAT.to_string() }

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            price_file: None,
            event_file: None,
            price_date_format: PRICE_DATE_FORMAT.to_string(),
            delimiter: None,
        }
    }
}

/// Filtering and derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareSettings {
    /// Inclusive start date.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Inclusive end date.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Derive log returns, simple returns and volatility.
    #[serde(default = "default_true")]
    pub calculate_returns: bool,
    /// Rolling volatility window in observations.
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
}

fn default_true() -> bool { true }
fn default_volatility_window() -> usize { DEFAULT_VOLATILITY_WINDOW }

impl Default for PrepareSettings {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            calculate_returns: true,
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
        }
    }
}

impl PrepConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(DataError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config: PrepConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.prepare.volatility_window < 2 {
            return Err(DataError::ConfigError(format!(
                "prepare.volatility_window must be at least 2, got {}",
                self.prepare.volatility_window
            )));
        }
        if let Some(d) = self.data.delimiter {
            if !d.is_ascii() {
                return Err(DataError::ConfigError(format!(
                    "data.delimiter must be a single ASCII character, got {:?}",
                    d
                )));
            }
        }
        Ok(())
    }

    /// Loader options for the price and event files.
    pub fn data_config(&self) -> DataConfig {
        DataConfig {
            delimiter: self.data.delimiter.map(|c| c as u8),
            price_date_format: self.data.price_date_format.clone(),
        }
    }

    /// Generate an example configuration file content.
    pub fn example() -> String {
        r#"# Crude oil data preparation

[data]
price_file = "data/BrentOilPrices.csv"
event_file = "data/events.csv"
price_date_format = "%d-%b-%y"
# delimiter = ","

[prepare]
# start_date = "2012-01-01"
# end_date = "2022-09-30"
calculate_returns = true
volatility_window = 30
"#
        .to_string()
    }
}
