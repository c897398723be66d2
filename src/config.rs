//! TOML-based run configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::chart::{ChartParams, Point};
use crate::series::IntervalKind;
use crate::sim::schedule::HOUR_OF_DAY_BY_MONTH_LEN;

/// Top-level run configuration parsed from TOML.
///
/// All sections have defaults matching the `flat_rate` preset. Load from
/// TOML with [`RunConfig::from_toml_file`] or pick a preset with
/// [`RunConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Result table, descriptor and run-period files.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// Feed-in tariff and grid cost schedules.
    #[serde(default)]
    pub tariffs: TariffConfig,
    /// Discounting and reporting options.
    #[serde(default)]
    pub finance: FinanceConfig,
    /// Chart size and placement.
    #[serde(default)]
    pub chart: ChartConfig,
    /// Optional output files.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Input file locations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    /// Simulation result table (CSV).
    pub results: Option<PathBuf>,
    /// Building descriptor carrying the financial lines.
    pub descriptor: Option<PathBuf>,
    /// `.eio` file with location and run period; discovered next to the
    /// result table when absent.
    pub run_period: Option<PathBuf>,
}

/// Tariff schedules: 1 value (flat), 288 values (24 hours by 12 months),
/// or one value per simulation timestep.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Price paid for exported surplus per kWh.
    pub feed_in: Vec<f64>,
    /// Price of grid electricity per kWh.
    pub grid_cost: Vec<f64>,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            feed_in: vec![0.10],
            grid_cost: vec![0.25],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinanceConfig {
    /// Annual discount rate in percent (0–100); no discounting when absent.
    pub discount_percent: Option<f64>,
    /// Currency label used in reports.
    pub currency: Option<String>,
    /// Fail when the descriptor carries no financial data.
    pub require_financial_data: bool,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            discount_percent: None,
            currency: None,
            require_financial_data: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub x_scale: f64,
    pub y_scale: f64,
    /// Chart origin as `[x, y]`.
    pub origin: [f64; 2],
    /// Spacing of the value axis ticks in currency units.
    pub tick_step: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let params = ChartParams::default();
        Self {
            x_scale: params.x_scale,
            y_scale: params.y_scale,
            origin: [params.origin.x, params.origin.y],
            tick_step: params.tick_step,
        }
    }
}

impl ChartConfig {
    pub fn params(&self) -> ChartParams {
        ChartParams {
            x_scale: self.x_scale,
            y_scale: self.y_scale,
            origin: Point::new(self.origin[0], self.origin[1]),
            tick_step: self.tick_step,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Per-generator yearly ledger as CSV.
    pub ledger_csv: Option<PathBuf>,
    /// Chart layout as JSON.
    pub layout_json: Option<PathBuf>,
    /// Parsed series with their provenance headers.
    pub series_csv: Option<PathBuf>,
}

/// A configuration validation error with field path and description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g. `"tariffs.feed_in"`).
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Grid price outside the evening peak.
const OFF_PEAK_GRID_COST: f64 = 0.20;
/// Grid price during the evening peak.
const PEAK_GRID_COST: f64 = 0.40;
/// Evening peak hours, 0-based hour of day.
const PEAK_HOURS: std::ops::RangeInclusive<usize> = 17..=21;

impl RunConfig {
    /// Flat feed-in and grid prices all year.
    pub fn flat_rate() -> Self {
        Self::default()
    }

    /// Flat feed-in tariff and an evening-peak grid price, every month.
    pub fn time_of_use() -> Self {
        let grid_cost = (0..HOUR_OF_DAY_BY_MONTH_LEN)
            .map(|i| {
                if PEAK_HOURS.contains(&(i % 24)) {
                    PEAK_GRID_COST
                } else {
                    OFF_PEAK_GRID_COST
                }
            })
            .collect();
        Self {
            tariffs: TariffConfig {
                feed_in: vec![0.08],
                grid_cost,
            },
            ..Self::default()
        }
    }

    /// Names accepted by [`RunConfig::from_preset`].
    pub const PRESETS: &[&str] = &["flat_rate", "time_of_use"];

    /// Looks up a preset by name.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] listing the available presets if `name`
    /// is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "flat_rate" => Ok(Self::flat_rate()),
            "time_of_use" => Ok(Self::time_of_use()),
            _ => Err(ConfigError::new(
                "preset",
                format!("unknown preset \"{name}\", available: {}", Self::PRESETS.join(", ")),
            )),
        }
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parses a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on syntax errors or unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Checks values the type system cannot; returns every problem found.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (field, values) in [
            ("tariffs.feed_in", &self.tariffs.feed_in),
            ("tariffs.grid_cost", &self.tariffs.grid_cost),
        ] {
            let len = values.len();
            let canonical = IntervalKind::from_point_count(len).is_some();
            if len != 1 && len != HOUR_OF_DAY_BY_MONTH_LEN && !canonical {
                errors.push(ConfigError::new(
                    field,
                    format!("has {len} values, expected 1, 288, 12, 365 or 8760"),
                ));
            }
            if values.iter().any(|v| !v.is_finite()) {
                errors.push(ConfigError::new(field, "values must be finite"));
            }
        }

        if let Some(rate) = self.finance.discount_percent {
            if !(rate.is_finite() && (0.0..=100.0).contains(&rate)) {
                errors.push(ConfigError::new("finance.discount_percent", "must be in [0, 100]"));
            }
        }

        let chart = &self.chart;
        if !(chart.x_scale > 0.0) {
            errors.push(ConfigError::new("chart.x_scale", "must be > 0"));
        }
        if !(chart.y_scale > 0.0) {
            errors.push(ConfigError::new("chart.y_scale", "must be > 0"));
        }
        if !(chart.tick_step > 0.0) {
            errors.push(ConfigError::new("chart.tick_step", "must be > 0"));
        }

        errors
    }
}
