//! Core simulation types: projection settings, inputs, and ledger records.

use std::fmt;

use serde::Serialize;

use crate::profile::GeneratorFinancialProfile;
use crate::series::{GeneratorSeries, TimeSeries};

use super::cashflow::SimError;
use super::schedule::ExpandedSchedule;

/// Number of projected years after the purchase year.
pub const PROJECTION_YEARS: u32 = 25;

/// Projection horizon and discounting.
///
/// # Examples
///
/// ```
/// use gen_cashflow::sim::types::ProjectionConfig;
///
/// let cfg = ProjectionConfig::new(Some(10.0)).unwrap();
/// assert_eq!(cfg.years, 25);
/// assert!((cfg.discount_factor(1) - 1.0 / 1.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    /// Years projected after year 0.
    pub years: u32,
    /// Annual discount rate in percent, `None` for no discounting.
    pub discount_percent: Option<f64>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            years: PROJECTION_YEARS,
            discount_percent: None,
        }
    }
}

impl ProjectionConfig {
    /// Creates a 25-year projection.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidDiscountFactor`] if the discount is not
    /// finite or outside `[0, 100]`.
    pub fn new(discount_percent: Option<f64>) -> Result<Self, SimError> {
        Self::with_years(PROJECTION_YEARS, discount_percent)
    }

    /// Creates a projection over a custom horizon.
    ///
    /// # Errors
    ///
    /// As [`ProjectionConfig::new`].
    pub fn with_years(years: u32, discount_percent: Option<f64>) -> Result<Self, SimError> {
        if let Some(rate) = discount_percent.filter(|r| !(r.is_finite() && (0.0..=100.0).contains(r))) {
            return Err(SimError::InvalidDiscountFactor(rate));
        }
        Ok(Self {
            years,
            discount_percent,
        })
    }

    /// `1 / (1 + r/100)^year`, or 1 without discounting.
    pub fn discount_factor(&self, year: u32) -> f64 {
        match self.discount_percent {
            Some(rate) => 1.0 / (1.0 + rate / 100.0).powf(f64::from(year)),
            None => 1.0,
        }
    }
}

/// Everything the cashflow simulation reads, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct SimulationInputs<'a> {
    pub demand: &'a TimeSeries,
    pub net_purchased: &'a TimeSeries,
    pub generators: &'a [GeneratorSeries],
    pub profiles: &'a [GeneratorFinancialProfile],
    /// Feed-in tariff paid for exported surplus.
    pub tariff: &'a ExpandedSchedule,
    /// Grid electricity cost avoided by self-consumption.
    pub grid_cost: &'a ExpandedSchedule,
    pub projection: ProjectionConfig,
}

/// One projected year of a generator's ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearEntry {
    pub year: u32,
    /// Discounted annual income.
    pub income: f64,
    /// Discounted cost of the items replaced this year.
    pub replacement_cost: f64,
    pub maintenance_cost: f64,
    /// `income - replacement_cost - maintenance_cost`.
    pub net: f64,
}

impl fmt::Display for YearEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "year {:>2}: income {:>10.2}  replacement {:>10.2}  maintenance {:>8.2}  net {:>10.2}",
            self.year, self.income, self.replacement_cost, self.maintenance_cost, self.net
        )
    }
}

/// Cashflow of one generation system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorCashflow {
    pub name: String,
    /// Undiscounted income over one simulated year.
    pub total_income: f64,
    /// Capital spent at year 0 (positive magnitude).
    pub capital_cost: f64,
    /// Years `1..=years`.
    pub yearly_ledger: Vec<YearEntry>,
    /// `-capital_cost + Σ net`, rounded to cents.
    pub net_present_cost: f64,
}

impl GeneratorCashflow {
    /// Replacement and maintenance spent in `year` (positive magnitude).
    pub fn costs_in(&self, year: u32) -> f64 {
        self.entry(year)
            .map_or(0.0, |e| e.replacement_cost + e.maintenance_cost)
    }

    pub fn entry(&self, year: u32) -> Option<&YearEntry> {
        self.yearly_ledger.iter().find(|e| e.year == year)
    }
}

/// Per-generator cashflows in generator column order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CashflowResult {
    pub generators: Vec<GeneratorCashflow>,
}

impl CashflowResult {
    /// Looks a generator up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&GeneratorCashflow> {
        self.generators
            .iter()
            .find(|g| g.name.trim().eq_ignore_ascii_case(name.trim()))
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Highest projected year across all ledgers.
    pub fn horizon(&self) -> u32 {
        self.generators
            .iter()
            .filter_map(|g| g.yearly_ledger.last().map(|e| e.year))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_out_of_range_is_rejected() {
        assert_eq!(ProjectionConfig::new(Some(-1.0)), Err(SimError::InvalidDiscountFactor(-1.0)));
        assert_eq!(ProjectionConfig::new(Some(100.5)), Err(SimError::InvalidDiscountFactor(100.5)));
        assert!(ProjectionConfig::new(Some(f64::NAN)).is_err());
        assert!(ProjectionConfig::new(Some(0.0)).is_ok());
        assert!(ProjectionConfig::new(Some(100.0)).is_ok());
    }

    #[test]
    fn no_discount_keeps_face_value() {
        let cfg = ProjectionConfig::default();
        assert_eq!(cfg.discount_factor(25), 1.0);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let result = CashflowResult {
            generators: vec![GeneratorCashflow {
                name: "ROOF PV".to_string(),
                total_income: 0.0,
                capital_cost: 0.0,
                yearly_ledger: Vec::new(),
                net_present_cost: 0.0,
            }],
        };
        assert!(result.get("roof pv").is_some());
        assert!(result.get("wind").is_none());
    }
}
