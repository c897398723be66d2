//! Per-generator financial data: equipment items and maintenance costs.

use serde::Serialize;

/// One equipment cost of a generation system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialLineItem {
    pub generator_name: String,
    pub item_name: String,
    pub cost: f64,
    /// `None` for a capital item bought once at year 0, otherwise the
    /// replacement interval in years.
    pub replacement_years: Option<f64>,
}

impl FinancialLineItem {
    pub fn is_capital(&self) -> bool {
        self.replacement_years.is_none()
    }

    /// Whether this item is replaced in `year` (every `replacement_years`).
    pub fn is_due(&self, year: u32) -> bool {
        match self.replacement_years {
            Some(interval) if interval > 0.0 => f64::from(year) % interval == 0.0,
            _ => false,
        }
    }
}

/// Annual maintenance cost of a generation system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceCost {
    pub generator_name: String,
    pub annual_cost: f64,
}

/// All financial data recorded for one generation system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorFinancialProfile {
    pub generator_name: String,
    pub items: Vec<FinancialLineItem>,
    pub maintenance: Option<MaintenanceCost>,
}

impl GeneratorFinancialProfile {
    pub fn new(generator_name: impl Into<String>) -> Self {
        Self {
            generator_name: generator_name.into(),
            items: Vec::new(),
            maintenance: None,
        }
    }

    /// Adds a one-off capital item.
    pub fn with_capital(mut self, item_name: &str, cost: f64) -> Self {
        self.items.push(FinancialLineItem {
            generator_name: self.generator_name.clone(),
            item_name: item_name.to_string(),
            cost,
            replacement_years: None,
        });
        self
    }

    /// Adds an item replaced every `replacement_years`.
    pub fn with_recurring(mut self, item_name: &str, cost: f64, replacement_years: f64) -> Self {
        self.items.push(FinancialLineItem {
            generator_name: self.generator_name.clone(),
            item_name: item_name.to_string(),
            cost,
            replacement_years: Some(replacement_years),
        });
        self
    }

    pub fn with_maintenance(mut self, annual_cost: f64) -> Self {
        self.maintenance = Some(MaintenanceCost {
            generator_name: self.generator_name.clone(),
            annual_cost,
        });
        self
    }

    /// Sum of every capital item, paid once at year 0.
    pub fn capital_total(&self) -> f64 {
        self.items
            .iter()
            .filter(|item| item.is_capital())
            .map(|item| item.cost)
            .sum()
    }

    /// Undiscounted cost of the items replaced in `year`.
    pub fn replacement_cost(&self, year: u32) -> f64 {
        self.items
            .iter()
            .filter(|item| item.is_due(year))
            .map(|item| item.cost)
            .sum()
    }

    pub fn annual_maintenance(&self) -> f64 {
        self.maintenance.as_ref().map_or(0.0, |m| m.annual_cost)
    }

    /// Whether this profile belongs to `generator`.
    ///
    /// Result headers upper-case object names, descriptors keep the author's
    /// casing, so names compare case-insensitively after trimming.
    pub fn matches(&self, generator: &str) -> bool {
        self.generator_name
            .trim()
            .eq_ignore_ascii_case(generator.trim())
    }
}

/// Finds the profile for `generator`, if any.
pub fn find_profile<'a>(
    profiles: &'a [GeneratorFinancialProfile],
    generator: &str,
) -> Option<&'a GeneratorFinancialProfile> {
    profiles.iter().find(|p| p.matches(generator))
}
