//! Post-hoc summary of a cashflow result.

use std::fmt;

use super::types::{CashflowResult, GeneratorCashflow};

/// Headline figures of one generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSummary {
    pub name: String,
    /// Undiscounted income over one simulated year.
    pub annual_income: f64,
    pub capital_cost: f64,
    pub net_present_cost: f64,
    /// First year whose cumulative ledger, capital included, is non-negative.
    pub payback_year: Option<u32>,
}

impl GeneratorSummary {
    fn from_cashflow(cashflow: &GeneratorCashflow) -> Self {
        let mut cumulative = -cashflow.capital_cost;
        let mut payback_year = (cumulative >= 0.0).then_some(0);
        if payback_year.is_none() {
            for entry in &cashflow.yearly_ledger {
                cumulative += entry.net;
                if cumulative >= 0.0 {
                    payback_year = Some(entry.year);
                    break;
                }
            }
        }
        Self {
            name: cashflow.name.clone(),
            annual_income: cashflow.total_income,
            capital_cost: cashflow.capital_cost,
            net_present_cost: cashflow.net_present_cost,
            payback_year,
        }
    }
}

/// Per-generator summary with an optional currency label.
///
/// # Examples
///
/// ```
/// use gen_cashflow::sim::report::CashflowReport;
/// use gen_cashflow::sim::types::CashflowResult;
///
/// let report = CashflowReport::from_result(&CashflowResult::default(), Some("AUD"));
/// assert_eq!(report.title(), "Generation system net present cost in AUD");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CashflowReport {
    pub currency: Option<String>,
    pub generators: Vec<GeneratorSummary>,
}

impl CashflowReport {
    pub fn from_result(result: &CashflowResult, currency: Option<&str>) -> Self {
        Self {
            currency: currency.map(str::to_string),
            generators: result.generators.iter().map(GeneratorSummary::from_cashflow).collect(),
        }
    }

    pub fn title(&self) -> String {
        match &self.currency {
            Some(currency) => format!("Generation system net present cost in {currency}"),
            None => "Generation system net present cost".to_string(),
        }
    }

    /// Sum of every generator's net present cost.
    pub fn total_net_present_cost(&self) -> f64 {
        self.generators.iter().map(|g| g.net_present_cost).sum()
    }
}

impl fmt::Display for CashflowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ---", self.title())?;
        for g in &self.generators {
            let payback = g
                .payback_year
                .map_or_else(|| "never".to_string(), |y| format!("year {y}"));
            writeln!(f, "{}:", g.name)?;
            writeln!(f, "  Annual income:      {:.2}", g.annual_income)?;
            writeln!(f, "  Capital cost:       {:.2}", g.capital_cost)?;
            writeln!(f, "  Net present cost:   {:.2}", g.net_present_cost)?;
            writeln!(f, "  Payback:            {payback}")?;
        }
        write!(f, "Total net present cost: {:.2}", self.total_net_present_cost())
    }
}
