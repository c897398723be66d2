//! Cashflow simulation: allocates energy income to generators and projects
//! each generator's 25-year ledger.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::profile::{GeneratorFinancialProfile, find_profile};
use crate::series::{CalendarPoint, IntervalKind, RunPeriodContext, TimeSeries, round_to_cents};

use super::account::GeneratorAccount;
use super::types::{CashflowResult, GeneratorCashflow, SimulationInputs, YearEntry};

/// Reasons a simulation refuses to run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("{series} has {actual} timesteps, expected {expected}")]
    TimestepCountMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },
    #[error("no financial data for generation system `{0}`")]
    MissingProfileForGenerator(String),
    #[error("{series} covers {start} to {end}, a full year from (1, 1, 1) to (12, 31, 24) is required")]
    NonAnnualRunPeriod {
        series: String,
        start: String,
        end: String,
    },
    #[error("discount rate {0} is outside 0..=100 percent")]
    InvalidDiscountFactor(f64),
}

/// Runs the income allocation and projection for one set of inputs.
///
/// Holds only borrowed inputs, so [`CashflowSimulator::simulate`] can be
/// called repeatedly with identical results.
pub struct CashflowSimulator<'a> {
    inputs: SimulationInputs<'a>,
}

impl<'a> CashflowSimulator<'a> {
    pub fn new(inputs: SimulationInputs<'a>) -> Self {
        Self { inputs }
    }

    /// Checks every precondition before any arithmetic.
    ///
    /// # Errors
    ///
    /// The first failed precondition, in this order: run period, timestep
    /// counts, discount rate, generator profiles.
    pub fn validate(&self) -> Result<(), SimError> {
        let inputs = &self.inputs;

        let mut named: Vec<(String, &TimeSeries)> = vec![
            ("facility demand".to_string(), inputs.demand),
            ("net purchased electricity".to_string(), inputs.net_purchased),
        ];
        named.extend(
            inputs
                .generators
                .iter()
                .map(|g| (format!("generator `{}`", g.name), &g.series)),
        );

        for (series, ts) in &named {
            check_annual(series, &ts.provenance)?;
        }

        let interval = self.interval();
        let expected = interval.points();
        let check_len = |series: &str, actual: usize| {
            if actual == expected {
                Ok(())
            } else {
                Err(SimError::TimestepCountMismatch {
                    series: series.to_string(),
                    expected,
                    actual,
                })
            }
        };
        for (series, ts) in &named {
            if ts.interval != interval {
                warn!(series = %series, interval = %ts.interval, reference = %interval, "interval mismatch");
                return Err(SimError::TimestepCountMismatch {
                    series: series.clone(),
                    expected,
                    actual: ts.len(),
                });
            }
            check_len(series, ts.len())?;
        }
        check_len("feed-in tariff schedule", inputs.tariff.len())?;
        check_len("grid cost schedule", inputs.grid_cost.len())?;

        if let Some(rate) = inputs.projection.discount_percent {
            if !(rate.is_finite() && (0.0..=100.0).contains(&rate)) {
                return Err(SimError::InvalidDiscountFactor(rate));
            }
        }

        for generator in inputs.generators {
            if find_profile(inputs.profiles, &generator.name).is_none() {
                return Err(SimError::MissingProfileForGenerator(generator.name.clone()));
            }
        }
        Ok(())
    }

    /// Interval shared by every input, taken from the demand series.
    pub fn interval(&self) -> IntervalKind {
        self.inputs.demand.interval
    }

    /// Allocates the income of timestep `t` to `accounts`.
    ///
    /// Surplus beyond demand is paid at the feed-in tariff and the rest is
    /// valued at grid cost, split in proportion to production. Without
    /// surplus each generator is valued at grid cost on its own production.
    /// A timestep past the end of the inputs credits nothing.
    pub(crate) fn step(&self, t: usize, accounts: &mut [GeneratorAccount<'_>]) {
        let inputs = &self.inputs;
        let (Some(&demand), Some(&tariff), Some(&grid)) = (
            inputs.demand.values.get(t),
            inputs.tariff.values.get(t),
            inputs.grid_cost.values.get(t),
        ) else {
            return;
        };

        let total: f64 = accounts.iter().map(|a| a.production_at(t)).sum();
        let surplus = total - demand;

        if total > 0.0 && surplus > 0.0 {
            let income = surplus * tariff + demand * grid;
            for account in accounts.iter_mut() {
                let share = account.production_at(t) / total;
                account.credit(income * share);
            }
        } else {
            for account in accounts.iter_mut() {
                let production = account.production_at(t);
                account.credit(production * grid);
            }
        }
    }

    /// Validates the inputs, then runs every timestep and projects each
    /// generator's ledger.
    ///
    /// # Errors
    ///
    /// See [`CashflowSimulator::validate`]; no partial result is produced.
    pub fn simulate(&self) -> Result<CashflowResult, SimError> {
        self.validate()?;

        let mut accounts: Vec<GeneratorAccount<'_>> = self
            .inputs
            .generators
            .iter()
            .map(|g| GeneratorAccount::new(&g.name, g.production()))
            .collect();

        for t in 0..self.interval().points() {
            self.step(t, &mut accounts);
        }

        let mut generators = Vec::with_capacity(accounts.len());
        for account in &accounts {
            let profile = find_profile(self.inputs.profiles, account.name)
                .ok_or_else(|| SimError::MissingProfileForGenerator(account.name.to_string()))?;
            let cashflow = self.project(account, profile);
            debug!(
                generator = account.name,
                income = cashflow.total_income,
                npc = cashflow.net_present_cost,
                "projected generator"
            );
            generators.push(cashflow);
        }

        info!(
            generators = generators.len(),
            interval = %self.interval(),
            "cashflow simulation complete"
        );
        Ok(CashflowResult { generators })
    }

    fn project(&self, account: &GeneratorAccount<'_>, profile: &GeneratorFinancialProfile) -> GeneratorCashflow {
        let projection = self.inputs.projection;
        let total_income = account.total_income();
        let capital_cost = profile.capital_total();
        let maintenance_cost = profile.annual_maintenance();

        let yearly_ledger: Vec<YearEntry> = (1..=projection.years)
            .map(|year| {
                let df = projection.discount_factor(year);
                let income = total_income * df;
                let replacement_cost = profile.replacement_cost(year) * df;
                // Maintenance stays at face value every year.
                YearEntry {
                    year,
                    income,
                    replacement_cost,
                    maintenance_cost,
                    net: income - replacement_cost - maintenance_cost,
                }
            })
            .collect();

        let net_present_cost = round_to_cents(-capital_cost + yearly_ledger.iter().map(|e| e.net).sum::<f64>());

        GeneratorCashflow {
            name: account.name.to_string(),
            total_income,
            capital_cost,
            yearly_ledger,
            net_present_cost,
        }
    }
}

fn check_annual(series: &str, ctx: &RunPeriodContext) -> Result<(), SimError> {
    if ctx.start == Some(CalendarPoint::YEAR_START) && ctx.end == Some(CalendarPoint::YEAR_END) {
        Ok(())
    } else {
        Err(SimError::NonAnnualRunPeriod {
            series: series.to_string(),
            start: ctx.describe_start(),
            end: ctx.describe_end(),
        })
    }
}
