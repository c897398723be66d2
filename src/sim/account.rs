//! Per-generator income accumulator used during one simulation.

/// Running income of one generator over the simulated year.
#[derive(Debug, Clone)]
pub struct GeneratorAccount<'a> {
    pub name: &'a str,
    pub production: &'a [f64],
    annual_income: f64,
}

impl<'a> GeneratorAccount<'a> {
    pub fn new(name: &'a str, production: &'a [f64]) -> Self {
        Self {
            name,
            production,
            annual_income: 0.0,
        }
    }

    /// Production at timestep `t` (kWh).
    pub fn production_at(&self, t: usize) -> f64 {
        self.production.get(t).copied().unwrap_or(0.0)
    }

    pub fn credit(&mut self, amount: f64) {
        self.annual_income += amount;
    }

    pub fn total_income(&self) -> f64 {
        self.annual_income
    }
}
