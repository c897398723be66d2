//! End-to-end run: parse inputs, simulate cashflows, lay out the chart.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{info, warn};

use crate::chart::{ChartLayout, project};
use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::io::locate::companion_eio;
use crate::parse::run_period::{has_metadata, read_run_period_file};
use crate::parse::{FinancialBlockParser, ParsedResults, ResultTableParser};
use crate::profile::GeneratorFinancialProfile;
use crate::series::{IntervalKind, RunPeriodContext};
use crate::sim::report::CashflowReport;
use crate::sim::{
    CashflowResult, CashflowSimulator, ExpandedSchedule, ProjectionConfig, ScheduleExpander, SimulationInputs,
};

/// Everything a run produced, stage by stage.
///
/// A failed stage leaves its output and every later one absent and records
/// the error; earlier outputs are kept.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub context: RunPeriodContext,
    pub parsed: Option<ParsedResults>,
    pub profiles: Option<Vec<GeneratorFinancialProfile>>,
    pub cashflow: Option<CashflowResult>,
    pub report: Option<CashflowReport>,
    pub layout: Option<ChartLayout>,
    pub error: Option<PipelineError>,
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Converts into a `Result`, dropping partial outputs on failure.
    ///
    /// # Errors
    ///
    /// Returns the error of the failed stage.
    pub fn into_result(self) -> Result<Self, PipelineError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }

    fn fail(mut self, error: PipelineError) -> Self {
        warn!(kind = ?error.kind(), "{error}");
        self.error = Some(error);
        self
    }
}

/// Resolves the run context: explicit `.eio`, then the one next to the
/// result table, then the descriptor itself.
fn resolve_context(config: &RunConfig, results: &Path) -> Result<RunPeriodContext, PipelineError> {
    if let Some(path) = &config.inputs.run_period {
        return read_run_period_file(path).map_err(|source| PipelineError::Unreadable {
            path: path.clone(),
            source,
        });
    }

    if let Some(path) = companion_eio(results) {
        match read_run_period_file(&path) {
            Ok(ctx) if has_metadata(&ctx) => return Ok(ctx),
            Ok(_) => warn!(path = %path.display(), "run-period file carries no metadata"),
            Err(e) => warn!(path = %path.display(), "cannot read run-period file: {e}"),
        }
    }

    // An unreadable descriptor is reported by the financial stage.
    let Some(descriptor) = config.inputs.descriptor.as_deref() else {
        return Ok(RunPeriodContext::default());
    };
    match read_run_period_file(descriptor) {
        Ok(ctx) => Ok(ctx),
        Err(e) => {
            warn!(path = %descriptor.display(), "cannot read run period from descriptor: {e}");
            Ok(RunPeriodContext::default())
        }
    }
}

fn read_profiles(config: &RunConfig) -> Result<Vec<GeneratorFinancialProfile>, PipelineError> {
    let Some(path) = config.inputs.descriptor.as_ref() else {
        return Err(PipelineError::MissingInput("descriptor"));
    };
    let file = File::open(path).map_err(|source| PipelineError::Descriptor {
        path: path.clone(),
        source,
    })?;
    Ok(FinancialBlockParser::parse_reader(
        BufReader::new(file),
        config.finance.require_financial_data,
    )?)
}

fn expand(field: &'static str, values: &[f64], target: IntervalKind) -> Result<ExpandedSchedule, PipelineError> {
    ScheduleExpander::expand_values(values, target).map_err(|source| PipelineError::Schedule { field, source })
}

/// Runs every stage for `config`.
///
/// Never panics on bad input: the first failing stage is recorded in
/// [`PipelineOutcome::error`] and later stages are skipped.
pub fn run(config: &RunConfig) -> PipelineOutcome {
    let outcome = PipelineOutcome::default();

    let errors = config.validate();
    if !errors.is_empty() {
        return outcome.fail(PipelineError::Config(errors));
    }

    let Some(results_path) = config.inputs.results.as_deref() else {
        return outcome.fail(PipelineError::MissingInput("result table"));
    };

    let context = match resolve_context(config, results_path) {
        Ok(ctx) => ctx,
        Err(e) => return outcome.fail(e),
    };
    info!(location = %context.location, start = %context.describe_start(), end = %context.describe_end(), "run period");
    let mut outcome = PipelineOutcome { context, ..outcome };

    let file = match File::open(results_path) {
        Ok(file) => file,
        Err(source) => {
            return outcome.fail(PipelineError::Unreadable {
                path: results_path.to_path_buf(),
                source,
            });
        }
    };
    let parsed = match ResultTableParser::new(outcome.context.clone()).parse(BufReader::new(file)) {
        Ok(parsed) => parsed,
        Err(e) => return outcome.fail(e.into()),
    };
    outcome.parsed = Some(parsed);

    match read_profiles(config) {
        Ok(profiles) => outcome.profiles = Some(profiles),
        Err(e) => return outcome.fail(e),
    }

    let cashflow = match simulate(config, &outcome) {
        Ok(result) => result,
        Err(e) => return outcome.fail(e),
    };

    outcome.report = Some(CashflowReport::from_result(&cashflow, config.finance.currency.as_deref()));
    outcome.layout = Some(project(&cashflow, &config.chart.params()));
    outcome.cashflow = Some(cashflow);
    outcome
}

fn simulate(config: &RunConfig, outcome: &PipelineOutcome) -> Result<CashflowResult, PipelineError> {
    let (Some(parsed), Some(profiles)) = (&outcome.parsed, &outcome.profiles) else {
        return Err(PipelineError::MissingInput("parsed results"));
    };

    let interval = parsed.demand.interval;
    let tariff = expand("tariffs.feed_in", &config.tariffs.feed_in, interval)?;
    let grid_cost = expand("tariffs.grid_cost", &config.tariffs.grid_cost, interval)?;
    let projection = ProjectionConfig::new(config.finance.discount_percent)?;

    let inputs = SimulationInputs {
        demand: &parsed.demand,
        net_purchased: &parsed.net_purchased,
        generators: &parsed.generators,
        profiles,
        tariff: &tariff,
        grid_cost: &grid_cost,
        projection,
    };
    Ok(CashflowSimulator::new(inputs).simulate()?)
}
