//! Integration tests for schedule expansion and the cashflow simulation.

mod common;

use common::{assert_close, constant_generator, constant_series, flat_schedule, HOURS};
use gen_cashflow::profile::GeneratorFinancialProfile;
use gen_cashflow::series::{CalendarPoint, GeneratorSeries, IntervalKind, RunPeriodContext, SeriesLabel, TimeSeries};
use gen_cashflow::sim::report::CashflowReport;
use gen_cashflow::sim::schedule::{ExpandedSchedule, ScheduleExpander, ScheduleInput};
use gen_cashflow::sim::{CashflowSimulator, ProjectionConfig, SimError, SimulationInputs};

struct Scenario {
    demand: TimeSeries,
    net: TimeSeries,
    generators: Vec<GeneratorSeries>,
    profiles: Vec<GeneratorFinancialProfile>,
    tariff: ExpandedSchedule,
    grid: ExpandedSchedule,
    projection: ProjectionConfig,
}

impl Scenario {
    fn new(demand: f64, generators: &[(&str, f64)]) -> Self {
        Self {
            demand: constant_series(SeriesLabel::Demand, demand),
            net: constant_series(SeriesLabel::NetPurchased, 0.0),
            generators: generators.iter().map(|(name, kwh)| constant_generator(name, *kwh)).collect(),
            profiles: generators
                .iter()
                .map(|(name, _)| GeneratorFinancialProfile::new(*name))
                .collect(),
            tariff: flat_schedule(0.1),
            grid: flat_schedule(0.2),
            projection: ProjectionConfig::default(),
        }
    }

    fn simulator(&self) -> CashflowSimulator<'_> {
        CashflowSimulator::new(SimulationInputs {
            demand: &self.demand,
            net_purchased: &self.net,
            generators: &self.generators,
            profiles: &self.profiles,
            tariff: &self.tariff,
            grid_cost: &self.grid,
            projection: self.projection,
        })
    }
}

#[test]
fn flat_rate_expands_to_every_hour() {
    let expanded = ScheduleExpander::expand(&ScheduleInput::FlatRate(5.0), IntervalKind::Hourly).unwrap();
    assert_eq!(expanded.values, vec![5.0; HOURS]);
}

#[test]
fn monthly_profile_of_ones_expands_to_ones() {
    let expanded =
        ScheduleExpander::expand(&ScheduleInput::HourOfDayByMonth(vec![1.0; 288]), IntervalKind::Hourly).unwrap();
    assert_eq!(expanded.len(), HOURS);
    assert!(expanded.values.iter().all(|&v| v == 1.0));
    assert_eq!(expanded.values.iter().sum::<f64>(), HOURS as f64);
}

#[test]
fn single_generator_meeting_demand_earns_grid_cost() {
    let scenario = Scenario::new(10.0, &[("PV", 10.0)]);
    let result = scenario.simulator().simulate().unwrap();
    assert_eq!(result.len(), 1);
    assert_close(result.generators[0].total_income, 10.0 * 0.2 * 8760.0);
}

#[test]
fn equal_generators_split_income_evenly() {
    let scenario = Scenario::new(10.0, &[("PV", 5.0), ("WIND", 5.0)]);
    let result = scenario.simulator().simulate().unwrap();
    let pv = result.get("PV").unwrap().total_income;
    let wind = result.get("WIND").unwrap().total_income;
    assert_close(pv, wind);
    assert_close(pv + wind, 10.0 * 0.2 * 8760.0);
}

#[test]
fn surplus_income_is_shared_by_production() {
    let scenario = Scenario::new(10.0, &[("PV", 15.0), ("WIND", 5.0)]);
    let result = scenario.simulator().simulate().unwrap();
    let hourly = 10.0 * 0.1 + 10.0 * 0.2;
    assert_close(result.generators[0].total_income, 0.75 * hourly * 8760.0);
    assert_close(result.generators[1].total_income, 0.25 * hourly * 8760.0);
}

#[test]
fn replacements_fall_on_their_interval() {
    let mut scenario = Scenario::new(10.0, &[("PV", 0.0)]);
    scenario.profiles = vec![
        GeneratorFinancialProfile::new("PV")
            .with_capital("Panels", 1000.0)
            .with_recurring("Inverter", 200.0, 5.0),
    ];
    scenario.projection = ProjectionConfig::with_years(10, None).unwrap();

    let result = scenario.simulator().simulate().unwrap();
    let pv = &result.generators[0];
    assert_eq!(pv.capital_cost, 1000.0);
    assert_eq!(pv.yearly_ledger.len(), 10);
    let replacements: Vec<u32> = pv
        .yearly_ledger
        .iter()
        .filter(|e| e.replacement_cost > 0.0)
        .map(|e| e.year)
        .collect();
    assert_eq!(replacements, vec![5, 10]);
    assert_eq!(pv.net_present_cost, -1400.0);
}

#[test]
fn discounting_reduces_income_but_not_maintenance() {
    let mut scenario = Scenario::new(10.0, &[("PV", 10.0)]);
    scenario.profiles = vec![GeneratorFinancialProfile::new("PV").with_maintenance(50.0)];
    scenario.projection = ProjectionConfig::new(Some(10.0)).unwrap();

    let result = scenario.simulator().simulate().unwrap();
    let pv = &result.generators[0];
    let year_one = pv.entry(1).unwrap();
    assert_close(year_one.income, pv.total_income / 1.1);
    assert_eq!(year_one.maintenance_cost, 50.0);
    assert_eq!(pv.entry(25).unwrap().maintenance_cost, 50.0);
}

#[test]
fn partial_year_is_rejected() {
    let mut scenario = Scenario::new(10.0, &[("PV", 10.0)]);
    scenario.generators[0].series.provenance = RunPeriodContext {
        end: Some(CalendarPoint::new(6, 30, 24)),
        ..RunPeriodContext::annual("Test")
    };
    match scenario.simulator().simulate() {
        Err(SimError::NonAnnualRunPeriod { series, end, .. }) => {
            assert!(series.contains("PV"));
            assert_eq!(end, "(6, 30, 24)");
        }
        other => panic!("expected NonAnnualRunPeriod, got {other:?}"),
    }
}

#[test]
fn late_start_is_rejected() {
    let mut scenario = Scenario::new(10.0, &[("PV", 10.0)]);
    scenario.generators[0].series.provenance = RunPeriodContext {
        start: Some(CalendarPoint::new(2, 1, 1)),
        ..RunPeriodContext::annual("Test")
    };
    match scenario.simulator().simulate() {
        Err(SimError::NonAnnualRunPeriod { series, start, end }) => {
            assert!(series.contains("PV"));
            assert_eq!(start, "(2, 1, 1)");
            assert_eq!(end, "(12, 31, 24)");
        }
        other => panic!("expected NonAnnualRunPeriod, got {other:?}"),
    }
}

#[test]
fn missing_dates_are_rejected() {
    let mut scenario = Scenario::new(10.0, &[("PV", 10.0)]);
    scenario.demand.provenance = RunPeriodContext::default();
    assert!(matches!(
        scenario.simulator().simulate(),
        Err(SimError::NonAnnualRunPeriod { .. })
    ));
}

#[test]
fn mismatched_generator_length_is_rejected() {
    let mut scenario = Scenario::new(10.0, &[("PV", 10.0)]);
    scenario.generators[0].series.values.pop();
    assert_eq!(
        scenario.simulator().simulate(),
        Err(SimError::TimestepCountMismatch {
            series: "generator `PV`".to_string(),
            expected: HOURS,
            actual: HOURS - 1,
        })
    );
}

#[test]
fn simulate_is_idempotent() {
    let mut scenario = Scenario::new(8.0, &[("PV", 6.0), ("WIND", 4.0)]);
    scenario.profiles[0] = GeneratorFinancialProfile::new("PV")
        .with_capital("Panels", 5000.0)
        .with_recurring("Inverter", 800.0, 10.0)
        .with_maintenance(40.0);
    scenario.projection = ProjectionConfig::new(Some(4.0)).unwrap();

    let simulator = scenario.simulator();
    let first = simulator.simulate().unwrap();
    let second = simulator.simulate().unwrap();
    assert_eq!(first, second);
}

#[test]
fn report_summarizes_every_generator() {
    let mut scenario = Scenario::new(10.0, &[("PV", 10.0)]);
    scenario.profiles = vec![GeneratorFinancialProfile::new("PV").with_capital("Panels", 10_000.0)];
    let result = scenario.simulator().simulate().unwrap();

    let report = CashflowReport::from_result(&result, Some("AUD"));
    let pv = &report.generators[0];
    // 17520 a year pays back 10000 within the first year.
    assert_eq!(pv.payback_year, Some(1));
    assert!(report.to_string().starts_with("--- Generation system net present cost in AUD ---"));
}
