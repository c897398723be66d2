//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use gen_cashflow::parse::result_table::{DEMAND_MARKER, GENERATOR_MARKER, NET_PURCHASED_MARKER};
use gen_cashflow::series::{GeneratorSeries, IntervalKind, RunPeriodContext, SeriesLabel, TimeSeries};
use gen_cashflow::sim::schedule::ExpandedSchedule;

/// Hourly points in a simulated year.
pub const HOURS: usize = 8760;

/// Watts that average to 1 kWh over one hour.
pub const WATTS_PER_KWH_HOUR: f64 = 1000.0;

/// Joules in one kWh.
pub const JOULES_PER_KWH: f64 = 3_600_000.0;

/// A generator column: name and constant production per row (kWh).
pub struct GeneratorColumn<'a> {
    pub name: &'a str,
    pub kwh: f64,
}

/// Builds an hourly result table with constant values.
///
/// Demand is given in kWh per hour and written in watts; net purchased and
/// generator production are written in joules.
pub fn hourly_result_table(rows: usize, demand_kwh: f64, net_kwh: f64, generators: &[GeneratorColumn<'_>]) -> String {
    let mut out = String::from("Date/Time");
    write!(out, ",{DEMAND_MARKER} [W](Hourly)").unwrap();
    for g in generators {
        write!(out, ",{}:{GENERATOR_MARKER} [J](Hourly)", g.name).unwrap();
    }
    write!(out, ",{NET_PURCHASED_MARKER} [J](Hourly)").unwrap();
    out.push('\n');

    for row in 0..rows {
        let hour = row % 24 + 1;
        write!(out, " 01/01  {hour:02}:00:00,{}", demand_kwh * WATTS_PER_KWH_HOUR).unwrap();
        for g in generators {
            write!(out, ",{}", g.kwh * JOULES_PER_KWH).unwrap();
        }
        writeln!(out, ",{}", net_kwh * JOULES_PER_KWH).unwrap();
    }
    out
}

/// Financial data of one generator as written into a descriptor.
pub struct DescriptorGenerator<'a> {
    pub name: &'a str,
    pub capital: &'a [(&'a str, f64)],
    pub recurring: &'a [(&'a str, f64, f64)],
    pub maintenance: Option<f64>,
}

/// Builds descriptor text with the financial lines of `generators`,
/// interleaved with ordinary object lines.
pub fn descriptor_text(generators: &[DescriptorGenerator<'_>]) -> String {
    let mut out = String::from("Version,8.2;\n\nBuilding,\n  Demo Building;          !- Name\n\n");
    for g in generators {
        writeln!(out, "  !!!!Y Honeybee generation system name - {}", g.name).unwrap();
        for (item, cost) in g.capital {
            writeln!(out, "  !!!X [{item} - {cost}]").unwrap();
        }
        for (item, cost, years) in g.recurring {
            writeln!(out, "  !!!Z [{item} - {cost} replacement time = {years} years]").unwrap();
        }
        if let Some(cost) = g.maintenance {
            writeln!(out, "  !!!X [Honeybee system annual maintenance cost - {cost}]").unwrap();
        }
        writeln!(out, "    5;                       !- Battery replacement time").unwrap();
        out.push_str("ElectricLoadCenter:Distribution,\n  Load Center;\n\n");
    }
    out
}

/// Builds `.eio` text for `location` running from `start` to `end` (`MM/DD`).
pub fn eio_text(location: &str, start: &str, end: &str) -> String {
    format!(
        "Program Version,EnergyPlus, Version 8.2.0\n\
         Site:Location,{location} WMO#=946100,-31.93,115.95,8.00,20.00\n\
         WeatherFileRunPeriod,1,Annual,{start},{end}\n"
    )
}

/// Input files written to a temporary directory.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub results: PathBuf,
    pub descriptor: PathBuf,
}

impl Fixture {
    /// Writes `results.csv` and `model.idf`, plus `results.eio` when given.
    pub fn write(results: &str, descriptor: &str, eio: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let results_path = dir.path().join("results.csv");
        let descriptor_path = dir.path().join("model.idf");
        fs::write(&results_path, results).expect("write result table");
        fs::write(&descriptor_path, descriptor).expect("write descriptor");
        if let Some(eio) = eio {
            fs::write(dir.path().join("results.eio"), eio).expect("write eio");
        }
        Self {
            dir,
            results: results_path,
            descriptor: descriptor_path,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Annual hourly series with a constant value.
pub fn constant_series(label: SeriesLabel, value: f64) -> TimeSeries {
    let mut series = TimeSeries::new(label, IntervalKind::Hourly, RunPeriodContext::annual("Test"));
    series.values = vec![value; HOURS];
    series
}

/// Annual hourly generator series with a constant production.
pub fn constant_generator(name: &str, kwh: f64) -> GeneratorSeries {
    let mut generator = GeneratorSeries::new(name, IntervalKind::Hourly, RunPeriodContext::annual("Test"));
    generator.series.values = vec![kwh; HOURS];
    generator
}

/// Flat hourly schedule.
pub fn flat_schedule(value: f64) -> ExpandedSchedule {
    ExpandedSchedule {
        interval: IntervalKind::Hourly,
        values: vec![value; HOURS],
    }
}

/// Asserts two money amounts agree to within a tenth of a cent.
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}
