//! Typed time series extracted from simulation result tables.

use std::fmt;

use serde::Serialize;

pub mod context;

pub use context::{CalendarPoint, RunPeriodContext};

/// Joules in one kilowatt-hour.
pub const JOULES_PER_KWH: f64 = 3_600_000.0;

/// Days per month of the fixed (non-leap) simulation calendar.
pub const DAYS_IN_MONTH: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Leading field of the 7-field provenance record attached to every series.
pub const HEADER_KEY: &str = "key:location/dataType/units/frequency/startsAt/endsAt";

/// Rounds to two decimal places, the precision of every normalized value.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reporting interval declared by a result-table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IntervalKind {
    /// One value for the whole run period.
    RunPeriod,
    /// One value per calendar month.
    Monthly,
    /// One value per day.
    Daily,
    /// One value per hour.
    Hourly,
}

impl IntervalKind {
    /// All intervals, coarsest first.
    pub const ALL: [IntervalKind; 4] = [
        IntervalKind::RunPeriod,
        IntervalKind::Monthly,
        IntervalKind::Daily,
        IntervalKind::Hourly,
    ];

    /// Canonical number of points a full simulated year produces.
    ///
    /// # Examples
    ///
    /// ```
    /// use gen_cashflow::series::IntervalKind;
    ///
    /// assert_eq!(IntervalKind::Hourly.points(), 8760);
    /// assert_eq!(IntervalKind::Monthly.points(), 12);
    /// ```
    pub fn points(self) -> usize {
        match self {
            IntervalKind::RunPeriod => 1,
            IntervalKind::Monthly => 12,
            IntervalKind::Daily => 365,
            IntervalKind::Hourly => 8760,
        }
    }

    /// Seconds covered by one reported value, used to turn a mean power into energy.
    pub fn seconds(self) -> f64 {
        match self {
            IntervalKind::RunPeriod => 31_536_000.0,
            IntervalKind::Monthly => 2_628_000.0,
            IntervalKind::Daily => 86_400.0,
            IntervalKind::Hourly => 3_600.0,
        }
    }

    /// Parses the label found inside a header's trailing parentheses.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(label))
    }

    /// Interval whose canonical point count equals `count`, if any.
    pub fn from_point_count(count: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.points() == count)
    }

    /// Label as written by the simulation engine.
    pub fn label(self) -> &'static str {
        match self {
            IntervalKind::RunPeriod => "RunPeriod",
            IntervalKind::Monthly => "Monthly",
            IntervalKind::Daily => "Daily",
            IntervalKind::Hourly => "Hourly",
        }
    }
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Physical unit of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    /// Mean power over the reporting interval.
    Watts,
    /// Energy over the reporting interval.
    Joules,
    /// Normalized energy.
    KilowattHours,
}

impl Unit {
    /// Converts a raw value reported over `interval` to kWh, rounded to cents.
    ///
    /// Power values are multiplied by the interval length in seconds; energy
    /// values only need the J→kWh division.
    pub fn to_kwh(self, value: f64, interval: IntervalKind) -> f64 {
        let kwh = match self {
            Unit::Watts => value * interval.seconds() / JOULES_PER_KWH,
            Unit::Joules => value / JOULES_PER_KWH,
            Unit::KilowattHours => value,
        };
        round_to_cents(kwh)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Watts => "W",
            Unit::Joules => "J",
            Unit::KilowattHours => "Kwh",
        }
    }
}

/// Semantic meaning of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SeriesLabel {
    /// Facility total electric demand.
    Demand,
    /// Facility net purchased electricity.
    NetPurchased,
    /// Electricity produced by the named generation system.
    GeneratorProduction(String),
}

impl SeriesLabel {
    /// Data-type text used in the provenance record.
    pub fn data_type(&self) -> String {
        match self {
            SeriesLabel::Demand => "Whole Building:Facility Total Electric Demand Power".to_string(),
            SeriesLabel::NetPurchased => {
                "Whole Building:Facility Net Purchased Electric Energy".to_string()
            }
            SeriesLabel::GeneratorProduction(name) => {
                format!("Electric energy produced by the generator system named - {name}")
            }
        }
    }
}

/// The 7-field provenance record emitted in front of every output series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesHeader {
    pub location: String,
    pub data_type: String,
    pub units: String,
    pub frequency: IntervalKind,
    pub starts_at: Option<CalendarPoint>,
    pub ends_at: Option<CalendarPoint>,
}

impl SeriesHeader {
    /// Renders the record as its seven text fields, marker first.
    pub fn fields(&self) -> [String; 7] {
        let date = |p: &Option<CalendarPoint>| p.map_or_else(|| "NoDate".to_string(), |p| p.to_string());
        [
            HEADER_KEY.to_string(),
            self.location.clone(),
            self.data_type.clone(),
            self.units.clone(),
            self.frequency.to_string(),
            date(&self.starts_at),
            date(&self.ends_at),
        ]
    }
}

/// A normalized series of values at one reporting interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub label: SeriesLabel,
    pub interval: IntervalKind,
    pub unit: Unit,
    pub values: Vec<f64>,
    pub provenance: RunPeriodContext,
}

impl TimeSeries {
    /// Creates an empty kWh series.
    pub fn new(label: SeriesLabel, interval: IntervalKind, provenance: RunPeriodContext) -> Self {
        Self {
            label,
            interval,
            unit: Unit::KilowattHours,
            values: Vec::new(),
            provenance,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the series holds exactly one full year at its interval.
    pub fn is_complete(&self) -> bool {
        self.values.len() == self.interval.points()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Provenance record for this series.
    pub fn header(&self) -> SeriesHeader {
        SeriesHeader {
            location: self.provenance.location.clone(),
            data_type: self.label.data_type(),
            units: self.unit.symbol().to_string(),
            frequency: self.interval,
            starts_at: self.provenance.start,
            ends_at: self.provenance.end,
        }
    }

    /// Short name used in diagnostics.
    pub fn describe(&self) -> String {
        match &self.label {
            SeriesLabel::Demand => "facility demand".to_string(),
            SeriesLabel::NetPurchased => "net purchased electricity".to_string(),
            SeriesLabel::GeneratorProduction(name) => format!("generator `{name}` production"),
        }
    }
}

/// Production series of one on-site generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorSeries {
    pub name: String,
    pub series: TimeSeries,
}

impl GeneratorSeries {
    pub fn new(name: impl Into<String>, interval: IntervalKind, provenance: RunPeriodContext) -> Self {
        let name = name.into();
        Self {
            series: TimeSeries::new(
                SeriesLabel::GeneratorProduction(name.clone()),
                interval,
                provenance,
            ),
            name,
        }
    }

    pub fn production(&self) -> &[f64] {
        &self.series.values
    }
}
