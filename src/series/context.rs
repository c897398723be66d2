//! Location and run-period metadata shared by every parsed series.

use std::fmt;

use serde::Serialize;

/// Location reported when no descriptor metadata is available.
pub const NO_LOCATION: &str = "NoLocation";

/// A `(month, day, hour)` point of the simulation calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarPoint {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl CalendarPoint {
    pub const fn new(month: u32, day: u32, hour: u32) -> Self {
        Self { month, day, hour }
    }

    /// First hour of the year.
    pub const YEAR_START: CalendarPoint = CalendarPoint::new(1, 1, 1);
    /// Last hour of the year.
    pub const YEAR_END: CalendarPoint = CalendarPoint::new(12, 31, 24);
}

impl fmt::Display for CalendarPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.month, self.day, self.hour)
    }
}

/// Provenance of a simulation run: where and over which dates it ran.
///
/// Produced once from the descriptor (see [`crate::parse::run_period`]) and
/// cloned into every series, so no stage reads shared mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPeriodContext {
    pub location: String,
    pub start: Option<CalendarPoint>,
    pub end: Option<CalendarPoint>,
}

impl Default for RunPeriodContext {
    fn default() -> Self {
        Self {
            location: NO_LOCATION.to_string(),
            start: None,
            end: None,
        }
    }
}

impl RunPeriodContext {
    /// Context for a full calendar year at `location`.
    pub fn annual(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            start: Some(CalendarPoint::YEAR_START),
            end: Some(CalendarPoint::YEAR_END),
        }
    }

    /// Whether the run starts on Jan 1 hour 1 and ends on Dec 31 hour 24.
    pub fn is_full_year(&self) -> bool {
        self.start == Some(CalendarPoint::YEAR_START) && self.end == Some(CalendarPoint::YEAR_END)
    }

    pub fn describe_start(&self) -> String {
        self.start.map_or_else(|| "NoDate".to_string(), |p| p.to_string())
    }

    pub fn describe_end(&self) -> String {
        self.end.map_or_else(|| "NoDate".to_string(), |p| p.to_string())
    }
}
