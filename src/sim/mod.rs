pub mod account;
/// Income allocation and multi-year projection.
pub mod cashflow;
pub mod report;
/// Tariff schedule expansion.
pub mod schedule;
pub mod types;

pub use cashflow::{CashflowSimulator, SimError};
pub use schedule::{ExpandedSchedule, ScheduleError, ScheduleExpander, ScheduleInput};
pub use types::{CashflowResult, GeneratorCashflow, ProjectionConfig, SimulationInputs, YearEntry};
