//! Parsers for the simulation result table and its descriptor file.

/// Financial block extraction from descriptor lines.
pub mod financial;
/// Result-table column discovery and series accumulation.
pub mod result_table;
pub mod run_period;

pub use financial::{FinancialBlockParser, FinancialError};
pub use result_table::{ColumnKind, ParseError, ParsedResults, ResultTableParser};
pub use run_period::read_run_period;
