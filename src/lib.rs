//! Cashflow projection for on-site generation systems from building
//! energy simulation results.

/// Renderer-agnostic chart layout.
pub mod chart;
pub mod config;
pub mod error;
pub mod io;
/// Result table, financial block and run-period parsers.
pub mod parse;
pub mod pipeline;
pub mod profile;
/// Normalized energy series and run provenance.
pub mod series;
/// Schedule expansion, cashflow simulation and reporting.
pub mod sim;
