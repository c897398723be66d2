//! Renderer-agnostic cashflow chart layout.

pub mod layout;
/// Generator and axis colors.
pub mod palette;

pub use layout::{ChartLayout, ChartParams, Point, project};
