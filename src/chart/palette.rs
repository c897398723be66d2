//! Color constants for the cashflow chart.

use serde::Serialize;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Axis, tick and label color.
pub const AXIS: Rgb = Rgb::new(0, 0, 0);

/// Generator colors, assigned in result order.
pub const GENERATOR_COLORS: [Rgb; 8] = [
    Rgb::new(0, 0, 205),     // medium blue
    Rgb::new(255, 0, 0),     // red
    Rgb::new(255, 255, 0),   // yellow
    Rgb::new(248, 248, 255), // ghost white
    Rgb::new(75, 0, 130),    // indigo
    Rgb::new(255, 215, 0),   // gold
    Rgb::new(220, 20, 60),   // crimson
    Rgb::new(192, 192, 192), // silver
];

/// Color of the generator at `index`; wraps after eight generators.
pub fn color_for(index: usize) -> Rgb {
    GENERATOR_COLORS[index % GENERATOR_COLORS.len()]
}
