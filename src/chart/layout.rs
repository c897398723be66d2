//! Projection of a cashflow result onto 2D chart primitives.
//!
//! The layout is renderer-agnostic: every shape is a quad with four
//! corners in chart units, already translated by the chart origin.

use serde::Serialize;

use crate::series::round_to_cents;
use crate::sim::types::CashflowResult;

use super::palette::{AXIS, Rgb, color_for};

/// Width of one chart unit of `x_scale`.
pub const BASE_WIDTH: f64 = 135.0;
/// Height of one chart unit of `y_scale`.
pub const BASE_HEIGHT: f64 = 50.0;
/// Share of the chart height the tallest stack may fill.
pub const MAX_FILL: f64 = 0.8;
/// Axis overshoot beyond the largest stack.
pub const AXIS_HEADROOM: f64 = 0.15;
/// Default spacing of the value ticks.
pub const DEFAULT_TICK_STEP: f64 = 5000.0;

const CAPITAL_BAR_WIDTH: f64 = 0.0375;
const YEAR_BAR_WIDTH: f64 = 0.03;
const YEAR_TICK_SLOTS: f64 = 26.0;
const TICK_LENGTH: f64 = 1.0;
const TICK_THICKNESS: f64 = 0.2;
const TICK_LABEL_OFFSET: Point = Point { x: -4.0, y: -0.35 };
const AXIS_THICKNESS: f64 = 0.15;
const YEAR_TICK_THICKNESS: f64 = 0.1;
/// Most value ticks drawn on either side of the axis.
pub const MAX_VALUE_TICKS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// Four corners, counter-clockwise from the anchor corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    /// Axis-aligned rectangle from `anchor` spanning `width` by `height`;
    /// a negative height extends downward.
    pub fn rect(anchor: Point, width: f64, height: f64) -> Self {
        Self {
            corners: [
                anchor,
                Point::new(anchor.x + width, anchor.y),
                Point::new(anchor.x + width, anchor.y + height),
                Point::new(anchor.x, anchor.y + height),
            ],
        }
    }

    fn translated(self, by: Point) -> Self {
        Self {
            corners: self.corners.map(|p| p.offset(by)),
        }
    }

    pub fn min_y(&self) -> f64 {
        self.corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min)
    }

    pub fn max_y(&self) -> f64 {
        self.corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarKind {
    /// Year-0 purchase.
    Capital,
    Income,
    /// Replacement plus maintenance.
    Cost,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub generator: String,
    pub year: u32,
    pub kind: BarKind,
    /// Signed value in currency: negative for spending.
    pub value: f64,
    pub quad: Quad,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    pub text: String,
    pub anchor: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub quad: Quad,
    pub label: TextLabel,
}

/// Size and placement of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartParams {
    pub x_scale: f64,
    pub y_scale: f64,
    pub origin: Point,
    pub tick_step: f64,
}

impl Default for ChartParams {
    fn default() -> Self {
        Self {
            x_scale: 1.0,
            y_scale: 1.0,
            origin: Point::ORIGIN,
            tick_step: DEFAULT_TICK_STEP,
        }
    }
}

/// Everything needed to draw the cashflow chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    /// Chart units per currency unit.
    pub value_scale: f64,
    pub boundary: Quad,
    pub bars: Vec<Bar>,
    /// Year-0 bar value labels.
    pub labels: Vec<TextLabel>,
    pub value_ticks: Vec<Tick>,
    pub year_ticks: Vec<Tick>,
    /// Vertical axis, then horizontal axis.
    pub axes: [Quad; 2],
    pub axis_color: Rgb,
}

/// Largest positive and negative stack over every year.
fn stack_extents(result: &CashflowResult) -> (f64, f64) {
    let capital: f64 = result.generators.iter().map(|g| g.capital_cost).sum();
    let mut max_positive: f64 = 0.0;
    let mut max_negative = capital;
    for year in 1..=result.horizon() {
        let income: f64 = result
            .generators
            .iter()
            .filter_map(|g| g.entry(year))
            .map(|e| e.income.max(0.0))
            .sum();
        let costs: f64 = result.generators.iter().map(|g| g.costs_in(year)).sum();
        max_positive = max_positive.max(income);
        max_negative = max_negative.max(costs);
    }
    (max_positive, max_negative)
}

/// Widens `step` when it would place more than [`MAX_VALUE_TICKS`] ticks
/// below `domain`.
fn tick_step_for(domain: f64, step: f64) -> f64 {
    step.max(domain / MAX_VALUE_TICKS as f64)
}

fn value_ticks(domain: f64, step: f64, sign: f64, scale: f64) -> Vec<Tick> {
    if !(step > 0.0) || !domain.is_finite() {
        return Vec::new();
    }
    let step = tick_step_for(domain, step);
    let mut ticks = Vec::new();
    for k in 0..=MAX_VALUE_TICKS {
        let marking = k as f64 * step;
        if marking >= domain {
            break;
        }
        let y = sign * marking * scale;
        let anchor = Point::new(-TICK_LENGTH, y - TICK_THICKNESS);
        let text = if sign < 0.0 && marking > 0.0 {
            format!("{}", -marking)
        } else {
            format!("{marking}")
        };
        ticks.push(Tick {
            quad: Quad::rect(anchor, TICK_LENGTH, TICK_THICKNESS),
            label: TextLabel {
                text,
                anchor: Point::new(0.0, y).offset(TICK_LABEL_OFFSET),
            },
        });
    }
    ticks
}

/// Lays out the cashflow chart for `result`.
///
/// Pure and deterministic: the same inputs give the same layout.
pub fn project(result: &CashflowResult, params: &ChartParams) -> ChartLayout {
    let width = BASE_WIDTH * params.x_scale;
    let height = BASE_HEIGHT * params.y_scale;

    let (max_positive, max_negative) = stack_extents(result);
    let extent = max_positive.max(max_negative);
    let value_scale = if extent > 0.0 { MAX_FILL * height / extent } else { 0.0 };

    let mut bars = Vec::new();
    let mut labels = Vec::new();

    // Year 0: capital stacked downward.
    let mut base = 0.0;
    for (i, g) in result.generators.iter().enumerate() {
        let value = -g.capital_cost;
        let bar_height = value * value_scale;
        bars.push(Bar {
            generator: g.name.clone(),
            year: 0,
            kind: BarKind::Capital,
            value,
            quad: Quad::rect(Point::new(0.0, base), CAPITAL_BAR_WIDTH * width, bar_height),
            color: color_for(i),
        });
        labels.push(TextLabel {
            text: format!("{:.2}", round_to_cents(value)),
            anchor: Point::new(0.0, base + bar_height / 2.0),
        });
        base += bar_height;
    }

    let year_width = YEAR_BAR_WIDTH * width;
    for year in 1..=result.horizon() {
        let x = f64::from(year) * width / 25.0;
        let mut up = 0.0;
        let mut down = 0.0;
        for (i, g) in result.generators.iter().enumerate() {
            let Some(entry) = g.entry(year) else {
                continue;
            };
            if entry.income != 0.0 {
                let bar_height = entry.income * value_scale;
                bars.push(Bar {
                    generator: g.name.clone(),
                    year,
                    kind: BarKind::Income,
                    value: entry.income,
                    quad: Quad::rect(Point::new(x, up), year_width, bar_height),
                    color: color_for(i),
                });
                up += bar_height;
            }
            let cost = entry.replacement_cost + entry.maintenance_cost;
            if cost != 0.0 {
                let bar_height = -cost * value_scale;
                bars.push(Bar {
                    generator: g.name.clone(),
                    year,
                    kind: BarKind::Cost,
                    value: -cost,
                    quad: Quad::rect(Point::new(x, down), year_width, bar_height),
                    color: color_for(i),
                });
                down += bar_height;
            }
        }
    }

    let positive_domain = max_positive * (1.0 + AXIS_HEADROOM);
    let negative_domain = max_negative * (1.0 + AXIS_HEADROOM);

    let mut value_ticks_all = value_ticks(positive_domain, params.tick_step, 1.0, value_scale);
    value_ticks_all.extend(value_ticks(negative_domain, params.tick_step, -1.0, value_scale));

    let axis_bottom = -negative_domain * value_scale;
    let axis_span = (positive_domain + negative_domain) * value_scale;
    let slot = width / YEAR_TICK_SLOTS;
    let year_ticks: Vec<Tick> = (0..=25_u32)
        .map(|year| {
            let x = f64::from(year) * slot;
            Tick {
                quad: Quad::rect(Point::new(x, axis_bottom), YEAR_TICK_THICKNESS, axis_span),
                label: TextLabel {
                    text: year.to_string(),
                    anchor: Point::new(x + slot / 2.0, axis_bottom),
                },
            }
        })
        .collect();

    let axes = [
        Quad::rect(Point::new(0.0, axis_bottom), AXIS_THICKNESS, axis_span),
        Quad::rect(Point::ORIGIN, width, AXIS_THICKNESS),
    ];

    let origin = params.origin;
    let shift_label = |l: TextLabel| TextLabel {
        anchor: l.anchor.offset(origin),
        ..l
    };
    let shift_tick = |t: Tick| Tick {
        quad: t.quad.translated(origin),
        label: shift_label(t.label),
    };

    ChartLayout {
        width,
        height,
        value_scale,
        boundary: Quad::rect(Point::ORIGIN, width, height).translated(origin),
        bars: bars
            .into_iter()
            .map(|b| Bar {
                quad: b.quad.translated(origin),
                ..b
            })
            .collect(),
        labels: labels.into_iter().map(&shift_label).collect(),
        value_ticks: value_ticks_all.into_iter().map(&shift_tick).collect(),
        year_ticks: year_ticks.into_iter().map(&shift_tick).collect(),
        axes: axes.map(|q| q.translated(origin)),
        axis_color: AXIS,
    }
}
