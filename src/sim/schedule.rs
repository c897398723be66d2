//! Expansion of tariff schedules to the simulation timeline.

use thiserror::Error;

use crate::series::{DAYS_IN_MONTH, IntervalKind};

/// Hours per day times months per year.
pub const HOUR_OF_DAY_BY_MONTH_LEN: usize = 24 * 12;

/// Errors raised while expanding a schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("schedule has no values")]
    EmptySchedule,
    #[error("schedule has {len} values, expected 1, 288 or {expected}")]
    InvalidLength { len: usize, expected: usize },
}

/// A tariff schedule as supplied by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleInput {
    /// One rate for every timestep.
    FlatRate(f64),
    /// 24 hourly rates for each of the 12 months, January first.
    HourOfDayByMonth(Vec<f64>),
    /// Already one value per timestep of the target interval.
    PerTimestep(Vec<f64>),
}

/// Schedule values aligned with one interval's canonical timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedSchedule {
    pub interval: IntervalKind,
    pub values: Vec<f64>,
}

impl ExpandedSchedule {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Turns a [`ScheduleInput`] into one value per simulation timestep.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScheduleExpander;

impl ScheduleExpander {
    /// Expands `input` to `target`'s canonical point count.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::EmptySchedule`] for an empty list and
    /// [`ScheduleError::InvalidLength`] for a list of the wrong shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use gen_cashflow::series::IntervalKind;
    /// use gen_cashflow::sim::schedule::{ScheduleExpander, ScheduleInput};
    ///
    /// let expanded = ScheduleExpander::expand(&ScheduleInput::FlatRate(5.0), IntervalKind::Hourly).unwrap();
    /// assert_eq!(expanded.len(), 8760);
    /// assert!(expanded.values.iter().all(|&v| v == 5.0));
    /// ```
    pub fn expand(input: &ScheduleInput, target: IntervalKind) -> Result<ExpandedSchedule, ScheduleError> {
        let values = match input {
            ScheduleInput::FlatRate(rate) => vec![*rate; target.points()],
            ScheduleInput::HourOfDayByMonth(values) => {
                if values.is_empty() {
                    return Err(ScheduleError::EmptySchedule);
                }
                if values.len() != HOUR_OF_DAY_BY_MONTH_LEN {
                    return Err(ScheduleError::InvalidLength {
                        len: values.len(),
                        expected: target.points(),
                    });
                }
                expand_monthly_profile(values, target)
            }
            ScheduleInput::PerTimestep(values) => {
                if values.is_empty() {
                    return Err(ScheduleError::EmptySchedule);
                }
                if values.len() != target.points() {
                    return Err(ScheduleError::InvalidLength {
                        len: values.len(),
                        expected: target.points(),
                    });
                }
                values.clone()
            }
        };
        Ok(ExpandedSchedule {
            interval: target,
            values,
        })
    }

    /// Classifies a raw list by its length and expands it.
    ///
    /// One value is a flat rate, 288 an hour-of-day-by-month profile, and
    /// the target's own count is taken as is. A target with 288 points does
    /// not exist, so the cases never overlap.
    ///
    /// # Errors
    ///
    /// As [`ScheduleExpander::expand`].
    pub fn expand_values(values: &[f64], target: IntervalKind) -> Result<ExpandedSchedule, ScheduleError> {
        Self::expand(&Self::classify(values, target)?, target)
    }

    /// Wraps a raw list in the matching [`ScheduleInput`] variant.
    ///
    /// # Errors
    ///
    /// As [`ScheduleExpander::expand`].
    pub fn classify(values: &[f64], target: IntervalKind) -> Result<ScheduleInput, ScheduleError> {
        match values.len() {
            0 => Err(ScheduleError::EmptySchedule),
            1 => Ok(ScheduleInput::FlatRate(values[0])),
            HOUR_OF_DAY_BY_MONTH_LEN => Ok(ScheduleInput::HourOfDayByMonth(values.to_vec())),
            n if n == target.points() => Ok(ScheduleInput::PerTimestep(values.to_vec())),
            len => Err(ScheduleError::InvalidLength {
                len,
                expected: target.points(),
            }),
        }
    }
}

fn expand_monthly_profile(values: &[f64], target: IntervalKind) -> Vec<f64> {
    let months = values.chunks(24).zip(DAYS_IN_MONTH);
    match target {
        IntervalKind::Hourly => months
            .flat_map(|(hours, days)| hours.iter().copied().cycle().take(24 * days))
            .collect(),
        IntervalKind::Daily => months
            .flat_map(|(hours, days)| std::iter::repeat_n(month_mean(hours), days))
            .collect(),
        IntervalKind::Monthly => months.map(|(hours, _)| month_mean(hours)).collect(),
        IntervalKind::RunPeriod => {
            vec![values.iter().sum::<f64>() / values.len() as f64]
        }
    }
}

fn month_mean(hours: &[f64]) -> f64 {
    hours.iter().sum::<f64>() / 24.0
}
