//! Pluggable range algorithms.
//!
//! An axis owns exactly one algorithm chosen at construction. The algorithm
//! decides bounds, tick units and tick values; the axis does everything else.

mod category;
mod linear;
mod log;
mod time;

use std::fmt;

use serde::{Deserialize, Serialize};

use super::AxisConfig;
use crate::core::{AxisRange, Side};

pub use category::CategoryRange;
pub use linear::LinearRange;
pub use log::LogRange;
pub use time::TimeRange;
pub(crate) use time::{DAY, MONTH, YEAR};

/// Tick count above which tick generation gives up and returns the bounds.
pub(crate) const MAX_TICK_VALUES: usize = 10_000;

/// Fallback tick unit for empty or non-finite spans.
const MIN_TICK_UNIT: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisKind {
    Linear,
    Log,
    Time,
    Category,
}

/// Inputs of a range computation besides the bounds themselves.
#[derive(Debug, Clone, Copy)]
pub struct RangeRequest<'a> {
    pub side: Side,
    pub length: f64,
    /// Approximate label extent along the axis.
    pub label_size: f64,
    pub config: &'a AxisConfig,
}

pub trait RangeAlgorithm: fmt::Debug {
    fn kind(&self) -> AxisKind;

    fn is_log(&self) -> bool {
        self.kind() == AxisKind::Log
    }

    fn is_time(&self) -> bool {
        self.kind() == AxisKind::Time
    }

    /// Candidate range for observed data extents, honoring padding, rounding
    /// and force-zero options. Must not depend on the axis' current bounds.
    fn auto_range(&self, data_min: f64, data_max: f64, request: RangeRequest<'_>) -> AxisRange;

    /// Range for user-fixed bounds.
    fn compute_range(&self, min: f64, max: f64, request: RangeRequest<'_>) -> AxisRange;

    fn preferred_tick_unit(&self, min: f64, max: f64, length: f64, config: &AxisConfig) -> f64;

    fn major_tick_values(&self, range: &AxisRange) -> Vec<f64>;

    fn minor_tick_values(
        &self,
        range: &AxisRange,
        major: &[f64],
        minor_tick_count: usize,
    ) -> Vec<f64>;

    /// Maps a value into the linear space positions are interpolated in.
    fn transform(&self, value: f64) -> f64 {
        value
    }

    fn inverse_transform(&self, value: f64) -> f64 {
        value
    }

    /// Fixed label for `value`, bypassing the formatter.
    fn category_label(&self, _value: f64) -> Option<String> {
        None
    }
}

/// Label extent estimate shared by auto-ranging and tick unit selection.
pub(crate) fn tick_label_size(config: &AxisConfig) -> f64 {
    config.tick_label_style.font_size_px * 1.2
}

/// Number of ticks that fit `length` with labels of `label_size`.
pub(crate) fn tick_count_for_length(length: f64, label_size: f64, max_count: usize) -> usize {
    let max_count = max_count.max(2);
    if !length.is_finite() || !label_size.is_finite() || label_size <= 0.0 {
        return 2;
    }
    ((length / label_size).floor().max(0.0) as usize).clamp(2, max_count)
}

/// Smallest `{1, 2.5, 5} x 10^e` step at least `span / tick_count`.
pub(crate) fn nice_tick_unit(span: f64, tick_count: usize) -> f64 {
    let raw = span.abs() / tick_count.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return MIN_TICK_UNIT;
    }
    let exponent = raw.log10().floor();
    let magnitude = 10.0_f64.powf(exponent);
    let normalized = raw / magnitude;
    let factor = [1.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|factor| normalized <= *factor + 1e-9)
        .unwrap_or(10.0);
    factor * magnitude
}

/// Multiples of `unit` inside `[min, max]`.
pub(crate) fn stepped_values(min: f64, max: f64, unit: f64) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || !unit.is_finite() || unit <= 0.0 || max < min {
        return Vec::new();
    }
    let first_index = (min / unit - 1e-9).ceil();
    let last_index = (max / unit + 1e-9).floor();
    let count = last_index - first_index + 1.0;
    if count <= 0.0 {
        return Vec::new();
    }
    if count > MAX_TICK_VALUES as f64 {
        return vec![min, max];
    }
    (0..count as usize)
        .map(|offset| snap_to_zero((first_index + offset as f64) * unit, unit))
        .collect()
}

/// Removes floating noise such as `-0.0` or `1e-17` at the zero tick.
fn snap_to_zero(value: f64, unit: f64) -> f64 {
    if value.abs() < unit * 1e-9 { 0.0 } else { value }
}

/// Applies force-zero and padding to data extents.
pub(crate) fn padded_extent(data_min: f64, data_max: f64, config: &AxisConfig) -> (f64, f64) {
    let (mut min, mut max) = (data_min.min(data_max), data_min.max(data_max));
    if config.force_zero_in_range {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    let padding = (max - min) * config.auto_range_padding;
    if padding.is_finite() && padding > 0.0 {
        min -= padding;
        max += padding;
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{nice_tick_unit, stepped_values, tick_count_for_length};

    #[test]
    fn nice_units_follow_one_two_and_a_half_five_ladder() {
        assert_relative_eq!(nice_tick_unit(100.0, 10), 10.0);
        assert_relative_eq!(nice_tick_unit(100.0, 6), 25.0);
        assert_relative_eq!(nice_tick_unit(100.0, 30), 5.0);
        assert_relative_eq!(nice_tick_unit(0.3, 4), 0.1);
    }

    #[test]
    fn empty_span_falls_back_to_minimum_unit() {
        assert_relative_eq!(nice_tick_unit(0.0, 5), 1e-3);
        assert_relative_eq!(nice_tick_unit(f64::NAN, 5), 1e-3);
    }

    #[test]
    fn stepped_values_include_both_bounds() {
        assert_eq!(
            stepped_values(0.0, 100.0, 20.0),
            vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]
        );
        assert_eq!(stepped_values(-0.3, 0.3, 0.1).len(), 7);
        assert_eq!(stepped_values(-0.3, 0.3, 0.1)[3], 0.0);
    }

    #[test]
    fn tick_count_is_clamped() {
        assert_eq!(tick_count_for_length(0.0, 12.0, 20), 2);
        assert_eq!(tick_count_for_length(1_000.0, 12.0, 20), 20);
        assert_eq!(tick_count_for_length(120.0, 12.0, 20), 10);
    }
}
