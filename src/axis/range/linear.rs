use super::{
    AxisKind, RangeAlgorithm, RangeRequest, nice_tick_unit, padded_extent, stepped_values,
    tick_count_for_length, tick_label_size,
};
use crate::axis::AxisConfig;
use crate::core::{AxisRange, calculate_new_scale};

/// Plain numeric axis with `{1, 2.5, 5} x 10^e` tick units.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRange;

impl RangeAlgorithm for LinearRange {
    fn kind(&self) -> AxisKind {
        AxisKind::Linear
    }

    fn auto_range(&self, data_min: f64, data_max: f64, request: RangeRequest<'_>) -> AxisRange {
        let config = request.config;
        let (mut min, mut max) = padded_extent(data_min, data_max, config);
        let count = tick_count_for_length(
            request.length,
            request.label_size,
            config.max_major_tick_label_count,
        );
        let tick_unit = nice_tick_unit(max - min, count);
        if config.auto_range_rounding {
            min = (min / tick_unit).floor() * tick_unit;
            max = (max / tick_unit).ceil() * tick_unit;
        }
        let scale = calculate_new_scale(request.side, request.length, min, max);
        AxisRange::new(min, max, request.length, scale, tick_unit)
    }

    fn compute_range(&self, min: f64, max: f64, request: RangeRequest<'_>) -> AxisRange {
        let scale = calculate_new_scale(request.side, request.length, min, max);
        AxisRange::new(min, max, request.length, scale, request.config.tick_unit)
    }

    fn preferred_tick_unit(&self, min: f64, max: f64, length: f64, config: &AxisConfig) -> f64 {
        let count = tick_count_for_length(
            length,
            tick_label_size(config),
            config.max_major_tick_label_count,
        );
        nice_tick_unit(max - min, count)
    }

    fn major_tick_values(&self, range: &AxisRange) -> Vec<f64> {
        stepped_values(range.min, range.max, range.tick_unit)
    }

    fn minor_tick_values(
        &self,
        range: &AxisRange,
        major: &[f64],
        minor_tick_count: usize,
    ) -> Vec<f64> {
        if minor_tick_count < 2 || major.is_empty() {
            return Vec::new();
        }
        let unit = range.tick_unit;
        let minor_unit = unit / minor_tick_count as f64;
        let mut values = Vec::new();
        // One extra major interval below the first tick fills the gap to `min`.
        let first = major[0] - unit;
        for interval in 0..=major.len() {
            let start = first + interval as f64 * unit;
            for step in 1..minor_tick_count {
                let value = start + step as f64 * minor_unit;
                if value >= range.min && value <= range.max {
                    values.push(value);
                }
            }
            if values.len() > super::MAX_TICK_VALUES {
                break;
            }
        }
        values
    }
}
