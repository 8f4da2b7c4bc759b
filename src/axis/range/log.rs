use super::{AxisKind, MAX_TICK_VALUES, RangeAlgorithm, RangeRequest};
use crate::axis::AxisConfig;
use crate::core::{AxisRange, calculate_new_scale};

/// Ratio between the bounds when no positive data exists.
const DEFAULT_DECADES: f64 = 1e6;

/// Base-10 logarithmic axis. Positions interpolate in `log10` space, majors sit
/// on decades and minors on the `2..9` multiples inside each decade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRange;

impl LogRange {
    fn positive_extent(data_min: f64, data_max: f64) -> (f64, f64) {
        let (min, max) = (data_min.min(data_max), data_min.max(data_max));
        match (min > 0.0 && min.is_finite(), max > 0.0 && max.is_finite()) {
            (true, true) => (min, max),
            (false, true) => (max / DEFAULT_DECADES, max),
            _ => (1.0, DEFAULT_DECADES),
        }
    }
}

impl RangeAlgorithm for LogRange {
    fn kind(&self) -> AxisKind {
        AxisKind::Log
    }

    fn auto_range(&self, data_min: f64, data_max: f64, request: RangeRequest<'_>) -> AxisRange {
        let config = request.config;
        let (mut min, mut max) = Self::positive_extent(data_min, data_max);
        let decades = max.log10() - min.log10();
        let padding = decades * config.auto_range_padding;
        if padding.is_finite() && padding > 0.0 {
            min = 10.0_f64.powf(min.log10() - padding);
            max = 10.0_f64.powf(max.log10() + padding);
        }
        if config.auto_range_rounding {
            min = 10.0_f64.powf(min.log10().floor());
            max = 10.0_f64.powf(max.log10().ceil());
        }
        let scale = calculate_new_scale(request.side, request.length, min.log10(), max.log10());
        AxisRange::new(min, max, request.length, scale, 10.0)
    }

    fn compute_range(&self, min: f64, max: f64, request: RangeRequest<'_>) -> AxisRange {
        let scale = calculate_new_scale(request.side, request.length, min.log10(), max.log10());
        AxisRange::new(min, max, request.length, scale, 10.0)
    }

    fn preferred_tick_unit(&self, _min: f64, _max: f64, _length: f64, _config: &AxisConfig) -> f64 {
        10.0
    }

    fn major_tick_values(&self, range: &AxisRange) -> Vec<f64> {
        if !is_positive_range(range) {
            return Vec::new();
        }
        let first = (range.min.log10() - 1e-9).ceil() as i32;
        let last = (range.max.log10() + 1e-9).floor() as i32;
        (first..=last)
            .take(MAX_TICK_VALUES)
            .map(|exponent| 10.0_f64.powi(exponent))
            .collect()
    }

    fn minor_tick_values(
        &self,
        range: &AxisRange,
        _major: &[f64],
        _minor_tick_count: usize,
    ) -> Vec<f64> {
        if !is_positive_range(range) {
            return Vec::new();
        }
        let first = range.min.log10().floor() as i32;
        let last = range.max.log10().ceil() as i32;
        let mut values = Vec::new();
        for exponent in first..last {
            let decade = 10.0_f64.powi(exponent);
            for multiple in 2..=9 {
                let value = decade * f64::from(multiple);
                if value >= range.min && value <= range.max {
                    values.push(value);
                }
            }
            if values.len() > MAX_TICK_VALUES {
                break;
            }
        }
        values
    }

    fn transform(&self, value: f64) -> f64 {
        value.log10()
    }

    fn inverse_transform(&self, value: f64) -> f64 {
        10.0_f64.powf(value)
    }
}

fn is_positive_range(range: &AxisRange) -> bool {
    range.min > 0.0 && range.max >= range.min && range.max.is_finite()
}

#[cfg(test)]
mod tests {
    use super::LogRange;
    use crate::axis::AxisConfig;
    use crate::axis::range::{RangeAlgorithm, RangeRequest};
    use crate::core::{AxisRange, Side};

    #[test]
    fn majors_sit_on_decades() {
        let range = AxisRange::new(0.5, 2_000.0, 100.0, 1.0, 10.0);
        assert_eq!(LogRange.major_tick_values(&range), vec![1.0, 10.0, 100.0, 1_000.0]);
    }

    #[test]
    fn minors_fill_each_decade() {
        let range = AxisRange::new(1.0, 100.0, 100.0, 1.0, 10.0);
        let minor = LogRange.minor_tick_values(&range, &[], 10);
        assert_eq!(minor.len(), 16);
        assert_eq!(minor[0], 2.0);
        assert_eq!(minor[15], 90.0);
    }

    #[test]
    fn non_positive_data_falls_back_to_positive_range() {
        let config = AxisConfig::default();
        let request = RangeRequest {
            side: Side::Left,
            length: 100.0,
            label_size: 12.0,
            config: &config,
        };
        let range = LogRange.auto_range(-3.0, 0.0, request);
        assert!(range.min > 0.0);
        assert!(range.max > range.min);
    }
}
