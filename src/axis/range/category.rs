use super::{AxisKind, LinearRange, RangeAlgorithm, RangeRequest};
use crate::axis::AxisConfig;
use crate::core::{AxisRange, calculate_new_scale};

/// Named categories placed at integer positions `0..n`.
///
/// Without categories it behaves like a linear axis.
#[derive(Debug, Clone, Default)]
pub struct CategoryRange {
    categories: Vec<String>,
}

impl CategoryRange {
    #[must_use]
    pub fn new(categories: Vec<String>) -> Self {
        Self { categories }
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    fn category_bounds(&self) -> (f64, f64) {
        let last = self.categories.len().saturating_sub(1) as f64;
        (0.0, last)
    }
}

impl RangeAlgorithm for CategoryRange {
    fn kind(&self) -> AxisKind {
        AxisKind::Category
    }

    fn auto_range(&self, data_min: f64, data_max: f64, request: RangeRequest<'_>) -> AxisRange {
        if self.categories.is_empty() {
            return LinearRange.auto_range(data_min, data_max, request);
        }
        let (min, max) = self.category_bounds();
        let scale = calculate_new_scale(request.side, request.length, min, max);
        AxisRange::new(min, max, request.length, scale, 1.0)
    }

    fn compute_range(&self, min: f64, max: f64, request: RangeRequest<'_>) -> AxisRange {
        if self.categories.is_empty() {
            return LinearRange.compute_range(min, max, request);
        }
        let scale = calculate_new_scale(request.side, request.length, min, max);
        AxisRange::new(min, max, request.length, scale, 1.0)
    }

    fn preferred_tick_unit(&self, min: f64, max: f64, length: f64, config: &AxisConfig) -> f64 {
        if self.categories.is_empty() {
            return LinearRange.preferred_tick_unit(min, max, length, config);
        }
        1.0
    }

    fn major_tick_values(&self, range: &AxisRange) -> Vec<f64> {
        if self.categories.is_empty() {
            return LinearRange.major_tick_values(range);
        }
        (0..self.categories.len())
            .map(|index| index as f64)
            .filter(|value| *value >= range.min && *value <= range.max)
            .collect()
    }

    fn minor_tick_values(
        &self,
        range: &AxisRange,
        major: &[f64],
        minor_tick_count: usize,
    ) -> Vec<f64> {
        if self.categories.is_empty() {
            return LinearRange.minor_tick_values(range, major, minor_tick_count);
        }
        Vec::new()
    }

    fn category_label(&self, value: f64) -> Option<String> {
        if value.fract() != 0.0 || value < 0.0 {
            return None;
        }
        self.categories.get(value as usize).cloned()
    }
}
