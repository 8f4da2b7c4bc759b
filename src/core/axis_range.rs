use serde::{Deserialize, Serialize};

use super::Side;

/// Result of a range computation.
///
/// Immutable once returned; the axis consumes it to update its live bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    /// Screen extent in pixels.
    pub length: f64,
    pub scale: f64,
    pub tick_unit: f64,
}

impl AxisRange {
    #[must_use]
    pub fn new(min: f64, max: f64, length: f64, scale: f64, tick_unit: f64) -> Self {
        Self {
            min,
            max,
            length,
            scale,
            tick_unit,
        }
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Same bounds, ignoring length, scale and tick unit.
    #[must_use]
    pub fn same_bounds(&self, other: &AxisRange) -> bool {
        self.min.to_bits() == other.min.to_bits() && self.max.to_bits() == other.max.to_bits()
    }
}

/// Pixels per value unit for `side`.
///
/// Vertical axes get a negative scale since screen y grows downwards. An empty
/// value span maps to `±length`, and a zero result is clamped to `-1.0` for
/// every orientation.
#[must_use]
pub fn calculate_new_scale(side: Side, length: f64, lower: f64, upper: f64) -> f64 {
    let diff = upper - lower;
    let scale = if side.is_vertical() {
        if diff == 0.0 { -length } else { -(length / diff) }
    } else if diff == 0.0 {
        length
    } else {
        length / diff
    };
    if scale == 0.0 { -1.0 } else { scale }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{AxisRange, calculate_new_scale};
    use crate::core::Side;

    #[test]
    fn horizontal_scale_is_positive() {
        assert_relative_eq!(calculate_new_scale(Side::Bottom, 200.0, 0.0, 100.0), 2.0);
    }

    #[test]
    fn vertical_scale_is_negated() {
        assert_relative_eq!(calculate_new_scale(Side::Left, 200.0, 0.0, 100.0), -2.0);
    }

    #[test]
    fn empty_span_maps_to_length() {
        assert_relative_eq!(calculate_new_scale(Side::Top, 50.0, 3.0, 3.0), 50.0);
        assert_relative_eq!(calculate_new_scale(Side::Right, 50.0, 3.0, 3.0), -50.0);
    }

    #[test]
    fn zero_scale_is_clamped_to_minus_one_for_every_side() {
        for side in Side::ALL {
            assert_eq!(calculate_new_scale(side, 0.0, 0.0, 10.0), -1.0, "{side:?}");
            assert_eq!(calculate_new_scale(side, 0.0, 5.0, 5.0), -1.0, "{side:?}");
        }
    }

    #[test]
    fn contains_rejects_non_finite() {
        let range = AxisRange::new(0.0, 1.0, 10.0, 10.0, 0.1);
        assert!(range.contains(0.5));
        assert!(!range.contains(f64::NAN));
        assert!(!range.contains(1.5));
    }
}
