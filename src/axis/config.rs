use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::{PathStyle, TextStyle};

use super::OverlapPolicy;

/// Tunables of one axis: gaps, tick geometry, auto-range options and styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    pub auto_ranging: bool,
    /// Range may only widen while this is set.
    pub auto_grow_ranging: bool,
    /// Fraction of the data span added on each side of the auto range.
    pub auto_range_padding: f64,
    /// Snap auto-ranged bounds outwards to whole tick units.
    pub auto_range_rounding: bool,
    pub force_zero_in_range: bool,
    pub invert: bool,
    /// Divisor applied to values before formatting tick labels.
    pub unit_scaling: f64,
    /// Tick unit used while auto ranging is off.
    pub tick_unit: f64,
    pub tick_label_gap: f64,
    pub axis_label_gap: f64,
    pub tick_length: f64,
    pub minor_tick_length: f64,
    pub minor_tick_count: usize,
    pub tick_label_spacing: f64,
    /// Extra canvas margin along the axis so edge labels are not clipped.
    pub axis_padding: f64,
    /// Relative placement of center axes inside the plot area, 0..=1.
    pub axis_center_position: f64,
    pub max_major_tick_label_count: usize,
    pub overlap_policy: OverlapPolicy,
    pub tick_label_rotation: f64,
    pub tick_mark_visible: bool,
    pub tick_labels_visible: bool,
    pub minor_tick_visible: bool,
    pub tick_label_style: TextStyle,
    pub axis_label_style: TextStyle,
    pub major_tick_style: PathStyle,
    pub minor_tick_style: PathStyle,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            auto_ranging: true,
            auto_grow_ranging: false,
            auto_range_padding: 0.0,
            auto_range_rounding: false,
            force_zero_in_range: false,
            invert: false,
            unit_scaling: 1.0,
            tick_unit: 5.0,
            tick_label_gap: 3.0,
            axis_label_gap: 3.0,
            tick_length: 8.0,
            minor_tick_length: 5.0,
            minor_tick_count: 10,
            tick_label_spacing: 3.0,
            axis_padding: 15.0,
            axis_center_position: 0.5,
            max_major_tick_label_count: 20,
            overlap_policy: OverlapPolicy::SkipAlt,
            tick_label_rotation: 0.0,
            tick_mark_visible: true,
            tick_labels_visible: true,
            minor_tick_visible: true,
            tick_label_style: TextStyle::new(10.0),
            axis_label_style: TextStyle::new(12.0),
            major_tick_style: PathStyle::default(),
            minor_tick_style: PathStyle::new(1.0, crate::render::Color::GRAY),
        }
    }
}

impl AxisConfig {
    /// Fixed bounds with a user tick unit.
    #[must_use]
    pub fn fixed(tick_unit: f64) -> Self {
        Self {
            auto_ranging: false,
            tick_unit,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_auto_ranging(mut self, enabled: bool) -> Self {
        self.auto_ranging = enabled;
        self
    }

    #[must_use]
    pub fn with_auto_grow_ranging(mut self, enabled: bool) -> Self {
        self.auto_grow_ranging = enabled;
        self
    }

    #[must_use]
    pub fn with_auto_range_padding(mut self, padding: f64) -> Self {
        self.auto_range_padding = padding;
        self
    }

    #[must_use]
    pub fn with_auto_range_rounding(mut self, enabled: bool) -> Self {
        self.auto_range_rounding = enabled;
        self
    }

    #[must_use]
    pub fn with_force_zero_in_range(mut self, enabled: bool) -> Self {
        self.force_zero_in_range = enabled;
        self
    }

    #[must_use]
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    #[must_use]
    pub fn with_unit_scaling(mut self, unit_scaling: f64) -> Self {
        self.unit_scaling = unit_scaling;
        self
    }

    #[must_use]
    pub fn with_tick_unit(mut self, tick_unit: f64) -> Self {
        self.tick_unit = tick_unit;
        self
    }

    #[must_use]
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    #[must_use]
    pub fn with_tick_label_rotation(mut self, degrees: f64) -> Self {
        self.tick_label_rotation = degrees;
        self
    }

    #[must_use]
    pub fn with_axis_padding(mut self, padding: f64) -> Self {
        self.axis_padding = padding;
        self
    }

    #[must_use]
    pub fn with_axis_center_position(mut self, position: f64) -> Self {
        self.axis_center_position = position;
        self
    }

    #[must_use]
    pub fn with_tick_label_style(mut self, style: TextStyle) -> Self {
        self.tick_label_style = style;
        self
    }

    #[must_use]
    pub fn with_minor_tick_visible(mut self, visible: bool) -> Self {
        self.minor_tick_visible = visible;
        self
    }

    #[must_use]
    pub fn with_tick_mark_visible(mut self, visible: bool) -> Self {
        self.tick_mark_visible = visible;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        for (name, value) in [
            ("tick_label_gap", self.tick_label_gap),
            ("axis_label_gap", self.axis_label_gap),
            ("tick_length", self.tick_length),
            ("minor_tick_length", self.minor_tick_length),
            ("tick_label_spacing", self.tick_label_spacing),
            ("axis_padding", self.axis_padding),
            ("auto_range_padding", self.auto_range_padding),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "axis `{name}` must be finite and >= 0"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.axis_center_position) {
            return Err(ChartError::InvalidData(
                "axis center position must be in [0, 1]".to_owned(),
            ));
        }
        if !self.unit_scaling.is_finite() || self.unit_scaling == 0.0 {
            return Err(ChartError::InvalidData(
                "unit scaling must be finite and != 0".to_owned(),
            ));
        }
        if !self.tick_unit.is_finite() || self.tick_unit <= 0.0 {
            return Err(ChartError::InvalidData(
                "tick unit must be finite and > 0".to_owned(),
            ));
        }
        if self.max_major_tick_label_count < 2 {
            return Err(ChartError::InvalidData(
                "max major tick label count must be >= 2".to_owned(),
            ));
        }
        if !self.tick_label_rotation.is_finite() {
            return Err(ChartError::InvalidData(
                "tick label rotation must be finite".to_owned(),
            ));
        }
        self.tick_label_style.validate()?;
        self.axis_label_style.validate()?;
        self.major_tick_style.validate()?;
        self.minor_tick_style.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::AxisConfig;

    #[test]
    fn defaults_validate() {
        AxisConfig::default().validate().expect("default config");
    }

    #[test]
    fn center_position_out_of_range_is_rejected() {
        let config = AxisConfig::default().with_axis_center_position(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AxisConfig =
            serde_json::from_str(r#"{"tick_length": 4.0}"#).expect("parse config");
        assert_eq!(config.tick_length, 4.0);
        assert_eq!(config.minor_tick_count, 10);
    }
}
