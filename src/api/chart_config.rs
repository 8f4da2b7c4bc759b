use serde::{Deserialize, Serialize};

use crate::axis::DEFAULT_AXIS_EXTENT;
use crate::core::Insets;
use crate::error::{ChartError, ChartResult};

/// Chart-level layout configuration.
///
/// Serializable so host applications can persist chart setup alongside their
/// axis configs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Space kept free between the chart bounds and the docked axes.
    #[serde(default)]
    pub insets: Insets,
    #[serde(default = "default_legend_visible")]
    pub legend_visible: bool,
    /// Thickness used for an axis whose measured preference is unusable.
    #[serde(default = "default_axis_extent")]
    pub default_axis_extent: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            insets: Insets::default(),
            legend_visible: default_legend_visible(),
            default_axis_extent: default_axis_extent(),
        }
    }
}

impl ChartConfig {
    #[must_use]
    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    #[must_use]
    pub fn with_legend_visible(mut self, visible: bool) -> Self {
        self.legend_visible = visible;
        self
    }

    #[must_use]
    pub fn with_default_axis_extent(mut self, extent: f64) -> Self {
        self.default_axis_extent = extent;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        let insets = [
            ("top", self.insets.top),
            ("right", self.insets.right),
            ("bottom", self.insets.bottom),
            ("left", self.insets.left),
        ];
        for (edge, value) in insets {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidData(format!(
                    "chart inset `{edge}` must be finite and >= 0"
                )));
            }
        }
        if !self.default_axis_extent.is_finite() || self.default_axis_extent <= 0.0 {
            return Err(ChartError::InvalidData(
                "default axis extent must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_legend_visible() -> bool {
    true
}

fn default_axis_extent() -> f64 {
    DEFAULT_AXIS_EXTENT
}

#[cfg(test)]
mod tests {
    use super::ChartConfig;
    use crate::core::Insets;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ChartConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config, ChartConfig::default());
        assert!(config.legend_visible);
        assert_eq!(config.default_axis_extent, 150.0);
    }

    #[test]
    fn validate_rejects_negative_insets_and_extents() {
        let bad_inset = ChartConfig::default().with_insets(Insets {
            left: -1.0,
            ..Insets::default()
        });
        assert!(bad_inset.validate().is_err());
        assert!(
            ChartConfig::default()
                .with_default_axis_extent(f64::NAN)
                .validate()
                .is_err()
        );
        assert!(ChartConfig::default().with_insets(Insets::uniform(4.0)).validate().is_ok());
    }
}
