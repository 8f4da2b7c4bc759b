use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const GRAY: Self = Self::rgb(0.5, 0.5, 0.5);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Stroke parameters for lines (tick marks, axis baseline, data polylines).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub stroke_width: f64,
    pub color: Color,
}

impl PathStyle {
    #[must_use]
    pub const fn new(stroke_width: f64, color: Color) -> Self {
        Self {
            stroke_width,
            color,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ChartError::InvalidData(
                "stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(1.0, Color::BLACK)
    }
}

/// Horizontal text alignment relative to the anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextHAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement of the text box relative to the anchor y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextVAlign {
    Top,
    Center,
    #[default]
    Baseline,
    Bottom,
}

/// Font and placement parameters for labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
    pub v_align: TextVAlign,
    /// Clockwise rotation in degrees around the anchor.
    pub rotation_deg: f64,
}

impl TextStyle {
    #[must_use]
    pub fn new(font_size_px: f64) -> Self {
        Self {
            font_size_px,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_alignment(mut self, h_align: TextHAlign, v_align: TextVAlign) -> Self {
        self.h_align = h_align;
        self.v_align = v_align;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation_deg: f64) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        if !self.rotation_deg.is_finite() {
            return Err(ChartError::InvalidData(
                "text rotation must be finite".to_owned(),
            ));
        }
        self.color.validate()
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size_px: 10.0,
            color: Color::BLACK,
            h_align: TextHAlign::Left,
            v_align: TextVAlign::Baseline,
            rotation_deg: 0.0,
        }
    }
}
