use std::fmt;

/// Measures label text for tick marks and axis titles.
pub trait LabelMetrics: fmt::Debug {
    /// Unrotated `(width, height)` of `text` at `font_size_px`.
    fn measure(&self, text: &str, font_size_px: f64) -> (f64, f64);

    /// Size of the bounding box after rotating by `rotation_deg`.
    fn measure_rotated(&self, text: &str, font_size_px: f64, rotation_deg: f64) -> (f64, f64) {
        let (width, height) = self.measure(text, font_size_px);
        let radians = rotation_deg.to_radians();
        let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
        (width * cos + height * sin, width * sin + height * cos)
    }
}

/// Backend independent estimator using a per-glyph width table.
///
/// Deterministic, so headless layout and tests never depend on installed fonts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EstimatedLabelMetrics;

impl LabelMetrics for EstimatedLabelMetrics {
    fn measure(&self, text: &str, font_size_px: f64) -> (f64, f64) {
        if text.is_empty() || !font_size_px.is_finite() || font_size_px <= 0.0 {
            return (0.0, 0.0);
        }
        (
            estimate_label_text_width_px(text, font_size_px),
            font_size_px * 1.2,
        )
    }
}

pub fn estimate_label_text_width_px(text: &str, font_size_px: f64) -> f64 {
    let width_factor: f64 = text
        .chars()
        .map(|ch| match ch {
            '0'..='9' => 0.62,
            '.' | ',' => 0.34,
            '-' | '+' | '%' => 0.42,
            ' ' => 0.33,
            _ => 0.58,
        })
        .sum();
    (width_factor * font_size_px).max(font_size_px)
}
