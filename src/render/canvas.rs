use crate::error::ChartResult;
use crate::render::{PathStyle, TextStyle};

/// Immediate-mode drawing surface used by axes and renderers.
///
/// Style and translation are part of the saved state: `restore` undoes every
/// `set_*_style` and `translate` issued since the matching `save`.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn set_stroke_style(&mut self, style: &PathStyle);
    fn set_text_style(&mut self, style: &TextStyle);
    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> ChartResult<()>;
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> ChartResult<()>;
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> ChartResult<()>;
    fn resize(&mut self, width: f64, height: f64) -> ChartResult<()>;
    fn size(&self) -> (f64, f64);
}
