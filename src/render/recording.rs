use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::{Canvas, PathStyle, TextStyle};

/// One recorded canvas call, in untranslated canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Save,
    Restore,
    StrokeLine {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: PathStyle,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct GraphicsState {
    dx: f64,
    dy: f64,
    stroke: PathStyle,
    text: TextStyle,
}

/// Headless canvas recording every call.
///
/// Used by tests and headless layout. It still validates geometry so invalid
/// coordinates are caught before a real backend sees them.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    current: GraphicsState,
    stack: Vec<GraphicsState>,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::StrokeLine { .. }))
            .count()
    }

    /// Texts drawn since the last clear, in draw order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn to_json(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self.commands)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize draw commands: {e}")))
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.stack.push(self.current);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        // Unbalanced restore keeps the current state, like a 2D context does.
        if let Some(previous) = self.stack.pop() {
            self.current = previous;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.current.dx += dx;
        self.current.dy += dy;
    }

    fn set_stroke_style(&mut self, style: &PathStyle) {
        self.current.stroke = *style;
    }

    fn set_text_style(&mut self, style: &TextStyle) {
        self.current.text = *style;
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> ChartResult<()> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(ChartError::InvalidData(
                "line coordinates must be finite".to_owned(),
            ));
        }
        self.current.stroke.validate()?;
        let GraphicsState { dx, dy, stroke, .. } = self.current;
        self.commands.push(DrawCommand::StrokeLine {
            x1: x1 + dx,
            y1: y1 + dy,
            x2: x2 + dx,
            y2: y2 + dy,
            style: stroke,
        });
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> ChartResult<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ChartError::InvalidData(
                "text coordinates must be finite".to_owned(),
            ));
        }
        self.current.text.validate()?;
        let GraphicsState { dx, dy, text: style, .. } = self.current;
        self.commands.push(DrawCommand::FillText {
            text: text.to_owned(),
            x: x + dx,
            y: y + dy,
            style,
        });
        Ok(())
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> ChartResult<()> {
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return Err(ChartError::InvalidData(
                "clear rect must be finite".to_owned(),
            ));
        }
        // A full clear wipes the recorded history, like pixels on a surface.
        if x <= 0.0 && y <= 0.0 && width >= self.width && height >= self.height {
            self.commands.clear();
        }
        self.commands.push(DrawCommand::ClearRect {
            x: x + self.current.dx,
            y: y + self.current.dy,
            width,
            height,
        });
        Ok(())
    }

    fn resize(&mut self, width: f64, height: f64) -> ChartResult<()> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(ChartError::InvalidViewport { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}
