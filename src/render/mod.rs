mod canvas;
mod metrics;
mod recording;
mod style;

pub use canvas::Canvas;
pub use metrics::{EstimatedLabelMetrics, LabelMetrics, estimate_label_text_width_px};
pub use recording::{DrawCommand, RecordingCanvas};
pub use style::{Color, PathStyle, TextHAlign, TextStyle, TextVAlign};

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::CairoCanvas;
