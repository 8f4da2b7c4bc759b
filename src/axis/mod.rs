//! Axis engine: ranging, tick generation, label overlap handling, drawing and
//! preferred-size computation.

mod axis_draw;
mod axis_size;
mod config;
mod engine;
pub mod label_format;
mod label_overlap;
pub mod range;

pub use axis_draw::tick_label_alignment;
pub use config::AxisConfig;
pub use engine::{Axis, DEFAULT_AXIS_EXTENT};
pub use label_format::{AxisLabelFormatter, DefaultFormatter, LogFormatter, TimeFormatter};
pub use label_overlap::{MAX_NARROW_FONT_SCALE, MIN_NARROW_FONT_SCALE, OverlapPolicy};
pub use range::{
    AxisKind, CategoryRange, LinearRange, LogRange, RangeAlgorithm, RangeRequest, TimeRange,
};
