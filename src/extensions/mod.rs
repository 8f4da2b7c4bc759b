//! Collaborators the chart drives but does not implement itself: renderers,
//! plugins and the legend.

mod legend;
mod plugins;
mod renderer;

pub use legend::{DefaultLegend, Legend, LegendItem};
pub use plugins::{ChartPlugin, OverlayGroup};
pub use renderer::{ChartRenderer, LineRenderer, RenderContext};
