//! Chart orchestration: collaborator wiring, the render queue and the
//! pre-layout, layout and post-layout phases.

mod chart;
mod chart_axes;
mod chart_config;
mod chart_datasets;
mod chart_layout;
mod plugin_registry;
mod render_queue;

pub use chart::Chart;
pub use chart_config::ChartConfig;
pub use render_queue::{RenderQueue, RenderQueueHandle, RenderTask};
