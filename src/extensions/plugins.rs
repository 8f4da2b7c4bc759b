use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::{BitState, Rect};
use crate::error::ChartResult;
use crate::render::Canvas;

/// Overlay node group a plugin contributes on top of the plot area.
///
/// Groups are drawn in ascending `z_order`, ties keep registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayGroup {
    pub name: String,
    pub z_order: i32,
}

impl OverlayGroup {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            z_order: 0,
        }
    }

    #[must_use]
    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }
}

/// Extension hook interface driven by the chart's layout phases.
///
/// Plugins report their own invalidations through [`bit_state`](Self::bit_state);
/// the chart chains that state into its own.
pub trait ChartPlugin {
    fn id(&self) -> &str;

    fn run_pre_layout(&mut self) {}

    /// Called with the plot area once per cycle, after pre-layout ran.
    fn layout_children(&mut self, _plot_area: Rect) {}

    fn run_post_layout(&mut self) {}

    fn bit_state(&self) -> &Rc<BitState>;

    fn overlay(&self) -> &OverlayGroup;

    /// Draws the overlay group onto the plot canvas after the renderers.
    fn render_overlay(&self, _canvas: &mut dyn Canvas) -> ChartResult<()> {
        Ok(())
    }
}
