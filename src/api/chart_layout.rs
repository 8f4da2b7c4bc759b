use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::core::{AxisId, ChartBit, LEGEND_MASK, Orientation, Rect, Side};
use crate::dataset::{DIM_X, DIM_Y};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{ChartRenderer, RenderContext};
use crate::render::Canvas;

use super::chart::{LockedDataSet, first_axis_of};
use super::{Chart, RenderTask};

/// Measure passes over the outer sides. The second pass measures horizontal
/// axes against the plot width left over by the vertical ones.
const LAYOUT_PASSES: usize = 2;

impl<C: Canvas> Chart<C> {
    /// Drains the render queue. Returns the number of tasks handled.
    pub fn process_render_tasks(&mut self) -> usize {
        let tasks: Vec<RenderTask> = self.render_queue.drain().collect();
        for task in &tasks {
            match task {
                RenderTask::SyncDataSetState => self.state.set_dirty(self.dataset_state.bits()),
                RenderTask::RequestLayout => self.request_layout(),
            }
        }
        tasks.len()
    }

    /// Processes pending tasks and, when a layout was requested or the bounds
    /// changed, runs one full layout cycle. Returns whether a cycle ran.
    pub fn pulse(&mut self, bounds: Rect) -> ChartResult<bool> {
        validate_bounds(bounds)?;
        self.process_render_tasks();
        if bounds != self.bounds {
            self.request_layout();
        }
        if !self.layout_requested.get() {
            return Ok(false);
        }
        self.pre_layout();
        if let Err(err) = self.layout(bounds) {
            self.finish_cycle();
            return Err(err);
        }
        self.post_layout()?;
        Ok(true)
    }

    /// Locks every distinct dataset for reading, rebuilds the legend when
    /// needed, updates axis ranges and runs the collaborators' pre-layout
    /// hooks.
    ///
    /// Locks are held until [`post_layout`](Self::post_layout). Calling this
    /// again before then does not lock twice.
    pub fn pre_layout(&mut self) {
        if self.locked.is_none() {
            let locked: Vec<LockedDataSet> = self
                .dataset_subscriptions
                .values()
                .map(|subscription| LockedDataSet {
                    guard: subscription.dataset.lock().read_owned(),
                    dataset: Arc::clone(&subscription.dataset),
                })
                .collect();
            trace!(count = locked.len(), "locked datasets for layout cycle");
            self.locked = Some(locked);
        }

        if self.state.is_dirty_bits(LEGEND_MASK) {
            let renderers: Vec<&dyn ChartRenderer> = self
                .renderers
                .iter()
                .map(|renderer| -> &dyn ChartRenderer { renderer.as_ref() })
                .collect();
            self.legend.update_legend(&self.datasets, &renderers);
        }

        self.update_axis_ranges();
        for renderer in &mut self.renderers {
            renderer.run_pre_layout();
        }
        for plugin in &mut self.plugins {
            plugin.run_pre_layout();
        }
        self.pre_layout_ran = true;
    }

    /// Sizes the docked axes and the plot area to `bounds` minus the insets.
    ///
    /// Plugins lay out their overlays only after a pre-layout in the same
    /// cycle, otherwise another layout is queued.
    pub fn layout(&mut self, bounds: Rect) -> ChartResult<()> {
        validate_bounds(bounds)?;
        self.bounds = bounds;
        let inner = bounds.inset(self.config.insets);

        let mut extents = IndexMap::new();
        let (mut top, mut bottom, mut left, mut right) = (0.0, 0.0, 0.0, 0.0);
        for _ in 0..LAYOUT_PASSES {
            let plot_width = (inner.width - left - right).max(0.0);
            top = self.measure_side(Side::Top, plot_width, &mut extents);
            bottom = self.measure_side(Side::Bottom, plot_width, &mut extents);
            let plot_height = (inner.height - top - bottom).max(0.0);
            left = self.measure_side(Side::Left, plot_height, &mut extents);
            right = self.measure_side(Side::Right, plot_height, &mut extents);
        }

        let plot_area = Rect::new(
            inner.x + left,
            inner.y + top,
            (inner.width - left - right).max(0.0),
            (inner.height - top - bottom).max(0.0),
        );
        self.plot_area = plot_area;
        self.place_axes(plot_area, &extents)?;
        self.canvas.resize(plot_area.width, plot_area.height)?;

        if self.pre_layout_ran {
            for plugin in &mut self.plugins {
                plugin.layout_children(plot_area);
            }
        } else {
            debug!("layout ran without pre-layout, queueing another layout");
            self.render_queue.handle().post(RenderTask::RequestLayout);
        }
        self.state.set_dirty(ChartBit::ChartCanvas.bit());
        Ok(())
    }

    /// Draws axes, renderers and overlays, then clears every state and
    /// releases the dataset locks taken in pre-layout. Locks are released
    /// even when drawing fails.
    pub fn post_layout(&mut self) -> ChartResult<()> {
        let drawn = self.draw_cycle();
        self.finish_cycle();
        drawn
    }

    fn update_axis_ranges(&mut self) {
        let locked = self.locked.as_deref().unwrap_or_default();
        for slot in self.axes.values_mut() {
            let Some(side) = slot.axis.side() else {
                continue;
            };
            let dim = match side.orientation() {
                Orientation::Horizontal => DIM_X,
                Orientation::Vertical => DIM_Y,
            };
            let mut extent: Option<(f64, f64)> = None;
            for entry in locked {
                let Some((low, high)) = entry.dataset.axis_range(dim) else {
                    continue;
                };
                if !low.is_finite() || !high.is_finite() {
                    warn!(
                        dataset = %entry.dataset.name(),
                        axis = %slot.axis.name(),
                        "skipping non-finite data extent"
                    );
                    continue;
                }
                extent = Some(extent.map_or((low, high), |(min, max)| {
                    (min.min(low), max.max(high))
                }));
            }
            slot.axis.set_auto_range_extent(extent);
            slot.axis.invalidate_range();
        }
    }

    /// Measures the axes on one outer side, recording each thickness.
    /// Returns the side's total thickness.
    fn measure_side(
        &mut self,
        side: Side,
        length: f64,
        extents: &mut IndexMap<AxisId, f64>,
    ) -> f64 {
        let fallback = self.config.default_axis_extent;
        let Some(ids) = self.axis_slots.get(&side) else {
            return 0.0;
        };
        let mut total = 0.0;
        for id in ids {
            let Some(slot) = self.axes.get_mut(id) else {
                continue;
            };
            let measured = if side.is_horizontal() {
                slot.axis.compute_pref_height(length)
            } else {
                slot.axis.compute_pref_width(length)
            };
            let extent = if measured.is_finite() && measured >= 0.0 {
                measured
            } else {
                warn!(axis = %slot.axis.name(), measured, "unusable axis extent, using default");
                fallback
            };
            extents.insert(*id, extent);
            total += extent;
        }
        total
    }

    /// Stacks outer axes outwards from the plot area and lays center axes
    /// over it. Axis canvases extend by the axis padding on both ends.
    fn place_axes(&mut self, plot: Rect, extents: &IndexMap<AxisId, f64>) -> ChartResult<()> {
        for (side, ids) in &self.axis_slots {
            let mut offset = 0.0;
            for id in ids {
                let Some(slot) = self.axes.get_mut(id) else {
                    continue;
                };
                let padding = slot.axis.config().axis_padding;
                let extent = extents.get(id).copied().unwrap_or(0.0);
                let padded_width = plot.width + 2.0 * padding;
                let padded_height = plot.height + 2.0 * padding;
                let (width, height, bounds) = match side {
                    Side::Top => (
                        plot.width,
                        extent,
                        Rect::new(plot.x - padding, plot.y - offset - extent, padded_width, extent),
                    ),
                    Side::Bottom => (
                        plot.width,
                        extent,
                        Rect::new(plot.x - padding, plot.bottom() + offset, padded_width, extent),
                    ),
                    Side::Left => (
                        extent,
                        plot.height,
                        Rect::new(plot.x - offset - extent, plot.y - padding, extent, padded_height),
                    ),
                    Side::Right => (
                        extent,
                        plot.height,
                        Rect::new(plot.right() + offset, plot.y - padding, extent, padded_height),
                    ),
                    Side::CenterHor => (
                        plot.width,
                        plot.height,
                        Rect::new(plot.x - padding, plot.y, padded_width, plot.height),
                    ),
                    Side::CenterVer => (
                        plot.width,
                        plot.height,
                        Rect::new(plot.x, plot.y - padding, plot.width, padded_height),
                    ),
                };
                offset += extent;
                slot.axis.set_layout_size(width, height);
                slot.canvas.resize(bounds.width, bounds.height)?;
                slot.bounds = bounds;
            }
        }
        Ok(())
    }

    fn draw_cycle(&mut self) -> ChartResult<()> {
        for slot in self.axes.values_mut() {
            slot.axis.draw_axis(&mut slot.canvas)?;
        }
        self.render_plot()?;
        for renderer in &mut self.renderers {
            renderer.run_post_layout();
        }
        for plugin in &mut self.plugins {
            plugin.run_post_layout();
        }
        Ok(())
    }

    /// Repaints the main canvas: renderers in registration order, then
    /// plugin overlays by z-order.
    fn render_plot(&mut self) -> ChartResult<()> {
        let (width, height) = self.canvas.size();
        self.canvas.clear_rect(0.0, 0.0, width, height)?;

        let x_axis = first_axis_of(&self.axes, Orientation::Horizontal).map(|(_, axis)| axis);
        let y_axis = first_axis_of(&self.axes, Orientation::Vertical).map(|(_, axis)| axis);
        for (index, renderer) in self.renderers.iter().enumerate() {
            let context = RenderContext {
                plot_area: self.plot_area,
                x_axis,
                y_axis,
                chart_datasets: if index == 0 { &self.datasets } else { &[] },
            };
            renderer.render(&mut self.canvas, &context)?;
        }

        let mut overlays: Vec<_> = self.overlay_layer.iter().collect();
        overlays.sort_by_key(|(_, group)| group.z_order);
        for (owner, _) in overlays {
            if let Some(plugin) = self.plugins.iter().find(|plugin| plugin.id() == owner) {
                plugin.render_overlay(&mut self.canvas)?;
            }
        }
        Ok(())
    }

    fn finish_cycle(&mut self) {
        for renderer in &self.renderers {
            renderer.bit_state().clear();
        }
        for plugin in &self.plugins {
            plugin.bit_state().clear();
        }
        self.dataset_state.clear();
        self.state.clear();
        for slot in self.axes.values() {
            slot.axis.clear_state();
        }
        if let Some(locked) = self.locked.take() {
            let count = locked.len();
            for entry in locked {
                entry.dataset.bit_state().clear();
                drop(entry.guard);
            }
            trace!(count, "released dataset locks");
        }
        self.pre_layout_ran = false;
        self.layout_requested.set(false);
    }
}

fn validate_bounds(bounds: Rect) -> ChartResult<()> {
    if bounds.is_valid() {
        Ok(())
    } else {
        Err(ChartError::InvalidViewport {
            width: bounds.width,
            height: bounds.height,
        })
    }
}
