use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::axis::Axis;
use crate::core::{
    AxisId, BitState, ChartBit, KNOWN_MASK, NO_FILTER, Orientation, Rect, Side, SyncBitState,
    SyncStateListener, state_listener, sync_state_listener,
};
use crate::dataset::{DataSet, DataSetReadGuard};
use crate::error::ChartResult;
use crate::extensions::{ChartPlugin, ChartRenderer, DefaultLegend, Legend, OverlayGroup};
use crate::render::{Canvas, RecordingCanvas};

use super::{ChartConfig, RenderQueue, RenderQueueHandle, RenderTask};

type CanvasFactory<C> = Box<dyn Fn(f64, f64) -> ChartResult<C>>;

/// An axis docked into the chart together with its own canvas.
pub(super) struct AxisSlot<C> {
    pub(super) axis: Axis,
    pub(super) canvas: C,
    /// Canvas placement in chart coordinates, padding included.
    pub(super) bounds: Rect,
}

/// A dataset the aggregator listens to, counted once per attachment.
pub(super) struct DataSetSubscription {
    pub(super) dataset: Arc<dyn DataSet>,
    pub(super) refs: usize,
}

/// A dataset read-locked for the current layout cycle.
pub(super) struct LockedDataSet {
    pub(super) dataset: Arc<dyn DataSet>,
    pub(super) guard: DataSetReadGuard,
}

/// Chart orchestrator: owns axes, renderers, plugins, the legend and the
/// canvases, and drives them through pre-layout, layout and post-layout.
///
/// Lives on the render thread. Datasets are shared with producer threads,
/// which signal changes through the render queue.
pub struct Chart<C: Canvas> {
    pub(super) config: ChartConfig,
    pub(super) state: Rc<BitState>,
    pub(super) layout_requested: Rc<Cell<bool>>,
    pub(super) canvas_factory: CanvasFactory<C>,
    pub(super) canvas: C,
    pub(super) bounds: Rect,
    pub(super) plot_area: Rect,
    pub(super) axes: IndexMap<AxisId, AxisSlot<C>>,
    pub(super) axis_slots: IndexMap<Side, Vec<AxisId>>,
    pub(super) next_axis_id: u32,
    pub(super) datasets: Vec<Arc<dyn DataSet>>,
    pub(super) renderers: Vec<Box<dyn ChartRenderer>>,
    pub(super) plugins: Vec<Box<dyn ChartPlugin>>,
    /// Overlay groups keyed by the plugin that contributed them.
    pub(super) overlay_layer: Vec<(String, OverlayGroup)>,
    pub(super) legend: Box<dyn Legend>,
    pub(super) dataset_state: Arc<SyncBitState>,
    pub(super) dataset_subscriptions: IndexMap<usize, DataSetSubscription>,
    pub(super) render_queue: RenderQueue,
    pub(super) locked: Option<Vec<LockedDataSet>>,
    pub(super) pre_layout_ran: bool,
}

impl<C: Canvas> Chart<C> {
    /// Creates a chart whose main and axis canvases come from
    /// `canvas_factory(width, height)`.
    pub fn new(canvas_factory: impl Fn(f64, f64) -> ChartResult<C> + 'static) -> ChartResult<Self> {
        Self::with_config(canvas_factory, ChartConfig::default())
    }

    pub fn with_config(
        canvas_factory: impl Fn(f64, f64) -> ChartResult<C> + 'static,
        config: ChartConfig,
    ) -> ChartResult<Self> {
        config.validate()?;
        let canvas = canvas_factory(0.0, 0.0)?;

        let state = Rc::new(BitState::init_dirty("chart", NO_FILTER));
        let layout_requested = Rc::new(Cell::new(true));
        let requested = Rc::clone(&layout_requested);
        state.add_change_listener_filtered(
            KNOWN_MASK,
            state_listener(move |_, _| requested.set(true)),
        );

        let render_queue = RenderQueue::new();
        let dataset_state = Arc::new(SyncBitState::init_clean("chart datasets", NO_FILTER));
        dataset_state.add_change_listener(dataset_forwarder(render_queue.handle()));

        let mut legend = DefaultLegend::new();
        legend.set_visible(config.legend_visible);

        Ok(Self {
            config,
            state,
            layout_requested,
            canvas_factory: Box::new(canvas_factory),
            canvas,
            bounds: Rect::default(),
            plot_area: Rect::default(),
            axes: IndexMap::new(),
            axis_slots: IndexMap::new(),
            next_axis_id: 0,
            datasets: Vec::new(),
            renderers: Vec::new(),
            plugins: Vec::new(),
            overlay_layer: Vec::new(),
            legend: Box::new(legend),
            dataset_state,
            dataset_subscriptions: IndexMap::new(),
            render_queue,
            locked: None,
            pre_layout_ran: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &Rc<BitState> {
        &self.state
    }

    /// Aggregated bits of every attached dataset. Mutated from any thread.
    #[must_use]
    pub fn dataset_state(&self) -> &Arc<SyncBitState> {
        &self.dataset_state
    }

    /// Sender producers use to wake the render thread.
    #[must_use]
    pub fn render_queue_handle(&self) -> RenderQueueHandle {
        self.render_queue.handle()
    }

    #[must_use]
    pub fn is_layout_requested(&self) -> bool {
        self.layout_requested.get()
    }

    /// Plot area from the last layout, in chart coordinates.
    #[must_use]
    pub fn plot_area(&self) -> Rect {
        self.plot_area
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Main canvas the renderers draw into, sized to the plot area.
    #[must_use]
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    #[must_use]
    pub fn legend(&self) -> &dyn Legend {
        self.legend.as_ref()
    }

    pub fn set_legend(&mut self, mut legend: Box<dyn Legend>) {
        legend.set_visible(self.config.legend_visible);
        self.legend = legend;
        self.state.set_dirty(ChartBit::ChartLegend.bit());
    }

    pub fn set_legend_visible(&mut self, visible: bool) {
        if self.config.legend_visible != visible {
            self.config.legend_visible = visible;
            self.legend.set_visible(visible);
            self.state.set_dirty(ChartBit::ChartLegend.bit());
        }
    }

    /// Number of datasets read-locked by the open layout cycle.
    #[must_use]
    pub fn locked_dataset_count(&self) -> usize {
        self.locked.as_ref().map_or(0, Vec::len)
    }

    /// Overlay groups in draw order.
    #[must_use]
    pub fn overlay_groups(&self) -> Vec<&OverlayGroup> {
        let mut groups: Vec<&OverlayGroup> = self.overlay_layer.iter().map(|(_, g)| g).collect();
        groups.sort_by_key(|group| group.z_order);
        groups
    }

    /// Marks the chart for another layout cycle.
    pub fn request_layout(&mut self) {
        self.state.set_dirty(ChartBit::ChartLayout.bit());
        self.layout_requested.set(true);
    }

    pub(super) fn first_axis_id(&self, orientation: Orientation) -> Option<AxisId> {
        first_axis_of(&self.axes, orientation).map(|(id, _)| id)
    }
}

impl Chart<RecordingCanvas> {
    /// Chart drawing into [`RecordingCanvas`]es.
    pub fn headless() -> ChartResult<Self> {
        Self::headless_with_config(ChartConfig::default())
    }

    pub fn headless_with_config(config: ChartConfig) -> ChartResult<Self> {
        Self::with_config(|width, height| Ok(RecordingCanvas::new(width, height)), config)
    }
}

/// First axis, in insertion order, laid out along `orientation`.
pub(super) fn first_axis_of<C>(
    axes: &IndexMap<AxisId, AxisSlot<C>>,
    orientation: Orientation,
) -> Option<(AxisId, &Axis)> {
    axes.iter()
        .find(|(_, slot)| slot.axis.side().map(Side::orientation) == Some(orientation))
        .map(|(id, slot)| (*id, &slot.axis))
}

/// Posts a sync task for every aggregator change; runs on producer threads.
fn dataset_forwarder(handle: RenderQueueHandle) -> Arc<dyn SyncStateListener> {
    sync_state_listener(move |_, _| {
        handle.post(RenderTask::SyncDataSetState);
    })
}
