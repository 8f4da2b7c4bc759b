use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use crate::axis::Axis;
use crate::core::{BitState, ChartBit, KNOWN_MASK, Rect};
use crate::dataset::{DIM_X, DIM_Y, DataSet, dataset_key};
use crate::error::ChartResult;
use crate::render::{Canvas, PathStyle};

/// Read-only view of the chart handed to renderers while drawing.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub plot_area: Rect,
    pub x_axis: Option<&'a Axis>,
    pub y_axis: Option<&'a Axis>,
    /// Datasets attached to the chart itself. Only the first renderer draws
    /// them, the others receive an empty slice.
    pub chart_datasets: &'a [Arc<dyn DataSet>],
}

/// Draws datasets onto the main chart canvas.
///
/// Canvas coordinates are relative to the plot area origin.
pub trait ChartRenderer {
    fn id(&self) -> &str;

    fn datasets(&self) -> &[Arc<dyn DataSet>];

    fn add_dataset(&mut self, dataset: Arc<dyn DataSet>);

    /// Returns `true` when the dataset was attached.
    fn remove_dataset(&mut self, dataset: &Arc<dyn DataSet>) -> bool;

    fn run_pre_layout(&mut self) {}

    fn run_post_layout(&mut self) {}

    fn render(&self, canvas: &mut dyn Canvas, context: &RenderContext<'_>) -> ChartResult<()>;

    fn bit_state(&self) -> &Rc<BitState>;
}

/// Polyline through consecutive points of every dataset.
#[derive(Debug)]
pub struct LineRenderer {
    id: String,
    datasets: Vec<Arc<dyn DataSet>>,
    style: PathStyle,
    state: Rc<BitState>,
}

impl LineRenderer {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            state: Rc::new(BitState::init_clean(format!("renderer `{id}`"), KNOWN_MASK)),
            id,
            datasets: Vec::new(),
            style: PathStyle::default(),
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: PathStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn style(&self) -> PathStyle {
        self.style
    }

    pub fn set_style(&mut self, style: PathStyle) {
        if style != self.style {
            self.style = style;
            self.state.set_dirty(ChartBit::ChartCanvas.bit());
        }
    }

    fn render_dataset(
        &self,
        canvas: &mut dyn Canvas,
        dataset: &dyn DataSet,
        x_axis: &Axis,
        y_axis: &Axis,
    ) -> ChartResult<()> {
        let mut previous: Option<(f64, f64)> = None;
        for index in 0..dataset.point_count() {
            let x = x_axis.display_position(dataset.value(DIM_X, index));
            let y = y_axis.display_position(dataset.value(DIM_Y, index));
            if !x.is_finite() || !y.is_finite() {
                previous = None;
                continue;
            }
            if let Some((x0, y0)) = previous {
                canvas.stroke_line(x0, y0, x, y)?;
            }
            previous = Some((x, y));
        }
        Ok(())
    }
}

impl ChartRenderer for LineRenderer {
    fn id(&self) -> &str {
        &self.id
    }

    fn datasets(&self) -> &[Arc<dyn DataSet>] {
        &self.datasets
    }

    fn add_dataset(&mut self, dataset: Arc<dyn DataSet>) {
        self.datasets.push(dataset);
        self.state.set_dirty(ChartBit::ChartDataSets.bit());
    }

    fn remove_dataset(&mut self, dataset: &Arc<dyn DataSet>) -> bool {
        let key = dataset_key(dataset);
        let Some(position) = self
            .datasets
            .iter()
            .position(|entry| dataset_key(entry) == key)
        else {
            return false;
        };
        self.datasets.remove(position);
        self.state.set_dirty(ChartBit::ChartDataSets.bit());
        true
    }

    fn render(&self, canvas: &mut dyn Canvas, context: &RenderContext<'_>) -> ChartResult<()> {
        let (Some(x_axis), Some(y_axis)) = (context.x_axis, context.y_axis) else {
            debug!(renderer = %self.id, "skipping render without both axis orientations");
            return Ok(());
        };
        canvas.save();
        canvas.set_stroke_style(&self.style);
        let result = context
            .chart_datasets
            .iter()
            .chain(&self.datasets)
            .try_for_each(|dataset| self.render_dataset(canvas, dataset.as_ref(), x_axis, y_axis));
        canvas.restore();
        result
    }

    fn bit_state(&self) -> &Rc<BitState> {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ChartRenderer, LineRenderer, RenderContext};
    use crate::axis::{Axis, AxisConfig};
    use crate::core::{DataPoint, Rect, Side};
    use crate::dataset::{DataSet, DefaultDataSet};
    use crate::render::RecordingCanvas;

    fn axis(side: Side, length: f64) -> Axis {
        let mut axis = Axis::linear("").with_side(side).with_config(AxisConfig::fixed(10.0));
        axis.set(0.0, 10.0);
        if side.is_horizontal() {
            axis.set_layout_size(length, 30.0);
        } else {
            axis.set_layout_size(30.0, length);
        }
        axis
    }

    #[test]
    fn polyline_breaks_at_non_finite_points() {
        let dataset: Arc<dyn DataSet> = Arc::new(DefaultDataSet::with_points(
            "a",
            vec![
                DataPoint::new(0.0, 0.0),
                DataPoint::new(5.0, 5.0),
                DataPoint::new(6.0, f64::NAN),
                DataPoint::new(8.0, 2.0),
                DataPoint::new(10.0, 10.0),
            ],
        ));
        let mut renderer = LineRenderer::new("line");
        renderer.add_dataset(Arc::clone(&dataset));
        let (x_axis, y_axis) = (axis(Side::Bottom, 100.0), axis(Side::Left, 100.0));
        let context = RenderContext {
            plot_area: Rect::new(0.0, 0.0, 100.0, 100.0),
            x_axis: Some(&x_axis),
            y_axis: Some(&y_axis),
            chart_datasets: &[],
        };
        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        renderer.render(&mut canvas, &context).expect("render");
        assert_eq!(canvas.line_count(), 2);
        assert_eq!(canvas.save_depth(), 0);

        assert!(renderer.remove_dataset(&dataset));
        assert!(!renderer.remove_dataset(&dataset));
    }

    #[test]
    fn missing_axis_renders_nothing() {
        let renderer = LineRenderer::new("line");
        let context = RenderContext {
            plot_area: Rect::default(),
            x_axis: None,
            y_axis: None,
            chart_datasets: &[],
        };
        let mut canvas = RecordingCanvas::new(10.0, 10.0);
        renderer.render(&mut canvas, &context).expect("render");
        assert!(canvas.commands().is_empty());
    }
}
