use std::rc::Rc;

use crate::axis::Axis;
use crate::core::{AxisId, ChartBit, Orientation, Rect, Side, StateListener};
use crate::error::{ChartError, ChartResult};
use crate::render::Canvas;

use super::Chart;
use super::chart::AxisSlot;

impl<C: Canvas> Chart<C> {
    /// Docks `axis` into the slot of its side.
    ///
    /// The chart state starts listening to the axis state, so range or label
    /// changes schedule a layout.
    pub fn add_axis(&mut self, axis: Axis) -> ChartResult<AxisId> {
        let Some(side) = axis.side() else {
            return Err(ChartError::MissingAxisSide {
                axis: axis.name().to_owned(),
            });
        };
        let canvas = (self.canvas_factory)(0.0, 0.0)?;
        let id = AxisId::new(self.next_axis_id);
        self.next_axis_id += 1;

        axis.state().add_change_listener(self.state_as_listener());
        let pending = axis.state().bits();
        self.axis_slots.entry(side).or_default().push(id);
        self.axes.insert(
            id,
            AxisSlot {
                axis,
                canvas,
                bounds: Rect::default(),
            },
        );
        self.state.set_dirty(ChartBit::ChartAxes.bit() | pending);
        Ok(id)
    }

    /// Undocks an axis. Returns the axis, or `None` for an unknown id.
    pub fn remove_axis(&mut self, id: AxisId) -> ChartResult<Option<Axis>> {
        let Some(slot) = self.axes.shift_remove(&id) else {
            return Ok(None);
        };
        for ids in self.axis_slots.values_mut() {
            ids.retain(|entry| *entry != id);
        }
        self.axis_slots.retain(|_, ids| !ids.is_empty());
        slot.axis
            .state()
            .remove_change_listener(&self.state_as_listener())?;
        self.state.set_dirty(ChartBit::ChartAxes.bit());
        Ok(Some(slot.axis))
    }

    #[must_use]
    pub fn axis(&self, id: AxisId) -> Option<&Axis> {
        self.axes.get(&id).map(|slot| &slot.axis)
    }

    pub fn axis_mut(&mut self, id: AxisId) -> Option<&mut Axis> {
        self.axes.get_mut(&id).map(|slot| &mut slot.axis)
    }

    /// Canvas the axis was last drawn into.
    #[must_use]
    pub fn axis_canvas(&self, id: AxisId) -> Option<&C> {
        self.axes.get(&id).map(|slot| &slot.canvas)
    }

    /// Placement of the axis canvas in chart coordinates.
    #[must_use]
    pub fn axis_bounds(&self, id: AxisId) -> Option<Rect> {
        self.axes.get(&id).map(|slot| slot.bounds)
    }

    /// Axes docked on `side`, innermost first.
    #[must_use]
    pub fn axes_on(&self, side: Side) -> &[AxisId] {
        self.axis_slots.get(&side).map_or(&[], Vec::as_slice)
    }

    pub fn axis_ids(&self) -> impl Iterator<Item = AxisId> + '_ {
        self.axes.keys().copied()
    }

    /// First axis along `orientation`, creating a default linear axis at the
    /// bottom or left when there is none.
    pub fn first_axis(&mut self, orientation: Orientation) -> ChartResult<AxisId> {
        if let Some(id) = self.first_axis_id(orientation) {
            return Ok(id);
        }
        let side = match orientation {
            Orientation::Horizontal => Side::Bottom,
            Orientation::Vertical => Side::Left,
        };
        self.add_axis(Axis::linear("").with_side(side))
    }

    pub(super) fn state_as_listener(&self) -> Rc<dyn StateListener> {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::api::Chart;
    use crate::axis::Axis;
    use crate::core::{ChartBit, Orientation, Side};
    use crate::error::ChartError;

    #[test]
    fn axis_without_side_is_rejected() {
        let mut chart = Chart::headless().expect("chart");
        let err = chart.add_axis(Axis::linear("x")).expect_err("missing side");
        assert!(matches!(err, ChartError::MissingAxisSide { axis } if axis == "x"));
    }

    #[test]
    fn axis_changes_reach_the_chart_state_until_removed() {
        let mut chart = Chart::headless().expect("chart");
        let id = chart
            .add_axis(Axis::linear("x").with_side(Side::Bottom))
            .expect("axis");
        assert_eq!(chart.axes_on(Side::Bottom), &[id]);
        assert!(chart.state().is_dirty_bits(ChartBit::AxisRange.bit()));
        chart.axis(id).expect("axis").clear_state();
        chart.state().clear();

        chart.axis_mut(id).expect("axis").set_name("time");
        assert!(chart.state().is_dirty_bits(ChartBit::AxisLabelText.bit()));

        let axis = chart.remove_axis(id).expect("remove").expect("known id");
        chart.state().clear();
        assert_eq!(axis.state().change_listener_count(), 0);
        assert!(chart.axes_on(Side::Bottom).is_empty());
        assert!(chart.remove_axis(id).expect("remove").is_none());
    }

    #[test]
    fn first_axis_creates_defaults_once() {
        let mut chart = Chart::headless().expect("chart");
        let x = chart.first_axis(Orientation::Horizontal).expect("x axis");
        let y = chart.first_axis(Orientation::Vertical).expect("y axis");
        assert_ne!(x, y);
        assert_eq!(chart.axis(x).and_then(Axis::side), Some(Side::Bottom));
        assert_eq!(chart.axis(y).and_then(Axis::side), Some(Side::Left));
        assert_eq!(chart.first_axis(Orientation::Horizontal).expect("x axis"), x);
        assert_eq!(chart.axis_ids().count(), 2);
    }
}
