use approx::assert_relative_eq;
use chart_layout::axis::{Axis, AxisConfig, OverlapPolicy};
use chart_layout::core::{ChartBit, Side, TickMark};
use chart_layout::render::{DrawCommand, RecordingCanvas};

fn fixed(side: Side, min: f64, max: f64, tick_unit: f64) -> Axis {
    let mut axis = Axis::linear("").with_side(side).with_config(
        AxisConfig::fixed(tick_unit).with_minor_tick_visible(false),
    );
    assert!(axis.set(min, max));
    axis
}

fn positions(axis: &Axis) -> Vec<f64> {
    axis.major_ticks().iter().map(|tick| tick.position).collect()
}

#[test]
fn major_ticks_are_spaced_by_the_tick_unit() {
    let mut bottom = fixed(Side::Bottom, 0.0, 100.0, 20.0);
    bottom.set_layout_size(200.0, 40.0);
    assert_eq!(positions(&bottom), vec![0.0, 40.0, 80.0, 120.0, 160.0, 200.0]);
    let labels: Vec<&str> = bottom.major_ticks().iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["0", "20", "40", "60", "80", "100"]);

    let mut left = fixed(Side::Left, 0.0, 100.0, 20.0);
    left.set_layout_size(40.0, 200.0);
    assert_eq!(positions(&left), vec![200.0, 160.0, 120.0, 80.0, 40.0, 0.0]);
}

#[test]
fn positions_and_values_are_inverse_maps() {
    let mut axis = fixed(Side::Right, -50.0, 150.0, 50.0);
    axis.set_layout_size(30.0, 400.0);
    for value in [-50.0, -12.5, 0.0, 33.0, 150.0] {
        let position = axis.display_position(value);
        assert_relative_eq!(axis.value_for_display(position), value, epsilon = 1e-9);
    }
    assert!(axis.is_value_on_axis(150.0));
    assert!(!axis.is_value_on_axis(150.5));
    assert!(!axis.is_value_on_axis(f64::NAN));
}

#[test]
fn collapsed_range_keeps_coordinates_finite() {
    let mut axis = fixed(Side::Bottom, 5.0, 5.0, 1.0);
    axis.set_layout_size(200.0, 30.0);
    // max == min maps to the full length
    assert_eq!(axis.scale(), 200.0);
    assert!(axis.display_position(5.0).is_finite());
    assert!(axis.display_position(7.0).is_finite());

    let mut empty = fixed(Side::Bottom, 0.0, 10.0, 1.0);
    empty.set_layout_size(0.0, 30.0);
    assert_eq!(empty.scale(), -1.0);
    assert!(empty.display_position(5.0).is_finite());
}

#[test]
fn inverted_horizontal_axes_draw_every_spaced_label() {
    for side in [Side::Bottom, Side::Top] {
        let draw = |invert: bool| -> Vec<String> {
            let mut axis = Axis::linear("").with_side(side).with_config(
                AxisConfig::fixed(50.0)
                    .with_minor_tick_visible(false)
                    .with_invert(invert)
                    .with_overlap_policy(OverlapPolicy::DoNothing),
            );
            axis.set(0.0, 100.0);
            axis.set_layout_size(1_000.0, 40.0);
            let mut canvas = RecordingCanvas::new(1_030.0, 40.0);
            axis.draw_axis(&mut canvas).expect("draw");
            canvas.texts().into_iter().map(str::to_owned).collect()
        };
        assert_eq!(draw(false), vec!["0", "50", "100"]);
        assert_eq!(draw(true), draw(false));
    }
}

#[test]
fn log_bounds_are_repaired_against_the_other_bound() {
    let mut axis = Axis::log("intensity").with_side(Side::Left);
    assert!(axis.set_min(2.0));
    assert!(axis.set_max(-5.0));
    assert_relative_eq!(axis.max(), 2e6);

    let mut axis = Axis::log("intensity")
        .with_side(Side::Bottom)
        .with_config(AxisConfig::fixed(10.0));
    axis.set(1.0, 1_000.0);
    axis.set_layout_size(300.0, 30.0);
    assert_relative_eq!(axis.display_position(100.0), 200.0, epsilon = 1e-9);
    assert!(axis.zero_position().is_nan());
}

#[test]
fn recomputing_unchanged_ticks_is_a_no_op() {
    let mut axis = fixed(Side::Bottom, 0.0, 100.0, 10.0);
    axis.set_layout_size(500.0, 30.0);
    let before: Vec<TickMark> = axis.major_ticks().to_vec();
    let allocations = axis.tick_allocations();

    assert!(!axis.recompute_ticks());
    assert!(!axis.recompute_ticks());
    assert_eq!(axis.major_ticks(), before.as_slice());
    assert_eq!(axis.tick_allocations(), allocations);
}

#[test]
fn skip_alternate_labels_is_deterministic() {
    let make = || {
        let mut axis = Axis::linear("").with_side(Side::Bottom).with_config(
            AxisConfig::fixed(5.0).with_overlap_policy(OverlapPolicy::SkipAlt),
        );
        axis.set(0.0, 100.0);
        axis
    };
    let visibility = |axis: &Axis| -> Vec<bool> {
        axis.major_ticks().iter().map(|tick| tick.visible).collect()
    };

    let (mut first, mut second) = (make(), make());
    let first_height = first.compute_pref_height(120.0);
    let second_height = second.compute_pref_height(120.0);
    assert_eq!(first_height, second_height);
    assert_eq!(visibility(&first), visibility(&second));
    assert!(first.is_label_overlap());
    assert!(visibility(&first).contains(&false));

    let again = first.compute_pref_height(120.0);
    assert_eq!(again, first_height);
    assert_eq!(visibility(&first), visibility(&second));
}

#[test]
fn preferred_size_matches_what_is_drawn() {
    let mut axis = fixed(Side::Bottom, 0.0, 100.0, 25.0);
    let height = axis.compute_pref_height(300.0);
    axis.set_layout_size(300.0, height);
    let mut canvas = RecordingCanvas::new(330.0, height);
    axis.draw_axis(&mut canvas).expect("draw");

    // every label fits inside the measured height
    for command in canvas.commands() {
        if let DrawCommand::FillText { y, .. } = command {
            assert!(*y >= 0.0 && *y <= height);
        }
    }
    assert_eq!(canvas.texts(), vec!["0", "25", "50", "75", "100"]);
}

#[test]
fn drawing_clears_the_axis_state() {
    let mut axis = fixed(Side::Top, 0.0, 10.0, 2.0);
    assert!(axis.state().is_dirty_bits(ChartBit::AxisRange.bit()));
    axis.set_layout_size(200.0, 30.0);
    let mut canvas = RecordingCanvas::new(230.0, 30.0);
    axis.draw_axis(&mut canvas).expect("draw");
    assert!(axis.state().is_clean());
    assert!(!axis.needs_redraw());

    axis.set_max(20.0);
    assert!(axis.state().is_dirty_bits(ChartBit::AxisRange.bit()));
    axis.set_layout_size(200.0, 30.0);
    assert!(axis.needs_redraw());
}

#[test]
fn time_axis_ticks_land_on_calendar_units() {
    const HOUR: f64 = 3_600.0;
    let mut axis = Axis::time("time")
        .with_side(Side::Bottom)
        .with_config(AxisConfig::fixed(HOUR));
    axis.set(1_000.0, 3.0 * HOUR + 10.0);
    axis.set_layout_size(400.0, 30.0);
    let values: Vec<f64> = axis.major_ticks().iter().map(|tick| tick.value).collect();
    assert_eq!(values, vec![HOUR, 2.0 * HOUR, 3.0 * HOUR]);
    assert!(axis.major_ticks().iter().all(|tick| !tick.label.is_empty()));
}
