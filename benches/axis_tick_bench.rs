use std::hint::black_box;
use std::sync::Arc;

use chart_layout::api::Chart;
use chart_layout::axis::{Axis, AxisConfig};
use chart_layout::core::{DataPoint, Orientation, Rect, Side};
use chart_layout::dataset::{DataSet, DefaultDataSet};
use chart_layout::extensions::LineRenderer;
use chart_layout::render::RecordingCanvas;
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_auto_range_and_ticks(c: &mut Criterion) {
    let mut axis = Axis::linear("x").with_side(Side::Bottom);
    axis.set_layout_size(1_600.0, 40.0);
    let mut extent = 0.0;

    c.bench_function("axis_auto_range_ticks", |b| {
        b.iter(|| {
            extent += 1.0;
            axis.set_auto_range_extent(Some((0.0, black_box(1_000.0 + extent % 500.0))));
            axis.invalidate_range();
            axis.recompute_ticks();
        })
    });
}

fn bench_pref_size_and_draw(c: &mut Criterion) {
    let mut axis = Axis::linear("y")
        .with_side(Side::Left)
        .with_config(AxisConfig::fixed(2.5));
    axis.set(0.0, 250.0);
    let mut canvas = RecordingCanvas::new(80.0, 930.0);

    c.bench_function("axis_pref_width_and_draw", |b| {
        b.iter(|| {
            let width = axis.compute_pref_width(black_box(900.0));
            axis.set_layout_size(width + 1.0, 900.0);
            axis.set_layout_size(width, 900.0);
            axis.draw_axis(&mut canvas).expect("draw");
        })
    });
}

fn bench_chart_cycle_10k(c: &mut Criterion) {
    let points: Vec<DataPoint> = (0..10_000)
        .map(|i| {
            let x = f64::from(i);
            DataPoint::new(x, (x * 0.01).sin() * 100.0)
        })
        .collect();
    let dataset = Arc::new(DefaultDataSet::with_points("sine", points));
    let mut chart = Chart::headless().expect("chart");
    chart.first_axis(Orientation::Horizontal).expect("x axis");
    chart.first_axis(Orientation::Vertical).expect("y axis");
    chart
        .add_renderer(Box::new(LineRenderer::new("line")))
        .expect("renderer");
    let shared: Arc<dyn DataSet> = dataset.clone();
    chart.add_dataset(shared).expect("dataset");
    let bounds = Rect::new(0.0, 0.0, 1_600.0, 900.0);

    c.bench_function("chart_cycle_10k_points", |b| {
        b.iter(|| {
            chart.request_layout();
            chart.pulse(black_box(bounds)).expect("pulse");
        })
    });
}

criterion_group!(
    benches,
    bench_auto_range_and_ticks,
    bench_pref_size_and_draw,
    bench_chart_cycle_10k
);
criterion_main!(benches);
