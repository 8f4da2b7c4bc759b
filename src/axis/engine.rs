use std::rc::Rc;

use tracing::{debug, trace};

use super::label_format::{AxisLabelFormatter, FormatterTable};
use super::range::{
    AxisKind, CategoryRange, LinearRange, LogRange, RangeAlgorithm, RangeRequest, TimeRange,
    tick_label_size,
};
use super::AxisConfig;
use crate::core::{AXIS_MASK, AxisRange, BitState, ChartBit, Side, TickMark, calculate_new_scale};
use crate::render::{EstimatedLabelMetrics, LabelMetrics};

/// Extent reported for a dimension the axis does not occupy.
pub const DEFAULT_AXIS_EXTENT: f64 = 150.0;

/// Ratio used to repair non-positive log bounds.
const LOG_BOUND_RATIO: f64 = 1e6;

const RANGE_BITS: u32 = ChartBit::mask(&[
    ChartBit::AxisRange,
    ChartBit::AxisLayout,
    ChartBit::AxisCanvas,
    ChartBit::AxisTickLabelText,
]);

const LABEL_BITS: u32 = ChartBit::mask(&[
    ChartBit::AxisLabelText,
    ChartBit::AxisLayout,
    ChartBit::AxisCanvas,
]);

const FORMAT_BITS: u32 = ChartBit::mask(&[
    ChartBit::AxisTickLabelText,
    ChartBit::AxisLayout,
    ChartBit::AxisCanvas,
]);

/// One chart axis: range, tick pools, label placement and drawing.
///
/// The range algorithm is fixed at construction. Tick pools persist across
/// layout passes and are only relabelled when the tick values change.
#[derive(Debug)]
pub struct Axis {
    name: String,
    unit: Option<String>,
    pub(super) side: Option<Side>,
    pub(super) config: AxisConfig,
    algorithm: Box<dyn RangeAlgorithm>,
    formatters: FormatterTable,
    user_formatter: Option<Box<dyn AxisLabelFormatter>>,
    pub(super) metrics: Box<dyn LabelMetrics>,
    state: Rc<BitState>,
    min: f64,
    max: f64,
    tick_unit: f64,
    auto_extent: Option<(f64, f64)>,
    auto_range_adopted: bool,
    pub(super) length: f64,
    scale: f64,
    cached_offset: f64,
    pub(super) width: f64,
    pub(super) height: f64,
    major_values: Vec<f64>,
    minor_values: Vec<f64>,
    pub(super) major_ticks: Vec<TickMark>,
    pub(super) minor_ticks: Vec<TickMark>,
    tick_allocations: usize,
    major_cache_valid: bool,
    minor_cache_valid: bool,
    pub(super) label_overlap: bool,
    pub(super) scale_font: f64,
    pub(super) max_label_width: f64,
    pub(super) max_label_height: f64,
    pub(super) needs_redraw: bool,
}

impl Axis {
    #[must_use]
    pub fn linear(name: impl Into<String>) -> Self {
        Self::with_algorithm(name, Box::new(LinearRange))
    }

    #[must_use]
    pub fn log(name: impl Into<String>) -> Self {
        let mut axis = Self::with_algorithm(name, Box::new(LogRange));
        axis.max = 10.0;
        axis.min = 1.0;
        axis
    }

    #[must_use]
    pub fn time(name: impl Into<String>) -> Self {
        Self::with_algorithm(name, Box::new(TimeRange))
    }

    #[must_use]
    pub fn category(name: impl Into<String>, categories: Vec<String>) -> Self {
        Self::with_algorithm(name, Box::new(CategoryRange::new(categories)))
    }

    #[must_use]
    pub fn with_algorithm(name: impl Into<String>, algorithm: Box<dyn RangeAlgorithm>) -> Self {
        let name = name.into();
        let config = AxisConfig::default();
        Self {
            state: Rc::new(BitState::init_dirty(format!("axis `{name}`"), AXIS_MASK)),
            name,
            unit: None,
            side: None,
            tick_unit: config.tick_unit,
            config,
            algorithm,
            formatters: FormatterTable::new(),
            user_formatter: None,
            metrics: Box::new(EstimatedLabelMetrics),
            min: 0.0,
            max: 1.0,
            auto_extent: None,
            auto_range_adopted: false,
            length: 0.0,
            scale: 1.0,
            cached_offset: 0.0,
            width: 0.0,
            height: 0.0,
            major_values: Vec::new(),
            minor_values: Vec::new(),
            major_ticks: Vec::new(),
            minor_ticks: Vec::new(),
            tick_allocations: 0,
            major_cache_valid: false,
            minor_cache_valid: false,
            label_overlap: false,
            scale_font: 1.0,
            max_label_width: 0.0,
            max_label_height: 0.0,
            needs_redraw: true,
        }
    }

    #[must_use]
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: AxisConfig) -> Self {
        self.tick_unit = config.tick_unit;
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Box<dyn LabelMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    #[must_use]
    pub fn side(&self) -> Option<Side> {
        self.side
    }

    #[must_use]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    #[must_use]
    pub fn kind(&self) -> AxisKind {
        self.algorithm.kind()
    }

    #[must_use]
    pub fn is_log(&self) -> bool {
        self.algorithm.is_log()
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.config.invert
    }

    #[must_use]
    pub fn state(&self) -> &Rc<BitState> {
        &self.state
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn tick_unit(&self) -> f64 {
        self.tick_unit
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn major_ticks(&self) -> &[TickMark] {
        &self.major_ticks
    }

    #[must_use]
    pub fn minor_ticks(&self) -> &[TickMark] {
        &self.minor_ticks
    }

    /// Tick marks constructed since the axis was created. Stays constant
    /// while the tick values do not change.
    #[must_use]
    pub fn tick_allocations(&self) -> usize {
        self.tick_allocations
    }

    #[must_use]
    pub fn is_label_overlap(&self) -> bool {
        self.label_overlap
    }

    /// Font scale chosen by [`OverlapPolicy::NarrowFont`](super::OverlapPolicy).
    #[must_use]
    pub fn scale_font(&self) -> f64 {
        self.scale_font
    }

    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    #[must_use]
    pub fn range(&self) -> AxisRange {
        AxisRange::new(self.min, self.max, self.length, self.scale, self.tick_unit)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name != self.name {
            self.name = name;
            self.state.set_dirty(LABEL_BITS);
        }
    }

    pub fn set_unit(&mut self, unit: Option<String>) {
        if unit != self.unit {
            self.unit = unit;
            self.state.set_dirty(LABEL_BITS);
        }
    }

    pub fn set_config(&mut self, config: AxisConfig) {
        if config != self.config {
            self.config = config;
            self.invalidate_tick_cache();
            self.state.set_dirty(AXIS_MASK);
        }
    }

    /// Replaces the default `{time, log}` formatter for this axis.
    pub fn set_formatter(&mut self, formatter: Option<Box<dyn AxisLabelFormatter>>) {
        self.user_formatter = formatter;
        self.invalidate_tick_cache();
        self.state.set_dirty(FORMAT_BITS);
    }

    /// Sets the lower bound.
    ///
    /// Returns `false` when the value is rejected. Log axes repair a
    /// non-positive minimum to `max / 1e6` when `max` is positive.
    pub fn set_min(&mut self, value: f64) -> bool {
        let mut value = value;
        if self.algorithm.is_log() && !is_positive_finite(value) {
            if self.max > 0.0 {
                value = self.max / LOG_BOUND_RATIO;
            } else {
                return false;
            }
        } else if !value.is_finite() {
            return false;
        }
        if value.to_bits() != self.min.to_bits() {
            self.min = value;
            self.bounds_changed();
        }
        true
    }

    /// Sets the upper bound.
    ///
    /// Returns `false` when the value is rejected. Log axes repair a
    /// non-positive maximum to `min * 1e6` when `min >= 0`.
    pub fn set_max(&mut self, value: f64) -> bool {
        let mut value = value;
        if self.algorithm.is_log() && !is_positive_finite(value) {
            if self.min >= 0.0 {
                value = self.min * LOG_BOUND_RATIO;
            } else {
                return false;
            }
        } else if !value.is_finite() {
            return false;
        }
        if value.to_bits() != self.max.to_bits() {
            self.max = value;
            self.bounds_changed();
        }
        true
    }

    pub fn set(&mut self, min: f64, max: f64) -> bool {
        let min_accepted = self.set_min(min);
        let max_accepted = self.set_max(max);
        min_accepted && max_accepted
    }

    /// Data extent the next auto-range pass fits.
    pub fn set_auto_range_extent(&mut self, extent: Option<(f64, f64)>) {
        self.auto_extent = extent;
    }

    #[must_use]
    pub fn auto_range_extent(&self) -> Option<(f64, f64)> {
        self.auto_extent
    }

    fn invalidate_tick_cache(&mut self) {
        self.major_cache_valid = false;
        self.minor_cache_valid = false;
    }

    fn bounds_changed(&mut self) {
        self.invalidate_tick_cache();
        self.update_scale();
        self.state.set_dirty(RANGE_BITS);
    }

    /// Side used for scale sign when the axis is not docked yet.
    fn scale_side(&self) -> Side {
        self.side.unwrap_or(Side::Bottom)
    }

    /// Recomputes the range for the current length.
    ///
    /// Auto-ranging axes fit the stored data extent; fixed axes keep their
    /// bounds. Returns whether the bounds changed.
    pub fn invalidate_range(&mut self) -> bool {
        let auto = self.config.auto_ranging || self.config.auto_grow_ranging;
        let request = RangeRequest {
            side: self.scale_side(),
            length: self.length,
            label_size: tick_label_size(&self.config),
            config: &self.config,
        };
        let mut candidate = match (auto, self.auto_extent) {
            (true, Some((data_min, data_max))) => {
                self.algorithm.auto_range(data_min, data_max, request)
            }
            _ => self.algorithm.compute_range(self.min, self.max, request),
        };
        if self.config.auto_grow_ranging && self.auto_range_adopted {
            candidate.min = candidate.min.min(self.min);
            candidate.max = candidate.max.max(self.max);
        }

        let current = self.range();
        let changed = !candidate.same_bounds(&current);
        if changed {
            debug!(
                axis = %self.name,
                old_min = current.min,
                old_max = current.max,
                min = candidate.min,
                max = candidate.max,
                "axis range adopted"
            );
            self.min = candidate.min;
            self.max = candidate.max;
            self.invalidate_tick_cache();
            self.state.set_dirty(RANGE_BITS);
        }
        if auto && self.auto_extent.is_some() {
            self.auto_range_adopted = true;
        }
        self.update_scale();
        changed
    }

    pub(super) fn update_scale(&mut self) {
        let lower = self.algorithm.transform(self.min);
        let upper = self.algorithm.transform(self.max);
        let scale = calculate_new_scale(self.scale_side(), self.length, lower, upper);
        self.scale = if self.config.invert { -scale } else { scale };
        self.cached_offset = if self.scale < 0.0 { self.length } else { 0.0 };
    }

    /// Screen position of `value` along the axis.
    #[must_use]
    pub fn display_position(&self, value: f64) -> f64 {
        let transformed = self.algorithm.transform(value);
        let origin = self.algorithm.transform(self.min);
        self.cached_offset + (transformed - origin) * self.scale
    }

    /// Inverse of [`display_position`](Self::display_position).
    #[must_use]
    pub fn value_for_display(&self, position: f64) -> f64 {
        let origin = self.algorithm.transform(self.min);
        self.algorithm
            .inverse_transform(origin + (position - self.cached_offset) / self.scale)
    }

    /// Position of value zero, NaN when zero is outside the range.
    #[must_use]
    pub fn zero_position(&self) -> f64 {
        if self.is_value_on_axis(0.0) {
            self.display_position(0.0)
        } else {
            f64::NAN
        }
    }

    #[must_use]
    pub fn is_value_on_axis(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Title as drawn: `name [prefix unit]`.
    #[must_use]
    pub fn axis_title(&self) -> String {
        let prefix = si_prefix(self.config.unit_scaling);
        match (self.unit.as_deref(), prefix) {
            (None, "") => self.name.clone(),
            (unit, prefix) => format!("{} [{prefix}{}]", self.name, unit.unwrap_or_default()),
        }
    }

    pub(super) fn update_tick_unit(&mut self, length: f64) {
        self.tick_unit = if self.config.auto_ranging {
            self.algorithm
                .preferred_tick_unit(self.min, self.max, length, &self.config)
        } else {
            self.config.tick_unit
        };
    }

    fn active_formatter(&self) -> &dyn AxisLabelFormatter {
        match &self.user_formatter {
            Some(formatter) => formatter.as_ref(),
            None => self
                .formatters
                .get(self.algorithm.is_time(), self.algorithm.is_log()),
        }
    }

    fn tick_label(&self, value: f64) -> String {
        if let Some(label) = self.algorithm.category_label(value) {
            return label;
        }
        self.active_formatter()
            .to_string(value / self.config.unit_scaling)
    }

    /// Regenerates major ticks. Returns `false` on a cache hit, in which case
    /// labels, sizes and visibility are left untouched.
    pub(super) fn update_major_ticks(&mut self) -> bool {
        let values = self.algorithm.major_tick_values(&self.range());
        if self.major_cache_valid && values == self.major_values {
            trace!(axis = %self.name, count = values.len(), "major tick cache hit");
            return false;
        }
        trace!(axis = %self.name, count = values.len(), "major ticks regenerated");

        let (is_time, is_log) = (self.algorithm.is_time(), self.algorithm.is_log());
        let unit_scaling = self.config.unit_scaling;
        match &mut self.user_formatter {
            Some(formatter) => formatter.update_formatter(&values, unit_scaling),
            None => self
                .formatters
                .get_mut(is_time, is_log)
                .update_formatter(&values, unit_scaling),
        }

        let style = self.config.tick_label_style;
        let rotation = self.config.tick_label_rotation;
        let labelled: Vec<(String, f64, f64)> = values
            .iter()
            .map(|value| {
                let label = self.tick_label(*value);
                let (width, height) =
                    self.metrics
                        .measure_rotated(&label, style.font_size_px, rotation);
                (label, width, height)
            })
            .collect();

        resize_pool(&mut self.major_ticks, values.len(), &mut self.tick_allocations);
        for ((tick, value), (label, width, height)) in
            self.major_ticks.iter_mut().zip(&values).zip(labelled)
        {
            tick.set_value(*value, label);
            tick.width = width;
            tick.height = height;
        }
        self.major_values = values;
        self.major_cache_valid = true;
        true
    }

    /// Regenerates minor ticks with empty labels.
    pub(super) fn update_minor_ticks(&mut self) -> bool {
        let values = if self.config.minor_tick_visible && self.config.minor_tick_count > 0 {
            self.algorithm.minor_tick_values(
                &self.range(),
                &self.major_values,
                self.config.minor_tick_count,
            )
        } else {
            Vec::new()
        };
        if self.minor_cache_valid && values == self.minor_values {
            return false;
        }
        resize_pool(&mut self.minor_ticks, values.len(), &mut self.tick_allocations);
        for (tick, value) in self.minor_ticks.iter_mut().zip(&values) {
            tick.set_value(*value, String::new());
            tick.width = 0.0;
            tick.height = 0.0;
        }
        self.minor_values = values;
        self.minor_cache_valid = true;
        true
    }

    pub(super) fn update_tick_positions(&mut self) {
        let positions: Vec<f64> = self
            .major_ticks
            .iter()
            .map(|tick| self.display_position(tick.value))
            .collect();
        for (tick, position) in self.major_ticks.iter_mut().zip(positions) {
            tick.position = position;
        }
        let positions: Vec<f64> = self
            .minor_ticks
            .iter()
            .map(|tick| self.display_position(tick.value))
            .collect();
        for (tick, position) in self.minor_ticks.iter_mut().zip(positions) {
            tick.position = position;
        }
    }

    /// Tick unit, major ticks, minor ticks and positions for the current
    /// length. Returns whether any tick value changed.
    pub fn recompute_ticks(&mut self) -> bool {
        self.update_tick_unit(self.length);
        let major_changed = self.update_major_ticks();
        let minor_changed = self.update_minor_ticks();
        self.update_tick_positions();
        major_changed || minor_changed
    }

    /// Applies the size assigned by the chart layout.
    pub fn set_layout_size(&mut self, width: f64, height: f64) {
        let size_changed =
            width.to_bits() != self.width.to_bits() || height.to_bits() != self.height.to_bits();
        self.width = width;
        self.height = height;
        let length = match self.side {
            Some(side) if side.is_horizontal() => width,
            Some(_) => height,
            None => 0.0,
        };
        if length.to_bits() != self.length.to_bits() {
            self.length = length;
            self.update_scale();
        }
        self.recompute_ticks();
        if size_changed || self.state.is_dirty() {
            self.needs_redraw = true;
        }
    }

    pub fn clear_state(&self) {
        self.state.clear();
    }
}

fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn resize_pool(pool: &mut Vec<TickMark>, len: usize, allocations: &mut usize) {
    if pool.len() > len {
        pool.truncate(len);
    }
    while pool.len() < len {
        pool.push(TickMark::default());
        *allocations += 1;
    }
}

/// Metric prefix for a unit scaling that is a power of 1000.
fn si_prefix(unit_scaling: f64) -> &'static str {
    const PREFIXES: [(i32, &str); 10] = [
        (-15, "f"),
        (-12, "p"),
        (-9, "n"),
        (-6, "µ"),
        (-3, "m"),
        (3, "k"),
        (6, "M"),
        (9, "G"),
        (12, "T"),
        (15, "P"),
    ];
    if !unit_scaling.is_finite() || unit_scaling <= 0.0 {
        return "";
    }
    let exponent = unit_scaling.log10().round() as i32;
    let exact = (unit_scaling / 10.0_f64.powi(exponent) - 1.0).abs() < 1e-9;
    if !exact {
        return "";
    }
    PREFIXES
        .iter()
        .find(|(candidate, _)| *candidate == exponent)
        .map_or("", |(_, prefix)| *prefix)
}
