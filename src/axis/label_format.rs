use std::fmt;

use chrono::{DateTime, Utc};

use super::range::{DAY, MONTH, YEAR};

/// Turns scaled tick values into label text.
///
/// `update_formatter` sees every tick of a pass before any label is produced,
/// so precision or a shared exponent can be chosen once for all ticks.
pub trait AxisLabelFormatter: fmt::Debug {
    fn to_string(&self, scaled_value: f64) -> String;

    fn update_formatter(&mut self, tick_values: &[f64], unit_scaling: f64);
}

/// Values at or above this magnitude switch to a shared exponent.
const EXPONENT_UPPER: f64 = 1e5;
const EXPONENT_LOWER: f64 = 1e-3;
const MAX_PRECISION: usize = 12;

/// Decimal formatter with shared precision and optional shared exponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultFormatter {
    precision: usize,
    exponent: Option<i32>,
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self {
            precision: 2,
            exponent: None,
        }
    }
}

impl DefaultFormatter {
    #[must_use]
    pub fn precision(&self) -> usize {
        self.precision
    }

    #[must_use]
    pub fn exponent(&self) -> Option<i32> {
        self.exponent
    }
}

impl AxisLabelFormatter for DefaultFormatter {
    fn to_string(&self, scaled_value: f64) -> String {
        if !scaled_value.is_finite() {
            return "nan".to_owned();
        }
        let precision = self.precision;
        match self.exponent {
            Some(exponent) => {
                let mantissa = scaled_value / 10.0_f64.powi(exponent);
                format!("{}E{exponent}", fix_negative_zero(format!("{mantissa:.precision$}")))
            }
            None => fix_negative_zero(format!("{scaled_value:.precision$}")),
        }
    }

    fn update_formatter(&mut self, tick_values: &[f64], unit_scaling: f64) {
        let scaling = if unit_scaling.is_finite() && unit_scaling != 0.0 {
            unit_scaling
        } else {
            1.0
        };
        let scaled: Vec<f64> = tick_values.iter().map(|value| value / scaling).collect();
        let step = tick_step_hint_from_values(&scaled);
        let max_abs = scaled
            .iter()
            .filter(|value| value.is_finite())
            .fold(0.0_f64, |acc, value| acc.max(value.abs()));

        if max_abs >= EXPONENT_UPPER || (max_abs > 0.0 && max_abs < EXPONENT_LOWER) {
            let exponent = max_abs.log10().floor() as i32;
            self.exponent = Some(exponent);
            self.precision = precision_from_step(step / 10.0_f64.powi(exponent));
        } else {
            self.exponent = None;
            self.precision = if step > 0.0 {
                precision_from_step(step)
            } else {
                precision_from_step(max_abs)
            };
        }
    }
}

/// Log axis labels: decades far from one use `1E<n>`, the rest plain decimals.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFormatter;

impl AxisLabelFormatter for LogFormatter {
    fn to_string(&self, scaled_value: f64) -> String {
        if !scaled_value.is_finite() {
            return "nan".to_owned();
        }
        if scaled_value <= 0.0 {
            return fix_negative_zero(format!("{scaled_value}"));
        }
        let exponent = scaled_value.log10().round() as i32;
        let decade = 10.0_f64.powi(exponent);
        if exponent.abs() >= 3 && (scaled_value - decade).abs() <= decade * 1e-9 {
            return format!("1E{exponent}");
        }
        let precision = (-scaled_value.log10().floor()).clamp(0.0, MAX_PRECISION as f64) as usize;
        format!("{scaled_value:.precision$}")
    }

    fn update_formatter(&mut self, _tick_values: &[f64], _unit_scaling: f64) {}
}

/// Unix-seconds formatter picking the pattern from the tick spacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormatter {
    pattern: &'static str,
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self {
            pattern: "%Y-%m-%d %H:%M:%S",
        }
    }
}

impl TimeFormatter {
    #[must_use]
    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    fn pattern_for(step: f64, span: f64) -> &'static str {
        if step <= 0.0 || !step.is_finite() {
            "%Y-%m-%d %H:%M:%S"
        } else if step < 1.0 {
            "%H:%M:%S%.3f"
        } else if step < 60.0 {
            "%H:%M:%S"
        } else if step < DAY {
            if span > DAY { "%m-%d %H:%M" } else { "%H:%M" }
        } else if step < MONTH * 0.9 {
            "%Y-%m-%d"
        } else if step < YEAR * 0.9 {
            "%Y-%m"
        } else {
            "%Y"
        }
    }
}

impl AxisLabelFormatter for TimeFormatter {
    fn to_string(&self, scaled_value: f64) -> String {
        if !scaled_value.is_finite() {
            return "nan".to_owned();
        }
        let seconds = scaled_value.floor();
        let nanos = ((scaled_value - seconds) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
        match DateTime::<Utc>::from_timestamp(seconds as i64, nanos) {
            Some(instant) => instant.format(self.pattern).to_string(),
            None => format!("{scaled_value:.0}"),
        }
    }

    fn update_formatter(&mut self, tick_values: &[f64], unit_scaling: f64) {
        let scaling = if unit_scaling.is_finite() && unit_scaling != 0.0 {
            unit_scaling
        } else {
            1.0
        };
        let step = tick_step_hint_from_values(tick_values) / scaling;
        let span = match (tick_values.first(), tick_values.last()) {
            (Some(first), Some(last)) => (last - first).abs() / scaling,
            _ => 0.0,
        };
        self.pattern = Self::pattern_for(step, span);
    }
}

/// Default formatters keyed by `{is_time, is_log}`, built once per axis.
#[derive(Debug)]
pub(crate) struct FormatterTable {
    formatters: [Box<dyn AxisLabelFormatter>; 4],
}

impl FormatterTable {
    pub(crate) fn new() -> Self {
        Self {
            formatters: [
                Box::new(DefaultFormatter::default()),
                Box::new(LogFormatter),
                Box::new(TimeFormatter::default()),
                Box::new(TimeFormatter::default()),
            ],
        }
    }

    const fn index(is_time: bool, is_log: bool) -> usize {
        ((is_time as usize) << 1) | is_log as usize
    }

    pub(crate) fn get(&self, is_time: bool, is_log: bool) -> &dyn AxisLabelFormatter {
        self.formatters[Self::index(is_time, is_log)].as_ref()
    }

    pub(crate) fn get_mut(&mut self, is_time: bool, is_log: bool) -> &mut dyn AxisLabelFormatter {
        self.formatters[Self::index(is_time, is_log)].as_mut()
    }
}

/// Smallest positive spacing between consecutive values.
pub(crate) fn tick_step_hint_from_values(values: &[f64]) -> f64 {
    let best = values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .filter(|step| step.is_finite() && *step > 0.0)
        .fold(f64::INFINITY, f64::min);
    if best.is_finite() { best } else { 0.0 }
}

fn precision_from_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 {
        return 0;
    }
    let text = format!("{:.12}", step.abs());
    let Some((_, fraction)) = text.split_once('.') else {
        return 0;
    };
    fraction.trim_end_matches('0').len().min(MAX_PRECISION)
}

fn fix_negative_zero(text: String) -> String {
    let is_zero = text
        .trim_start_matches('-')
        .chars()
        .all(|ch| ch == '0' || ch == '.');
    if is_zero && text.starts_with('-') {
        text[1..].to_owned()
    } else {
        text
    }
}
