use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::{
    AxisKind, MAX_TICK_VALUES, RangeAlgorithm, RangeRequest, nice_tick_unit, padded_extent,
    stepped_values, tick_count_for_length,
};
use crate::axis::AxisConfig;
use crate::core::{AxisRange, calculate_new_scale};

pub(crate) const MINUTE: f64 = 60.0;
pub(crate) const HOUR: f64 = 3_600.0;
pub(crate) const DAY: f64 = 86_400.0;
/// Nominal month; units at or above it step through the calendar.
pub(crate) const MONTH: f64 = 30.0 * DAY;
pub(crate) const YEAR: f64 = 365.0 * DAY;

const FIXED_UNITS: [f64; 21] = [
    1.0,
    2.0,
    5.0,
    10.0,
    15.0,
    30.0,
    MINUTE,
    2.0 * MINUTE,
    5.0 * MINUTE,
    10.0 * MINUTE,
    15.0 * MINUTE,
    30.0 * MINUTE,
    HOUR,
    2.0 * HOUR,
    3.0 * HOUR,
    6.0 * HOUR,
    12.0 * HOUR,
    DAY,
    2.0 * DAY,
    7.0 * DAY,
    14.0 * DAY,
];

const MONTH_STEPS: [u32; 3] = [1, 3, 6];

/// Axis over unix timestamps in seconds.
///
/// Units below a month are multiples of whole seconds aligned to the epoch;
/// month and year units align to calendar boundaries in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRange;

impl TimeRange {
    fn unit_for(span: f64, tick_count: usize) -> f64 {
        let raw = span.abs() / tick_count.max(1) as f64;
        if !raw.is_finite() || raw <= 0.0 {
            return FIXED_UNITS[0];
        }
        if let Some(unit) = FIXED_UNITS.into_iter().find(|unit| *unit >= raw) {
            return unit;
        }
        if let Some(months) = MONTH_STEPS
            .into_iter()
            .find(|months| f64::from(*months) * MONTH >= raw)
        {
            return f64::from(months) * MONTH;
        }
        nice_tick_unit(raw / YEAR, 1).max(1.0).ceil() * YEAR
    }

    fn label_size(config: &AxisConfig) -> f64 {
        config.tick_label_style.font_size_px * 4.0
    }
}

impl RangeAlgorithm for TimeRange {
    fn kind(&self) -> AxisKind {
        AxisKind::Time
    }

    fn auto_range(&self, data_min: f64, data_max: f64, request: RangeRequest<'_>) -> AxisRange {
        let config = request.config;
        let (mut min, mut max) = padded_extent(data_min, data_max, config);
        let count = tick_count_for_length(
            request.length,
            request.label_size.max(Self::label_size(config)),
            config.max_major_tick_label_count,
        );
        let tick_unit = Self::unit_for(max - min, count);
        if config.auto_range_rounding {
            min = (min / tick_unit).floor() * tick_unit;
            max = (max / tick_unit).ceil() * tick_unit;
        }
        let scale = calculate_new_scale(request.side, request.length, min, max);
        AxisRange::new(min, max, request.length, scale, tick_unit)
    }

    fn compute_range(&self, min: f64, max: f64, request: RangeRequest<'_>) -> AxisRange {
        let scale = calculate_new_scale(request.side, request.length, min, max);
        AxisRange::new(min, max, request.length, scale, request.config.tick_unit)
    }

    fn preferred_tick_unit(&self, min: f64, max: f64, length: f64, config: &AxisConfig) -> f64 {
        let count = tick_count_for_length(
            length,
            Self::label_size(config),
            config.max_major_tick_label_count,
        );
        Self::unit_for(max - min, count)
    }

    fn major_tick_values(&self, range: &AxisRange) -> Vec<f64> {
        let unit = range.tick_unit;
        if unit < MONTH * 0.99 {
            return stepped_values(range.min, range.max, unit);
        }
        let months = if unit < YEAR * 0.99 {
            (unit / MONTH).round().max(1.0) as i64
        } else {
            (unit / YEAR).round().max(1.0) as i64 * 12
        };
        calendar_values(range.min, range.max, months)
    }

    fn minor_tick_values(
        &self,
        range: &AxisRange,
        major: &[f64],
        minor_tick_count: usize,
    ) -> Vec<f64> {
        if minor_tick_count < 2 {
            return Vec::new();
        }
        let mut values = Vec::new();
        for pair in major.windows(2) {
            let step = (pair[1] - pair[0]) / minor_tick_count as f64;
            values.extend((1..minor_tick_count).map(|index| pair[0] + index as f64 * step));
            if values.len() > MAX_TICK_VALUES {
                break;
            }
        }
        values.retain(|value| *value >= range.min && *value <= range.max);
        values
    }
}

/// Month starts inside `[min, max]`, stepping `months` calendar months.
fn calendar_values(min: f64, max: f64, months: i64) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || max < min {
        return Vec::new();
    }
    let Some(start) = DateTime::<Utc>::from_timestamp(min.floor() as i64, 0) else {
        return Vec::new();
    };
    let mut month_index = i64::from(start.year()) * 12 + i64::from(start.month0());
    month_index -= month_index.rem_euclid(months);

    let mut values = Vec::new();
    while values.len() < MAX_TICK_VALUES {
        let Some(timestamp) = month_start(month_index) else {
            break;
        };
        if timestamp > max {
            break;
        }
        if timestamp >= min {
            values.push(timestamp);
        }
        month_index += months;
    }
    values
}

fn month_start(month_index: i64) -> Option<f64> {
    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = u32::try_from(month_index.rem_euclid(12)).ok()? + 1;
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp() as f64)
}

#[cfg(test)]
mod tests {
    use super::{DAY, HOUR, MONTH, TimeRange, YEAR};
    use crate::axis::range::RangeAlgorithm;
    use crate::core::AxisRange;

    #[test]
    fn units_come_from_the_calendar_ladder() {
        assert_eq!(TimeRange::unit_for(50.0, 10), 5.0);
        assert_eq!(TimeRange::unit_for(10.0 * HOUR, 6), 2.0 * HOUR);
        assert_eq!(TimeRange::unit_for(200.0 * DAY, 4), 3.0 * MONTH);
        assert_eq!(TimeRange::unit_for(20.0 * YEAR, 4), 5.0 * YEAR);
    }

    #[test]
    fn month_ticks_land_on_first_of_month() {
        // 2024-01-15 .. 2024-05-20 UTC
        let range = AxisRange::new(1_705_276_800.0, 1_716_163_200.0, 400.0, 1.0, MONTH);
        let ticks = TimeRange.major_tick_values(&range);
        // Feb, Mar, Apr, May 1st
        assert_eq!(ticks.len(), 4);
        assert_eq!(ticks[0], 1_706_745_600.0);
    }

    #[test]
    fn hour_ticks_are_epoch_aligned() {
        let range = AxisRange::new(1_000.0, 3.0 * HOUR + 10.0, 400.0, 1.0, HOUR);
        assert_eq!(
            TimeRange.major_tick_values(&range),
            vec![HOUR, 2.0 * HOUR, 3.0 * HOUR]
        );
    }
}
