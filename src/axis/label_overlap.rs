use serde::{Deserialize, Serialize};

use crate::core::{Side, TickMark};

/// Lower bound of the font scale `NarrowFont` may apply.
pub const MIN_NARROW_FONT_SCALE: f64 = 0.7;
pub const MAX_NARROW_FONT_SCALE: f64 = 1.0;

/// How tick labels that do not fit the axis length are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OverlapPolicy {
    DoNothing,
    /// Shrink the label font, falling back to skipping below the minimum scale.
    NarrowFont,
    /// Show only every N-th label.
    #[default]
    SkipAlt,
    /// Stagger alternate labels when they collide.
    ShiftAlt,
    /// Always stagger alternate labels.
    ForcedShiftAlt,
}

impl OverlapPolicy {
    /// Whether alternate labels move one row further from the axis.
    #[must_use]
    pub const fn shifts(self, label_overlap: bool) -> bool {
        match self {
            Self::ShiftAlt => label_overlap,
            Self::ForcedShiftAlt => true,
            _ => false,
        }
    }
}

/// Outcome of the policy applied while measuring the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OverlapResolution {
    pub(crate) label_overlap: bool,
    pub(crate) scale_font: f64,
}

impl Default for OverlapResolution {
    fn default() -> Self {
        Self {
            label_overlap: false,
            scale_font: 1.0,
        }
    }
}

/// Label extents along the axis, summed over all visible major ticks.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LabelBudget {
    pub(crate) available: f64,
    /// `(count + 1) * largest label`.
    pub(crate) projected: f64,
    pub(crate) total: f64,
    pub(crate) max_size: f64,
}

pub(crate) fn resolve_overlap_policy(
    policy: OverlapPolicy,
    ticks: &mut [TickMark],
    budget: LabelBudget,
) -> OverlapResolution {
    let mut resolution = OverlapResolution::default();
    match policy {
        OverlapPolicy::DoNothing => {}
        OverlapPolicy::NarrowFont => {
            let scale = budget.available / budget.projected;
            if (MIN_NARROW_FONT_SCALE..=MAX_NARROW_FONT_SCALE).contains(&scale) {
                resolution.scale_font = scale;
            } else {
                resolution.scale_font = if scale.is_finite() {
                    scale.clamp(MIN_NARROW_FONT_SCALE, MAX_NARROW_FONT_SCALE)
                } else {
                    MAX_NARROW_FONT_SCALE
                };
                resolution.label_overlap = skip_alternate_labels(ticks, budget);
            }
        }
        OverlapPolicy::SkipAlt => {
            resolution.label_overlap = skip_alternate_labels(ticks, budget);
        }
        OverlapPolicy::ShiftAlt => {
            resolution.label_overlap = budget.projected > budget.available;
        }
        OverlapPolicy::ForcedShiftAlt => {
            resolution.label_overlap = true;
        }
    }
    resolution
}

/// Keeps every N-th visible label with `N = ceil(projected / available)`.
fn skip_alternate_labels(ticks: &mut [TickMark], budget: LabelBudget) -> bool {
    if budget.max_size <= 0.0 || budget.available >= budget.total {
        return false;
    }
    let stride = if budget.available > 0.0 {
        ((budget.projected / budget.available).ceil() as usize).max(1)
    } else {
        usize::MAX
    };
    let mut index = 0usize;
    for tick in ticks.iter_mut().filter(|tick| tick.visible) {
        if index % stride != 0 {
            tick.visible = false;
        }
        index += 1;
    }
    true
}

/// Whether the labels of two ticks are closer than `gap`.
///
/// Screen order depends on the side and on inversion, so the lower-positioned
/// label is compared against the higher-positioned one.
pub(crate) fn is_tick_labels_overlap(
    side: Side,
    first: &TickMark,
    second: &TickMark,
    gap: f64,
) -> bool {
    if !first.visible || !second.visible {
        return false;
    }
    let horizontal = side.is_horizontal();
    let (lower, upper) = if first.position <= second.position {
        (first, second)
    } else {
        (second, first)
    };
    upper.label_start(horizontal) - lower.label_end(horizontal) <= gap
}

/// Walks `ticks[start..]` with `stride`, comparing each label with the last
/// visible one. Colliding labels are hidden when `make_invisible` is set.
pub(crate) fn check_overlapping_labels(
    start: usize,
    stride: usize,
    ticks: &mut [TickMark],
    side: Side,
    gap: f64,
    make_invisible: bool,
) -> bool {
    let mut overlap = false;
    let mut last_visible: Option<usize> = None;
    for index in (start..ticks.len()).step_by(stride.max(1)) {
        if !ticks[index].visible {
            continue;
        }
        match last_visible {
            Some(last)
                if is_tick_labels_overlap(side, &ticks[last], &ticks[index], gap) =>
            {
                overlap = true;
                if make_invisible {
                    ticks[index].visible = false;
                }
            }
            _ => last_visible = Some(index),
        }
    }
    overlap
}

/// Hides labels that still collide after measuring. Staggered labels are
/// checked per row, even and odd indices separately.
pub(crate) fn hide_colliding_labels(
    ticks: &mut [TickMark],
    side: Side,
    gap: f64,
    label_overlap: bool,
) {
    if label_overlap {
        check_overlapping_labels(0, 2, ticks, side, gap, true);
        check_overlapping_labels(1, 2, ticks, side, gap, true);
    } else {
        check_overlapping_labels(0, 1, ticks, side, gap, true);
    }
}
