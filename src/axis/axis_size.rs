use super::engine::{Axis, DEFAULT_AXIS_EXTENT};
use super::label_overlap::{LabelBudget, OverlapResolution, resolve_overlap_policy};
use crate::core::Side;

impl Axis {
    /// Preferred height for a given width.
    ///
    /// Only outer horizontal axes have a height of their own; the rest report
    /// the default extent.
    pub fn compute_pref_height(&mut self, width: f64) -> f64 {
        match self.side {
            Some(side) if side.is_horizontal() && side != Side::CenterHor => {
                self.compute_pref_length(width)
            }
            _ => DEFAULT_AXIS_EXTENT,
        }
    }

    /// Preferred width for a given height, see [`compute_pref_height`](Self::compute_pref_height).
    pub fn compute_pref_width(&mut self, height: f64) -> f64 {
        match self.side {
            Some(side) if side.is_vertical() && side != Side::CenterVer => {
                self.compute_pref_length(height)
            }
            _ => DEFAULT_AXIS_EXTENT,
        }
    }

    /// Extent perpendicular to the axis needed for tick marks, tick labels and
    /// title when the axis is `max_length` long.
    ///
    /// Runs the same tick pipeline as drawing and records the overlap outcome
    /// the draw pass relies on.
    pub(super) fn compute_pref_length(&mut self, max_length: f64) -> f64 {
        let horizontal = self.side.is_some_and(Side::is_horizontal);
        let axis_label_length = self.axis_label_length();

        if !self.config.tick_mark_visible {
            return axis_label_length
                + self.config.major_tick_style.stroke_width
                + self.config.tick_label_gap;
        }

        self.update_tick_unit(max_length);
        self.update_major_ticks();

        let mut resolution = OverlapResolution::default();
        let (mut max_width, mut max_height) = (0.0_f64, 0.0_f64);
        if self.config.tick_labels_visible {
            let spacing = self.config.tick_label_spacing;
            let mut budget = LabelBudget {
                available: max_length,
                ..LabelBudget::default()
            };
            for tick in &mut self.major_ticks {
                tick.visible = true;
                let size = tick.extent(horizontal) + 2.0 * spacing;
                budget.total += size;
                budget.max_size = budget.max_size.max(size);
                max_width = max_width.max(tick.width);
                max_height = max_height.max(tick.height);
            }
            budget.projected = (self.major_ticks.len() + 1) as f64 * budget.max_size;
            resolution =
                resolve_overlap_policy(self.config.overlap_policy, &mut self.major_ticks, budget);
        }
        self.label_overlap = resolution.label_overlap;
        self.scale_font = resolution.scale_font;
        self.max_label_width = max_width;
        self.max_label_height = max_height;

        let gap = self.config.tick_label_gap;
        let label_size = if horizontal { max_height } else { max_width };
        let tick_label_length = if self.label_overlap {
            2.0 * label_size + 3.0 * gap
        } else {
            label_size + 2.0 * gap
        };
        self.config.tick_length + tick_label_length + axis_label_length
    }

    /// Title block: the title's text height plus a gap on both sides. Vertical
    /// titles are rotated, so the text height is their width as well.
    fn axis_label_length(&self) -> f64 {
        let title = self.axis_title();
        if title.trim().is_empty() {
            return 0.0;
        }
        let (_, height) = self
            .metrics
            .measure(&title, self.config.axis_label_style.font_size_px);
        height + 2.0 * self.config.axis_label_gap
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::axis::engine::DEFAULT_AXIS_EXTENT;
    use crate::axis::{Axis, AxisConfig, OverlapPolicy};
    use crate::core::Side;

    fn bottom(policy: OverlapPolicy) -> Axis {
        let mut axis = Axis::linear("")
            .with_side(Side::Bottom)
            .with_config(AxisConfig::fixed(10.0).with_overlap_policy(policy));
        axis.set(0.0, 100.0);
        axis
    }

    #[test]
    fn unset_or_foreign_dimension_uses_default_extent() {
        let mut axis = Axis::linear("x");
        assert_eq!(axis.compute_pref_height(300.0), DEFAULT_AXIS_EXTENT);
        let mut left = Axis::linear("y").with_side(Side::Left);
        assert_eq!(left.compute_pref_height(300.0), DEFAULT_AXIS_EXTENT);
        let mut center = Axis::linear("c").with_side(Side::CenterHor);
        assert_eq!(center.compute_pref_height(300.0), DEFAULT_AXIS_EXTENT);
    }

    #[test]
    fn roomy_axis_needs_one_label_row() {
        let mut axis = bottom(OverlapPolicy::SkipAlt);
        let height = axis.compute_pref_height(1_000.0);
        // tick length 8, label height 12, two gaps of 3, no title
        assert_relative_eq!(height, 8.0 + 12.0 + 6.0, epsilon = 1e-9);
        assert!(!axis.is_label_overlap());
        assert!(axis.major_ticks().iter().all(|t| t.visible));
    }

    #[test]
    fn staggered_labels_double_the_label_block() {
        let mut axis = bottom(OverlapPolicy::ForcedShiftAlt);
        let height = axis.compute_pref_height(1_000.0);
        assert_relative_eq!(height, 8.0 + 24.0 + 9.0, epsilon = 1e-9);
    }

    #[test]
    fn crowded_axis_skips_labels() {
        let mut axis = bottom(OverlapPolicy::SkipAlt);
        axis.compute_pref_height(60.0);
        assert!(axis.is_label_overlap());
        let visible = axis.major_ticks().iter().filter(|t| t.visible).count();
        assert!(visible < axis.major_ticks().len());
        assert!(axis.major_ticks()[0].visible);
    }

    #[test]
    fn title_adds_its_own_block() {
        let mut axis = bottom(OverlapPolicy::SkipAlt);
        let without = axis.compute_pref_height(1_000.0);
        axis.set_name("time");
        let with = axis.compute_pref_height(1_000.0);
        // 12px title font measures 14.4 high, plus two 3px gaps
        assert_relative_eq!(with - without, 14.4 + 6.0, epsilon = 1e-9);
    }

    #[test]
    fn hidden_tick_marks_only_reserve_title_and_stroke() {
        let mut axis = Axis::linear("")
            .with_side(Side::Left)
            .with_config(AxisConfig::default().with_tick_mark_visible(false));
        assert_relative_eq!(axis.compute_pref_width(300.0), 1.0 + 3.0);
    }
}
