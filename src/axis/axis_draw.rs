use super::engine::Axis;
use super::label_overlap::{OverlapPolicy, hide_colliding_labels};
use crate::core::{Side, TickMark};
use crate::error::ChartResult;
use crate::render::{Canvas, PathStyle, TextHAlign, TextVAlign};

/// Centers a one pixel line on the pixel grid.
fn snap(value: f64) -> f64 {
    value.round() + 0.5
}

fn with_saved(
    canvas: &mut dyn Canvas,
    draw: impl FnOnce(&mut dyn Canvas) -> ChartResult<()>,
) -> ChartResult<()> {
    canvas.save();
    let result = draw(&mut *canvas);
    canvas.restore();
    result
}

/// Text anchor of tick labels for a side and label rotation.
#[must_use]
pub fn tick_label_alignment(side: Side, rotation_deg: f64) -> (TextHAlign, TextVAlign) {
    let rotated = rotation_deg != 0.0;
    let quarter_turn = rotated && rotation_deg % 90.0 == 0.0;
    match side {
        Side::Top if !rotated => (TextHAlign::Center, TextVAlign::Bottom),
        Side::Top if quarter_turn => (TextHAlign::Left, TextVAlign::Center),
        Side::Top => (TextHAlign::Left, TextVAlign::Bottom),
        Side::Bottom | Side::CenterHor if !rotated => (TextHAlign::Center, TextVAlign::Top),
        Side::Bottom | Side::CenterHor if quarter_turn => (TextHAlign::Left, TextVAlign::Center),
        Side::Bottom | Side::CenterHor => (TextHAlign::Left, TextVAlign::Top),
        Side::Left if quarter_turn => (TextHAlign::Center, TextVAlign::Bottom),
        Side::Left => (TextHAlign::Right, TextVAlign::Center),
        Side::Right | Side::CenterVer if quarter_turn => (TextHAlign::Center, TextVAlign::Top),
        Side::Right | Side::CenterVer => (TextHAlign::Left, TextVAlign::Center),
    }
}

impl Axis {
    /// Draws the axis into its own canvas.
    ///
    /// Skipped while nothing changed since the last draw. An axis without a
    /// side has nothing to draw. Clears the axis state when done.
    pub fn draw_axis(&mut self, canvas: &mut dyn Canvas) -> ChartResult<()> {
        if !self.needs_redraw {
            return Ok(());
        }
        let Some(side) = self.side else {
            self.needs_redraw = false;
            return Ok(());
        };
        let (canvas_width, canvas_height) = canvas.size();
        canvas.clear_rect(0.0, 0.0, canvas_width, canvas_height)?;

        if self.config.tick_mark_visible {
            self.update_minor_ticks();
            self.update_tick_positions();

            let tick_count = self.major_ticks.len() + self.minor_ticks.len();
            if self.config.minor_tick_visible && self.length > (tick_count * 2) as f64 {
                let minor_style = self.config.minor_tick_style;
                let minor_length = self.config.minor_tick_length;
                self.draw_tick_marks(canvas, side, &self.minor_ticks, minor_length, &minor_style)?;
                self.draw_tick_labels(canvas, side, &self.minor_ticks, minor_length)?;
            }

            if self.config.overlap_policy != OverlapPolicy::DoNothing {
                hide_colliding_labels(
                    &mut self.major_ticks,
                    side,
                    self.config.tick_label_gap,
                    self.label_overlap,
                );
            }
            let major_style = self.config.major_tick_style;
            let tick_length = self.config.tick_length;
            self.draw_tick_marks(canvas, side, &self.major_ticks, tick_length, &major_style)?;
            self.draw_tick_labels(canvas, side, &self.major_ticks, tick_length)?;
        }

        self.draw_axis_label(canvas, side)?;
        self.draw_axis_line(canvas, side)?;
        self.needs_redraw = false;
        self.clear_state();
        Ok(())
    }

    /// Axis canvases are larger than the axis by the padding on both ends.
    fn translate_padding(&self, canvas: &mut dyn Canvas, side: Side) {
        let padding = self.config.axis_padding;
        if side.is_horizontal() {
            canvas.translate(padding, 0.0);
        } else {
            canvas.translate(0.0, padding);
        }
    }

    fn draw_tick_marks(
        &self,
        canvas: &mut dyn Canvas,
        side: Side,
        ticks: &[TickMark],
        tick_length: f64,
        style: &PathStyle,
    ) -> ChartResult<()> {
        let (width, height, length) = (self.width, self.height, self.length);
        let center = self.config.axis_center_position;
        with_saved(canvas, |canvas| {
            canvas.set_stroke_style(style);
            self.translate_padding(canvas, side);
            for tick in ticks {
                let position = tick.position;
                if !(0.0..=length).contains(&position) {
                    continue;
                }
                let (x1, y1, x2, y2) = match side {
                    Side::Left => (
                        snap(width - tick_length),
                        snap(position),
                        snap(width),
                        snap(position),
                    ),
                    Side::Right => (snap(0.0), snap(position), snap(tick_length), snap(position)),
                    Side::Top => (
                        snap(position),
                        snap(height),
                        snap(position),
                        snap(height - tick_length),
                    ),
                    Side::Bottom => (snap(position), snap(0.0), snap(position), snap(tick_length)),
                    Side::CenterHor => (
                        snap(position),
                        snap(center * height - tick_length),
                        snap(position),
                        snap(center * height + tick_length),
                    ),
                    Side::CenterVer => (
                        snap(center * width - tick_length),
                        snap(position),
                        snap(center * width + tick_length),
                        snap(position),
                    ),
                };
                canvas.stroke_line(x1, y1, x2, y2)?;
            }
            Ok(())
        })
    }

    fn draw_tick_labels(
        &self,
        canvas: &mut dyn Canvas,
        side: Side,
        ticks: &[TickMark],
        tick_length: f64,
    ) -> ChartResult<()> {
        let Some(first) = ticks.first() else {
            return Ok(());
        };
        if tick_length <= 0.0 {
            return Ok(());
        }
        let config = &self.config;
        let rotation = config.tick_label_rotation;
        let (h_align, v_align) = tick_label_alignment(side, rotation);
        let mut style = config
            .tick_label_style
            .with_alignment(h_align, v_align)
            .with_rotation(rotation);
        style.font_size_px *= self.scale_font;
        let font_size = style.font_size_px;

        let gap = config.tick_label_gap;
        let policy = config.overlap_policy;
        let shifts = policy.shifts(self.label_overlap);
        let (width, height, length) = (self.width, self.height, self.length);
        let center = config.axis_center_position;
        let mut counter = (first.value.trunc() as i64).rem_euclid(2);

        with_saved(canvas, |canvas| {
            canvas.set_text_style(&style);
            self.translate_padding(canvas, side);
            for tick in ticks {
                if !tick.visible || tick.label.is_empty() {
                    continue;
                }
                let position = tick.position;
                if !(0.0..=length).contains(&position) {
                    continue;
                }
                let shift = if shifts {
                    (counter % 2) as f64 * (gap + font_size)
                } else {
                    0.0
                };
                let (x, y) = match side {
                    Side::Left => (width - tick_length - gap - shift, position),
                    Side::Right => (tick_length + gap + shift, position),
                    Side::CenterVer => (center * width + tick_length + gap + shift, position),
                    Side::Top => (position, height - tick_length - gap - shift),
                    Side::Bottom => (position, tick_length + gap + shift),
                    Side::CenterHor => (position, center * height + tick_length + gap + shift),
                };
                let draw = match policy {
                    OverlapPolicy::DoNothing
                    | OverlapPolicy::ShiftAlt
                    | OverlapPolicy::ForcedShiftAlt => true,
                    OverlapPolicy::NarrowFont | OverlapPolicy::SkipAlt => {
                        counter % 2 == 0 || !self.label_overlap || self.scale_font < 1.0
                    }
                };
                if draw {
                    canvas.fill_text(&tick.label, x, y)?;
                }
                counter += 1;
            }
            Ok(())
        })
    }

    fn draw_axis_label(&self, canvas: &mut dyn Canvas, side: Side) -> ChartResult<()> {
        let title = self.axis_title();
        if title.trim().is_empty() {
            return Ok(());
        }
        let config = &self.config;
        let gap = config.tick_label_gap;
        let axis_gap = config.axis_label_gap;
        let tick_length = config.tick_length;
        let (width, height) = (self.width, self.height);
        let center = config.axis_center_position;

        let h_align = if side.is_center() {
            TextHAlign::Right
        } else {
            TextHAlign::Center
        };
        let (anchor, label_gap) = match h_align {
            TextHAlign::Left => (0.0, gap),
            TextHAlign::Right => (1.0, -gap),
            TextHAlign::Center => (0.5, 0.0),
        };
        let label_size = if side.is_horizontal() {
            self.max_label_height
        } else {
            self.max_label_width
        };
        let shifted = if config.overlap_policy.shifts(self.label_overlap) {
            label_size + gap
        } else {
            0.0
        };
        let vertical_y = (1.0 - anchor) * height - label_gap;
        let horizontal_x = anchor * width + label_gap;
        let (x, y, v_align, rotation) = match side {
            Side::Left => (
                width - tick_length - 2.0 * gap - label_size - axis_gap - shifted,
                vertical_y,
                TextVAlign::Baseline,
                -90.0,
            ),
            Side::Right => (
                tick_length + gap + label_size + axis_gap + shifted,
                vertical_y,
                TextVAlign::Top,
                -90.0,
            ),
            Side::CenterVer => (
                center * width - tick_length - 2.0 * gap - label_size - axis_gap - shifted,
                vertical_y,
                TextVAlign::Top,
                -90.0,
            ),
            Side::Top => (
                horizontal_x,
                height - tick_length - gap - label_size - axis_gap - shifted,
                TextVAlign::Bottom,
                0.0,
            ),
            Side::Bottom => (
                horizontal_x,
                tick_length + gap + label_size + axis_gap + shifted,
                TextVAlign::Top,
                0.0,
            ),
            Side::CenterHor => (
                horizontal_x,
                center * height + tick_length + gap + label_size + axis_gap + shifted,
                TextVAlign::Top,
                0.0,
            ),
        };
        let style = config
            .axis_label_style
            .with_alignment(h_align, v_align)
            .with_rotation(rotation);
        with_saved(canvas, |canvas| {
            canvas.set_text_style(&style);
            self.translate_padding(canvas, side);
            canvas.fill_text(&title, x, y)
        })
    }

    fn draw_axis_line(&self, canvas: &mut dyn Canvas, side: Side) -> ChartResult<()> {
        let (width, height, length) = (self.width, self.height, self.length);
        let center = self.config.axis_center_position;
        let style = self.config.major_tick_style;
        let (x1, y1, x2, y2) = match side {
            Side::Left => (snap(width) - 1.0, snap(0.0), snap(width) - 1.0, snap(length)),
            Side::Right => (snap(0.0), snap(0.0), snap(0.0), snap(length)),
            Side::Top => (snap(0.0), snap(height) - 1.0, snap(length), snap(height) - 1.0),
            Side::Bottom => (snap(0.0), snap(0.0), snap(length), snap(0.0)),
            Side::CenterHor => (snap(0.0), center * height, snap(length), center * height),
            Side::CenterVer => (
                snap(center * width),
                snap(0.0),
                snap(center * width),
                snap(length),
            ),
        };
        with_saved(canvas, |canvas| {
            canvas.set_stroke_style(&style);
            self.translate_padding(canvas, side);
            canvas.stroke_line(x1, y1, x2, y2)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::tick_label_alignment;
    use crate::axis::{Axis, AxisConfig, OverlapPolicy};
    use crate::core::Side;
    use crate::render::{DrawCommand, RecordingCanvas, TextHAlign, TextVAlign};

    fn axis(side: Side, config: AxisConfig) -> Axis {
        let mut axis = Axis::linear("").with_side(side).with_config(config);
        axis.set(0.0, 100.0);
        axis
    }

    fn lines(canvas: &RecordingCanvas) -> Vec<(f64, f64, f64, f64)> {
        canvas
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::StrokeLine { x1, y1, x2, y2, .. } => Some((*x1, *y1, *x2, *y2)),
                _ => None,
            })
            .collect()
    }

    fn text_positions(canvas: &RecordingCanvas) -> Vec<(f64, f64)> {
        canvas
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillText { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn bottom_axis_draws_marks_labels_then_line() {
        let config = AxisConfig::fixed(20.0).with_minor_tick_visible(false);
        let mut axis = axis(Side::Bottom, config);
        axis.compute_pref_height(200.0);
        axis.set_layout_size(200.0, 40.0);
        let mut canvas = RecordingCanvas::new(230.0, 40.0);
        axis.draw_axis(&mut canvas).expect("draw");

        assert!(matches!(canvas.commands()[0], DrawCommand::ClearRect { .. }));
        assert_eq!(canvas.texts(), vec!["0", "20", "40", "60", "80", "100"]);
        let lines = lines(&canvas);
        assert_eq!(lines.len(), 7);
        // translated by the 15px axis padding
        assert_eq!(lines[0], (15.5, 0.5, 15.5, 8.5));
        assert_eq!(lines[5], (215.5, 0.5, 215.5, 8.5));
        assert_eq!(lines[6], (15.5, 0.5, 215.5, 0.5));
        assert_eq!(text_positions(&canvas)[1], (55.0, 11.0));
        assert_eq!(canvas.save_depth(), 0);
        assert!(axis.state().is_clean());
        assert!(!axis.needs_redraw());
    }

    #[test]
    fn clean_axis_is_not_redrawn() {
        let mut axis = axis(Side::Bottom, AxisConfig::fixed(20.0));
        axis.set_layout_size(200.0, 40.0);
        let mut canvas = RecordingCanvas::new(230.0, 40.0);
        axis.draw_axis(&mut canvas).expect("draw");
        let recorded = canvas.commands().len();
        axis.set_layout_size(200.0, 40.0);
        axis.draw_axis(&mut canvas).expect("draw");
        assert_eq!(canvas.commands().len(), recorded);
    }

    #[test]
    fn axis_without_side_draws_nothing() {
        let mut axis = Axis::linear("x");
        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        axis.draw_axis(&mut canvas).expect("draw");
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn left_axis_marks_hang_off_the_right_edge() {
        let config = AxisConfig::fixed(50.0)
            .with_minor_tick_visible(false)
            .with_axis_padding(0.0);
        let mut axis = axis(Side::Left, config);
        axis.set_layout_size(40.0, 100.0);
        let mut canvas = RecordingCanvas::new(40.0, 100.0);
        axis.draw_axis(&mut canvas).expect("draw");
        let lines = lines(&canvas);
        // value 0 sits at the bottom
        assert_eq!(lines[0], (32.5, 100.5, 40.5, 100.5));
        assert_eq!(lines.last().copied(), Some((39.5, 0.5, 39.5, 100.5)));
        assert_eq!(text_positions(&canvas)[0], (29.0, 100.0));
    }

    #[test]
    fn forced_shift_staggers_alternate_labels() {
        let config = AxisConfig::fixed(50.0)
            .with_minor_tick_visible(false)
            .with_axis_padding(0.0)
            .with_overlap_policy(OverlapPolicy::ForcedShiftAlt);
        let mut axis = axis(Side::Bottom, config);
        axis.compute_pref_height(200.0);
        axis.set_layout_size(200.0, 60.0);
        let mut canvas = RecordingCanvas::new(200.0, 60.0);
        axis.draw_axis(&mut canvas).expect("draw");
        let rows: Vec<f64> = text_positions(&canvas).iter().map(|(_, y)| *y).collect();
        assert_eq!(rows, vec![11.0, 24.0, 11.0]);
    }

    #[test]
    fn inverted_bottom_axis_keeps_spaced_labels() {
        for policy in [OverlapPolicy::DoNothing, OverlapPolicy::SkipAlt] {
            let config = AxisConfig::fixed(50.0)
                .with_minor_tick_visible(false)
                .with_axis_padding(0.0)
                .with_invert(true)
                .with_overlap_policy(policy);
            let mut axis = axis(Side::Bottom, config);
            axis.compute_pref_height(1_000.0);
            axis.set_layout_size(1_000.0, 40.0);
            let mut canvas = RecordingCanvas::new(1_000.0, 40.0);
            axis.draw_axis(&mut canvas).expect("draw");
            assert_eq!(canvas.texts(), vec!["0", "50", "100"]);
            let xs: Vec<f64> = text_positions(&canvas).iter().map(|(x, _)| *x).collect();
            assert_eq!(xs, vec![1_000.0, 500.0, 0.0]);
        }
    }

    #[test]
    fn do_nothing_draws_colliding_labels() {
        let config = AxisConfig::fixed(5.0)
            .with_minor_tick_visible(false)
            .with_axis_padding(0.0)
            .with_overlap_policy(OverlapPolicy::DoNothing);
        let mut axis = axis(Side::Bottom, config);
        axis.compute_pref_height(100.0);
        axis.set_layout_size(100.0, 40.0);
        let mut canvas = RecordingCanvas::new(100.0, 40.0);
        axis.draw_axis(&mut canvas).expect("draw");
        assert_eq!(canvas.texts().len(), 21);
        assert!(axis.major_ticks().iter().all(|t| t.visible));
    }

    #[test]
    fn title_is_drawn_below_labels() {
        let config = AxisConfig::fixed(50.0)
            .with_minor_tick_visible(false)
            .with_axis_padding(0.0);
        let mut axis = axis(Side::Bottom, config);
        axis.set_name("time");
        axis.compute_pref_height(200.0);
        axis.set_layout_size(200.0, 60.0);
        let mut canvas = RecordingCanvas::new(200.0, 60.0);
        axis.draw_axis(&mut canvas).expect("draw");
        let title = canvas
            .commands()
            .iter()
            .find_map(|command| match command {
                DrawCommand::FillText { text, x, y, style } if text == "time" => {
                    Some((*x, *y, style.h_align))
                }
                _ => None,
            })
            .expect("title drawn");
        assert_eq!(title.0, 100.0);
        assert!((title.1 - (8.0 + 3.0 + 12.0 + 3.0)).abs() < 1e-9);
        assert_eq!(title.2, TextHAlign::Center);
    }

    #[test]
    fn alignment_follows_side_and_rotation() {
        assert_eq!(
            tick_label_alignment(Side::Bottom, 0.0),
            (TextHAlign::Center, TextVAlign::Top)
        );
        assert_eq!(
            tick_label_alignment(Side::Bottom, 90.0),
            (TextHAlign::Left, TextVAlign::Center)
        );
        assert_eq!(
            tick_label_alignment(Side::Top, 45.0),
            (TextHAlign::Left, TextVAlign::Bottom)
        );
        assert_eq!(
            tick_label_alignment(Side::Left, 0.0),
            (TextHAlign::Right, TextVAlign::Center)
        );
        assert_eq!(
            tick_label_alignment(Side::CenterVer, -90.0),
            (TextHAlign::Center, TextVAlign::Top)
        );
    }
}
