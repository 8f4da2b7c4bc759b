use cairo::{Context, Format, ImageSurface, Operator};
use pango::FontDescription;
use tracing::warn;

use crate::error::{ChartError, ChartResult};
use crate::render::{Canvas, Color, PathStyle, TextHAlign, TextStyle, TextVAlign};

/// Cairo + Pango + PangoCairo canvas drawing into an offscreen image surface.
#[derive(Debug)]
pub struct CairoCanvas {
    surface: ImageSurface,
    context: Context,
    text_style: TextStyle,
    text_stack: Vec<TextStyle>,
}

impl CairoCanvas {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }
        let (surface, context) = create_surface(width, height)?;
        Ok(Self {
            surface,
            context,
            text_style: TextStyle::default(),
            text_stack: Vec::new(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    /// Copies this canvas onto `target` at `(x, y)`, used to composite axis
    /// canvases over the main one.
    pub fn paint_onto(&self, target: &Context, x: f64, y: f64) -> ChartResult<()> {
        target
            .set_source_surface(&self.surface, x, y)
            .map_err(|err| map_backend_error("failed to set source surface", err))?;
        target
            .paint()
            .map_err(|err| map_backend_error("failed to paint surface", err))
    }
}

impl Canvas for CairoCanvas {
    fn save(&mut self) {
        if let Err(err) = self.context.save() {
            warn!(error = %err, "cairo save failed");
        }
        self.text_stack.push(self.text_style);
    }

    fn restore(&mut self) {
        if let Err(err) = self.context.restore() {
            warn!(error = %err, "cairo restore failed");
        }
        if let Some(previous) = self.text_stack.pop() {
            self.text_style = previous;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.context.translate(dx, dy);
    }

    fn set_stroke_style(&mut self, style: &PathStyle) {
        apply_color(&self.context, style.color);
        self.context.set_line_width(style.stroke_width);
    }

    fn set_text_style(&mut self, style: &TextStyle) {
        self.text_style = *style;
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> ChartResult<()> {
        self.context.move_to(x1, y1);
        self.context.line_to(x2, y2);
        self.context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke line", err))
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> ChartResult<()> {
        let style = self.text_style;
        style.validate()?;

        let layout = pangocairo::functions::create_layout(&self.context);
        let font_description = FontDescription::from_string(&format!("Sans {}", style.font_size_px));
        layout.set_font_description(Some(&font_description));
        layout.set_text(text);

        let (text_width, text_height) = layout.pixel_size();
        let (text_width, text_height) = (f64::from(text_width), f64::from(text_height));
        let baseline = f64::from(layout.baseline()) / f64::from(pango::SCALE);
        let offset_x = match style.h_align {
            TextHAlign::Left => 0.0,
            TextHAlign::Center => -text_width / 2.0,
            TextHAlign::Right => -text_width,
        };
        let offset_y = match style.v_align {
            TextVAlign::Top => 0.0,
            TextVAlign::Center => -text_height / 2.0,
            TextVAlign::Baseline => -baseline,
            TextVAlign::Bottom => -text_height,
        };

        self.context
            .save()
            .map_err(|err| map_backend_error("failed to save context", err))?;
        apply_color(&self.context, style.color);
        self.context.translate(x, y);
        self.context.rotate(style.rotation_deg.to_radians());
        self.context.move_to(offset_x, offset_y);
        pangocairo::functions::show_layout(&self.context, &layout);
        self.context
            .restore()
            .map_err(|err| map_backend_error("failed to restore context", err))
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> ChartResult<()> {
        self.context
            .save()
            .map_err(|err| map_backend_error("failed to save context", err))?;
        self.context.set_operator(Operator::Clear);
        self.context.rectangle(x, y, width, height);
        self.context
            .fill()
            .map_err(|err| map_backend_error("failed to clear rectangle", err))?;
        self.context
            .restore()
            .map_err(|err| map_backend_error("failed to restore context", err))
    }

    fn resize(&mut self, width: f64, height: f64) -> ChartResult<()> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(ChartError::InvalidViewport { width, height });
        }
        let width = (width.ceil() as i32).max(1);
        let height = (height.ceil() as i32).max(1);
        if width == self.surface.width() && height == self.surface.height() {
            return Ok(());
        }
        let (surface, context) = create_surface(width, height)?;
        self.surface = surface;
        self.context = context;
        self.text_stack.clear();
        Ok(())
    }

    fn size(&self) -> (f64, f64) {
        (
            f64::from(self.surface.width()),
            f64::from(self.surface.height()),
        )
    }
}

fn create_surface(width: i32, height: i32) -> ChartResult<(ImageSurface, Context)> {
    let surface = ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
    let context = Context::new(&surface)
        .map_err(|err| map_backend_error("failed to create cairo context", err))?;
    Ok((surface, context))
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::Backend(format!("{prefix}: {err}"))
}
