//! Cairo-based rendering of portrayal frames.

use super::color::Color;
use super::error::RenderError;
use super::font::FontDescriptor;
use super::frame::Frame;
use super::image::{ImageCompletion, ImageLoader, decode_png};
use super::mapper::CoordinateMapper;
use super::portrayal::{ArrowSpec, Label, PortrayalRecord, ShapeKind, Style};
use super::surface::Surface;
use crate::util::{self, DeviceRect};
use log::{debug, warn};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

/// Default directory custom shape keys are resolved against.
pub const DEFAULT_IMAGE_DIR: &str = "local/custom";

/// Appearance settings that are not part of the portrayal data.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Font for centered labels
    pub font: FontDescriptor,
    /// Stroke width in device pixels
    pub line_width: f64,
    /// Painted after every clear; `None` keeps the surface transparent
    pub background: Option<Color>,
    /// Directory holding custom shape images
    pub image_dir: PathBuf,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font: FontDescriptor::default(),
            line_width: 1.0,
            background: None,
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
        }
    }
}

/// Placement captured when an image record was rendered.
#[derive(Debug, Clone)]
struct PendingImage {
    key: String,
    placement: DeviceRect,
    label: Option<Label>,
}

/// Paints frames of layered portrayals onto an owned [`Surface`].
///
/// Every [`render`](Self::render) is a self-contained clear-then-paint pass.
/// Custom images are the exception: their files load in the background and
/// are painted by [`pump_images`](Self::pump_images) or
/// [`finish_images`](Self::finish_images). Loads belonging to a pass that has
/// since been superseded by another `render` or `reset` are dropped instead of
/// painting over the newer frame.
pub struct LayerRenderer {
    mapper: CoordinateMapper,
    surface: Surface,
    options: RenderOptions,
    images: ImageLoader,
    pending: HashMap<u64, PendingImage>,
}

impl LayerRenderer {
    /// Creates a renderer with a transparent surface sized from `mapper`.
    ///
    /// # Arguments
    /// * `mapper` - Logical bounds and surface size
    /// * `options` - Label font, stroke width, background and image directory
    /// * `runtime` - Tokio runtime handle used for image reads
    pub fn new(
        mapper: CoordinateMapper,
        options: RenderOptions,
        runtime: &tokio::runtime::Handle,
    ) -> Result<Self, RenderError> {
        let surface = Surface::new(mapper.width(), mapper.height())?;
        let images = ImageLoader::new(runtime, options.image_dir.clone());
        Ok(Self {
            mapper,
            surface,
            options,
            images,
            pending: HashMap::new(),
        })
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Writes the surface as it stands to `path` as PNG.
    ///
    /// Images still loading are not waited for; call
    /// [`finish_images`](Self::finish_images) first to include them.
    pub fn write_png(&self, path: &Path) -> Result<(), RenderError> {
        self.surface.write_png(path)
    }

    /// Identifier of the current pass; bumped by every `render` and `reset`.
    pub fn generation(&self) -> u64 {
        self.images.generation()
    }

    /// Number of images of the current pass still loading.
    pub fn pending_images(&self) -> usize {
        self.pending.len()
    }

    /// Clears the surface and paints every layer of `frame` back to front.
    ///
    /// Layers are painted in frame order and records in array order, so later
    /// entries cover earlier ones. A record that fails to draw is logged and
    /// skipped; it never stops the rest of the pass.
    pub fn render(&mut self, frame: &Frame) {
        self.begin_pass();

        for layer in frame.layers() {
            for record in &layer.portrayals {
                self.render_record(record);
            }
        }

        debug!(
            "Rendered {} portrayals in {} layers (generation {}, {} images pending)",
            frame.portrayal_count(),
            frame.layers().len(),
            self.generation(),
            self.pending.len()
        );
    }

    /// Clears the surface without painting anything.
    pub fn reset(&mut self) {
        self.begin_pass();
    }

    /// Paints every image of the current pass whose load has completed.
    ///
    /// Returns the number of images painted. Never blocks.
    pub fn pump_images(&mut self) -> usize {
        let mut painted = 0;
        while let Some(done) = self.images.try_next() {
            if self.complete_image(done) {
                painted += 1;
            }
        }
        painted
    }

    /// Blocks until every image of the current pass has loaded, painting each.
    ///
    /// Returns the number of images painted. Must not be called from within the
    /// Tokio runtime passed to [`new`](Self::new).
    pub fn finish_images(&mut self) -> usize {
        let mut painted = 0;
        while !self.pending.is_empty() {
            let Some(done) = self.images.wait_next() else {
                break;
            };
            if self.complete_image(done) {
                painted += 1;
            }
        }
        painted
    }

    fn begin_pass(&mut self) {
        self.images.advance_generation();
        if !self.pending.is_empty() {
            debug!("Cancelling {} pending images", self.pending.len());
            self.pending.clear();
        }

        if let Err(err) = self.surface.clear() {
            warn!("Failed to clear surface: {}", err);
        }
        if let Some(background) = self.options.background {
            let ctx = self.surface.context();
            background.apply(ctx);
            if let Err(err) = ctx.paint() {
                warn!("Failed to paint background: {}", err);
            }
        }
        if let Err(err) = self.surface.recover() {
            warn!("Could not recover drawing context: {}", err);
        }
    }

    fn render_record(&mut self, record: &PortrayalRecord) {
        let Some(portrayal) = record.normalize(self.mapper.bounds()) else {
            return;
        };
        let (x, y, style) = (portrayal.x, portrayal.y, &portrayal.style);

        let result = match &portrayal.kind {
            ShapeKind::Rect { w, h } => draw_rectangle(
                self.surface.context(),
                &self.mapper,
                x,
                y,
                *w,
                *h,
                style,
                &self.options,
            ),
            ShapeKind::Circle { r } => draw_circle(
                self.surface.context(),
                &self.mapper,
                x,
                y,
                *r,
                style,
                &self.options,
            ),
            ShapeKind::Arrow(spec) => draw_arrow(
                self.surface.context(),
                &self.mapper,
                x,
                y,
                spec,
                style,
                &self.options,
            ),
            ShapeKind::Image { key, size } => {
                self.draw_custom_image(key, x, y, *size, style.label.clone());
                Ok(())
            }
        };

        if let Err(err) = result {
            warn!(
                "Failed to draw portrayal at ({}, {}): {}",
                record.x, record.y, err
            );
        }
        if let Err(err) = self.surface.recover() {
            warn!("Could not recover drawing context: {}", err);
        }
    }

    /// Requests the image for `key`; it is painted once its load completes.
    ///
    /// The footprint is fixed now, from the record's own coordinates.
    /// Alignment offsets do not apply to images.
    fn draw_custom_image(&mut self, key: &str, x: f64, y: f64, size: f64, label: Option<Label>) {
        let placement = util::image_geometry(&self.mapper, x, y, size);
        let ticket = self.images.request(key);
        self.pending.insert(
            ticket.id,
            PendingImage {
                key: ticket.key,
                placement,
                label,
            },
        );
    }

    fn complete_image(&mut self, done: ImageCompletion) -> bool {
        let Some(pending) = self.pending.remove(&done.ticket.id) else {
            debug!("Ignoring completion for unknown image '{}'", done.ticket.key);
            return false;
        };

        let result = done
            .result
            .and_then(|bytes| decode_png(&bytes))
            .map_err(|source| RenderError::Image {
                key: pending.key.clone(),
                source,
            })
            .and_then(|image| {
                paint_image(
                    self.surface.context(),
                    &image,
                    &pending.placement,
                    pending.label.as_ref(),
                    &self.options.font,
                )
            });

        let painted = match result {
            Ok(()) => true,
            Err(err) => {
                warn!("Skipping custom shape: {}", err);
                false
            }
        };
        if let Err(err) = self.surface.recover() {
            warn!("Could not recover drawing context: {}", err);
        }
        painted
    }
}

/// Adds one evenly spaced stop per color.
fn add_stops(gradient: &cairo::Gradient, colors: &[Color]) {
    for (offset, color) in util::gradient_offsets(colors.len()).zip(colors) {
        gradient.add_color_stop_rgba(offset, color.r, color.g, color.b, color.a);
    }
}

/// Strokes the current path, then fills it with `fill` if given.
fn stroke_and_fill(
    ctx: &cairo::Context,
    stroke: Color,
    fill: Option<&cairo::Gradient>,
) -> Result<(), RenderError> {
    stroke.apply(ctx);
    ctx.stroke_preserve()?;
    if let Some(gradient) = fill {
        let pattern: &cairo::Pattern = gradient;
        ctx.set_source(pattern)?;
        ctx.fill_preserve()?;
    }
    ctx.new_path();
    Ok(())
}

/// Draws a rectangle centered on its aligned point.
///
/// The outline is always stroked. Filled rectangles get a linear gradient
/// running from the top-left to the bottom-right corner.
#[allow(clippy::too_many_arguments)]
pub fn draw_rectangle(
    ctx: &cairo::Context,
    mapper: &CoordinateMapper,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    style: &Style,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let rect = util::rect_geometry(mapper, x + style.x_align, y + style.y_align, w, h);
    if !rect.is_finite() {
        debug!("Skipping rectangle with non-finite geometry {:?}", rect);
        return Ok(());
    }

    ctx.save()?;
    ctx.new_path();
    ctx.set_line_width(options.line_width);
    ctx.set_line_join(cairo::LineJoin::Miter);
    ctx.rectangle(rect.x, rect.y, rect.width, rect.height);

    let fill = style.filled.then(|| {
        let (x1, y1) = rect.max();
        let gradient = cairo::LinearGradient::new(rect.x, rect.y, x1, y1);
        add_stops(&gradient, &style.colors);
        gradient
    });
    stroke_and_fill(ctx, style.stroke, fill.as_deref())?;
    ctx.restore()?;

    if let Some(label) = &style.label {
        let (cx, cy) = rect.center();
        draw_label(ctx, cx, cy, label, &options.font)?;
    }
    Ok(())
}

/// Draws a circle of logical radius `r` as a device ellipse.
///
/// Filled circles use a radial gradient from the rim (first color) inward to
/// a zero-radius circle at the center (last color).
pub fn draw_circle(
    ctx: &cairo::Context,
    mapper: &CoordinateMapper,
    x: f64,
    y: f64,
    r: f64,
    style: &Style,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let ellipse = util::ellipse_geometry(mapper, x + style.x_align, y + style.y_align, r);

    if ellipse.is_drawable() {
        ctx.save()?;
        ctx.new_path();
        ctx.set_line_width(options.line_width);

        ctx.save()?;
        ctx.translate(ellipse.cx, ellipse.cy);
        ctx.scale(ellipse.rx, ellipse.ry);
        ctx.arc(0.0, 0.0, 1.0, 0.0, 2.0 * PI);
        ctx.restore()?;
        ctx.close_path();

        let fill = style.filled.then(|| {
            let gradient = cairo::RadialGradient::new(
                ellipse.cx,
                ellipse.cy,
                ellipse.rx,
                ellipse.cx,
                ellipse.cy,
                0.0,
            );
            add_stops(&gradient, &style.colors);
            gradient
        });
        stroke_and_fill(ctx, style.stroke, fill.as_deref())?;
        ctx.restore()?;
    } else {
        debug!("Skipping circle outline for {:?}", ellipse);
    }

    if let Some(label) = &style.label {
        draw_label(ctx, ellipse.cx, ellipse.cy, label, &options.font)?;
    }
    Ok(())
}

/// Draws the 7-vertex arrow glyph anchored at (`x`, `y`).
///
/// Filled arrows get a linear gradient across the polygon's device bounding
/// box. The label sits on the anchor point, not on the polygon's centroid.
pub fn draw_arrow(
    ctx: &cairo::Context,
    mapper: &CoordinateMapper,
    x: f64,
    y: f64,
    spec: &ArrowSpec,
    style: &Style,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let arrow = util::arrow_geometry(
        mapper,
        x,
        y,
        spec.angle,
        spec.length,
        spec.width,
        spec.origin_offset,
    );

    if arrow.is_finite() {
        ctx.save()?;
        ctx.new_path();
        ctx.set_line_width(options.line_width);
        ctx.set_line_join(cairo::LineJoin::Miter);

        let (x0, y0) = arrow.vertices[0];
        ctx.move_to(x0, y0);
        for &(vx, vy) in &arrow.vertices[1..] {
            ctx.line_to(vx, vy);
        }
        ctx.close_path();

        let fill = style.filled.then(|| {
            let (x1, y1) = arrow.bounds.max();
            let gradient = cairo::LinearGradient::new(arrow.bounds.x, arrow.bounds.y, x1, y1);
            add_stops(&gradient, &style.colors);
            gradient
        });
        stroke_and_fill(ctx, style.stroke, fill.as_deref())?;
        ctx.restore()?;
    } else {
        debug!("Skipping arrow with non-finite geometry at ({}, {})", x, y);
    }

    if let Some(label) = &style.label {
        draw_label(ctx, arrow.anchor.0, arrow.anchor.1, label, &options.font)?;
    }
    Ok(())
}

/// Paints a decoded image scaled into `placement`, then its label.
pub fn paint_image(
    ctx: &cairo::Context,
    image: &cairo::ImageSurface,
    placement: &DeviceRect,
    label: Option<&Label>,
    font: &FontDescriptor,
) -> Result<(), RenderError> {
    if placement.is_finite() && placement.width > 0.0 && placement.height > 0.0 {
        ctx.save()?;
        ctx.translate(placement.x, placement.y);
        ctx.scale(
            placement.width / image.width() as f64,
            placement.height / image.height() as f64,
        );
        let source: &cairo::Surface = image;
        ctx.set_source_surface(source, 0.0, 0.0)?;
        ctx.paint()?;
        ctx.restore()?;
    }

    if let Some(label) = label {
        let (cx, cy) = placement.center();
        draw_label(ctx, cx, cy, label, font)?;
    }
    Ok(())
}

/// Draws `label` centered both horizontally and vertically on (`x`, `y`).
pub fn draw_label(
    ctx: &cairo::Context,
    x: f64,
    y: f64,
    label: &Label,
    font: &FontDescriptor,
) -> Result<(), RenderError> {
    if label.text.is_empty() || !x.is_finite() || !y.is_finite() {
        return Ok(());
    }

    ctx.save()?;
    let layout = pangocairo::functions::create_layout(ctx);
    layout.set_font_description(Some(&font.to_pango()));
    layout.set_text(&label.text);

    let (width, height) = layout.pixel_size();
    ctx.move_to(x - width as f64 / 2.0, y - height as f64 / 2.0);
    label.color.apply(ctx);
    pangocairo::functions::show_layout(ctx, &layout);
    ctx.restore()?;
    Ok(())
}
