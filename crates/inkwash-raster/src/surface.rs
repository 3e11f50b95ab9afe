//! tiny-skia backed paint surface.
//!
//! [`SkiaSurface`] owns a premultiplied RGBA pixmap and implements the
//! engine's paint traits on top of it. Kurbo paths are rebuilt as tiny-skia
//! paths on every call; style state (colors, stroke shape, global alpha,
//! glow, compositing) lives on the surface the way a retained canvas
//! context keeps it.

use inkwash_engine::color::Rgba;
use inkwash_engine::paint::{
    CompositeMode, Glow, LineCap, LineJoin, PaintContext, PaintSurface, RasterImage,
};
use kurbo::{Affine, BezPath, PathEl};
use thiserror::Error;
use tiny_skia::{
    BlendMode, Color, ColorU8, FillRule, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Number of widened stroke passes that stand in for a gaussian glow.
const GLOW_PASSES: usize = 3;

pub struct SkiaSurface {
    pixmap: Pixmap,
    stroke_color: Rgba,
    fill_color: Rgba,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    alpha: f64,
    glow: Option<Glow>,
    composite: CompositeMode,
    transform: Affine,
}

impl SkiaSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let Some(pixmap) = Pixmap::new(width, height) else {
            return Err(SurfaceError::InvalidSize { width, height });
        };
        Ok(Self {
            pixmap,
            stroke_color: Rgba::black(),
            fill_color: Rgba::black(),
            line_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            alpha: 1.0,
            glow: None,
            composite: CompositeMode::default(),
            transform: Affine::IDENTITY,
        })
    }

    /// Direct access to the backing pixmap, for display glue.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn skia_color(&self, color: Rgba) -> Color {
        let alpha = (f64::from(color.a) * self.alpha.clamp(0.0, 1.0)).round() as u8;
        Color::from_rgba8(color.r, color.g, color.b, alpha)
    }

    fn skia_paint(&self, color: Rgba) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(self.skia_color(color));
        paint.anti_alias = true;
        paint.blend_mode = match self.composite {
            CompositeMode::SourceOver => BlendMode::SourceOver,
            CompositeMode::DestinationOut => BlendMode::DestinationOut,
        };
        paint
    }

    fn skia_stroke(&self, width: f64) -> Stroke {
        let mut stroke = Stroke::default();
        stroke.width = width.max(0.05) as f32;
        stroke.line_cap = match self.line_cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        };
        stroke.line_join = match self.line_join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        };
        stroke
    }

    fn skia_transform(&self) -> Transform {
        let [a, b, c, d, e, f] = self.transform.as_coeffs();
        Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
    }

    fn skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
        let mut builder = PathBuilder::new();
        for el in path.elements() {
            match el {
                PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
                PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
                PathEl::QuadTo(c, p) => {
                    builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32);
                }
                PathEl::CurveTo(c1, c2, p) => {
                    builder.cubic_to(
                        c1.x as f32,
                        c1.y as f32,
                        c2.x as f32,
                        c2.y as f32,
                        p.x as f32,
                        p.y as f32,
                    );
                }
                PathEl::ClosePath => builder.close(),
            }
        }
        builder.finish()
    }

    /// Widened low-alpha stroke passes under the real geometry. Cheap
    /// stand-in for a shadow blur.
    fn paint_halo(&mut self, path: &tiny_skia::Path, base_width: f64) {
        let Some(glow) = self.glow else {
            return;
        };
        if glow.radius <= 0.0 {
            return;
        }
        let transform = self.skia_transform();
        for pass in 0..GLOW_PASSES {
            let spread = glow.radius * (0.45 + 0.35 * pass as f64);
            let fade = 0.16 / (pass as f64 + 1.0);
            let paint = self.skia_paint(glow.color.scale_alpha(fade));
            let stroke = self.skia_stroke(base_width + spread);
            self.pixmap
                .stroke_path(path, &paint, &stroke, transform, None);
        }
    }
}

impl PaintContext for SkiaSurface {
    fn set_stroke_color(&mut self, color: Rgba) {
        self.stroke_color = color;
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.fill_color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.line_join = join;
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        self.glow = glow;
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.composite = mode;
    }

    fn composite(&self) -> CompositeMode {
        self.composite
    }

    fn stroke_path(&mut self, path: &BezPath) {
        let Some(path) = Self::skia_path(path) else {
            return;
        };
        self.paint_halo(&path, self.line_width);
        let paint = self.skia_paint(self.stroke_color);
        let stroke = self.skia_stroke(self.line_width);
        let transform = self.skia_transform();
        self.pixmap
            .stroke_path(&path, &paint, &stroke, transform, None);
    }

    fn fill_path(&mut self, path: &BezPath) {
        let Some(path) = Self::skia_path(path) else {
            return;
        };
        self.paint_halo(&path, 0.0);
        let paint = self.skia_paint(self.fill_color);
        let transform = self.skia_transform();
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, transform, None);
    }
}

impl PaintSurface for SkiaSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn clear(&mut self, color: Rgba) {
        self.pixmap
            .fill(Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn snapshot(&self) -> RasterImage {
        let mut pixels = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RasterImage::from_pixels(self.pixmap.width(), self.pixmap.height(), pixels)
            .unwrap_or_else(|| RasterImage::blank(self.pixmap.width(), self.pixmap.height()))
    }

    fn restore(&mut self, image: &RasterImage) {
        if image.width() != self.pixmap.width() || image.height() != self.pixmap.height() {
            log::warn!(
                "Snapshot size {}x{} does not match surface {}x{}, ignoring restore",
                image.width(),
                image.height(),
                self.pixmap.width(),
                self.pixmap.height()
            );
            return;
        }
        let pixels = self.pixmap.pixels_mut();
        for (px, chunk) in pixels.iter_mut().zip(image.pixels().chunks_exact(4)) {
            *px = ColorU8::from_rgba(chunk[0], chunk[1], chunk[2], chunk[3]).premultiply();
        }
    }

    fn draw_image(&mut self, image: &RasterImage) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let mut data = Vec::with_capacity(image.pixels().len());
        for chunk in image.pixels().chunks_exact(4) {
            let px = ColorU8::from_rgba(chunk[0], chunk[1], chunk[2], chunk[3]).premultiply();
            data.extend_from_slice(&[px.red(), px.green(), px.blue(), px.alpha()]);
        }
        let Some(size) = IntSize::from_wh(image.width(), image.height()) else {
            return;
        };
        let Some(source) = Pixmap::from_vec(data, size) else {
            return;
        };
        let sx = f64::from(self.pixmap.width()) / f64::from(image.width());
        let sy = f64::from(self.pixmap.height()) / f64::from(image.height());
        let transform = self.skia_transform().pre_scale(sx as f32, sy as f32);
        let mut paint = PixmapPaint::default();
        paint.quality = tiny_skia::FilterQuality::Bilinear;
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }
}
