//! Recording paint backend.
//!
//! [`TraceContext`] implements the paint traits by logging every call as a
//! [`PaintOp`] instead of touching pixels. Tests assert on the recorded
//! structure (particle counts, style state, compositing) and headless hosts
//! can use it to inspect what a brush would have drawn.

use crate::color::Rgba;
use crate::paint::{CompositeMode, Glow, LineCap, LineJoin, PaintContext, PaintSurface, RasterImage};
use kurbo::{Affine, BezPath, Point, Rect};

/// One recorded paint call. Path ops keep only their element count; the
/// shape helpers are recorded in full so geometry stays assertable.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    StrokeColor(Rgba),
    FillColor(Rgba),
    LineWidth(f64),
    LineCap(LineCap),
    LineJoin(LineJoin),
    Alpha(f64),
    Glow(Option<Glow>),
    Composite(CompositeMode),
    StrokePath { elements: usize },
    FillPath { elements: usize },
    StrokeLine { from: Point, to: Point },
    FillCircle { center: Point, radius: f64 },
    StrokeCircle { center: Point, radius: f64 },
    FillRect(Rect),
    Clear(Rgba),
    Transform(Affine),
    Restore,
    DrawImage,
}

#[derive(Debug)]
pub struct TraceContext {
    width: u32,
    height: u32,
    ops: Vec<PaintOp>,
    composite: CompositeMode,
    transform: Affine,
}

impl TraceContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            composite: CompositeMode::SourceOver,
            transform: Affine::IDENTITY,
        }
    }

    pub fn ops(&self) -> &[PaintOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<PaintOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn count(&self, matches: impl Fn(&PaintOp) -> bool) -> usize {
        self.ops.iter().filter(|op| matches(op)).count()
    }

    /// Recorded ops that put paint down (paths, lines, circles, rects).
    pub fn drawn(&self) -> usize {
        self.count(|op| {
            matches!(
                op,
                PaintOp::StrokePath { .. }
                    | PaintOp::FillPath { .. }
                    | PaintOp::StrokeLine { .. }
                    | PaintOp::FillCircle { .. }
                    | PaintOp::StrokeCircle { .. }
                    | PaintOp::FillRect(_)
            )
        })
    }
}

impl PaintContext for TraceContext {
    fn set_stroke_color(&mut self, color: Rgba) {
        self.ops.push(PaintOp::StrokeColor(color));
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.ops.push(PaintOp::FillColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(PaintOp::LineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.ops.push(PaintOp::LineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.ops.push(PaintOp::LineJoin(join));
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.ops.push(PaintOp::Alpha(alpha));
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        self.ops.push(PaintOp::Glow(glow));
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.composite = mode;
        self.ops.push(PaintOp::Composite(mode));
    }

    fn composite(&self) -> CompositeMode {
        self.composite
    }

    fn stroke_path(&mut self, path: &BezPath) {
        self.ops.push(PaintOp::StrokePath {
            elements: path.elements().len(),
        });
    }

    fn fill_path(&mut self, path: &BezPath) {
        self.ops.push(PaintOp::FillPath {
            elements: path.elements().len(),
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point) {
        self.ops.push(PaintOp::StrokeLine { from, to });
    }

    fn fill_circle(&mut self, center: Point, radius: f64) {
        if radius <= 0.0 {
            return;
        }
        self.ops.push(PaintOp::FillCircle { center, radius });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64) {
        if radius <= 0.0 {
            return;
        }
        self.ops.push(PaintOp::StrokeCircle { center, radius });
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ops.push(PaintOp::FillRect(rect));
    }
}

impl PaintSurface for TraceContext {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        self.ops.push(PaintOp::Clear(color));
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.ops.push(PaintOp::Transform(transform));
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn snapshot(&self) -> RasterImage {
        RasterImage::blank(self.width, self.height)
    }

    fn restore(&mut self, _image: &RasterImage) {
        self.ops.push(PaintOp::Restore);
    }

    fn draw_image(&mut self, _image: &RasterImage) {
        self.ops.push(PaintOp::DrawImage);
    }
}
