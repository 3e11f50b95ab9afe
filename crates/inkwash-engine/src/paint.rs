//! Paint-context abstraction.
//!
//! The brush pipeline builds geometry with kurbo and executes it through
//! [`PaintContext`]; whole-surface concerns (clearing, the view transform,
//! raster snapshots) live on [`PaintSurface`]. Backends implement both:
//! the CPU rasterizer in `inkwash-raster`, and [`crate::trace::TraceContext`]
//! for headless capture.

use crate::color::Rgba;
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape};

/// Line end cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

/// Line join between path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

/// Compositing switch: normal painting versus subtractive erasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Paint over existing pixels.
    #[default]
    SourceOver,
    /// Remove existing pixels where the new geometry lands (eraser).
    DestinationOut,
}

/// Shadow-blur style halo painted beneath subsequent geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    /// Blur radius in surface pixels.
    pub radius: f64,
    pub color: Rgba,
}

impl Glow {
    pub fn new(radius: f64, color: Rgba) -> Self {
        Self { radius, color }
    }
}

/// Retained-style 2D paint target.
///
/// Style setters persist until changed; `stroke_path`/`fill_path` execute a
/// finished kurbo path under the current style. The provided shape helpers
/// exist so capture backends can record them as structured ops.
pub trait PaintContext {
    fn set_stroke_color(&mut self, color: Rgba);
    fn set_fill_color(&mut self, color: Rgba);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);
    /// Global alpha in [0, 1], multiplied into every color's alpha.
    fn set_alpha(&mut self, alpha: f64);
    fn set_glow(&mut self, glow: Option<Glow>);
    fn set_composite(&mut self, mode: CompositeMode);
    fn composite(&self) -> CompositeMode;

    fn stroke_path(&mut self, path: &BezPath);
    fn fill_path(&mut self, path: &BezPath);

    fn stroke_line(&mut self, from: Point, to: Point) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);
        self.stroke_path(&path);
    }

    fn fill_circle(&mut self, center: Point, radius: f64) {
        if radius <= 0.0 {
            return;
        }
        self.fill_path(&Circle::new(center, radius).to_path(0.1));
    }

    fn stroke_circle(&mut self, center: Point, radius: f64) {
        if radius <= 0.0 {
            return;
        }
        self.stroke_path(&Circle::new(center, radius).to_path(0.1));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.fill_path(&rect.to_path(0.1));
    }
}

/// A paint context bound to a raster surface.
pub trait PaintSurface: PaintContext {
    /// Backing raster width in pixels.
    fn width(&self) -> u32;
    /// Backing raster height in pixels.
    fn height(&self) -> u32;

    /// Fill the whole surface with `color`, ignoring transform and style.
    fn clear(&mut self, color: Rgba);

    /// Set the transform applied to subsequent paint calls.
    fn set_transform(&mut self, transform: Affine);
    fn transform(&self) -> Affine;

    /// Copy the surface out as an opaque raster snapshot.
    fn snapshot(&self) -> RasterImage;

    /// Replace the surface contents with a previously taken snapshot.
    /// Ignores the current transform.
    fn restore(&mut self, image: &RasterImage);

    /// Draw a raster back onto the surface, scaled to cover it, under the
    /// current transform.
    fn draw_image(&mut self, image: &RasterImage);
}

/// Opaque bitmap snapshot: straight (non-premultiplied) RGBA8 rows.
///
/// These are the values stored in the bitmap history and handed to hosts
/// for share/export glue; the engine never inspects the pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Fully transparent image.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Wrap raw straight RGBA8 bytes. None when the buffer length does not
    /// match `width * height * 4`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
