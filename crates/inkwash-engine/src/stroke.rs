//! Stroke orchestration.
//!
//! [`StrokeSession`] sits between host pointer events and the brush
//! pipeline: it maps screen positions to surface space through the
//! viewport, feeds consecutive point pairs to the painters, and owns the
//! bitmap snapshot history that undo/redo restores from.

use crate::brush::{paint_segment, resolve_style, BrushKind, StrokeSegment};
use crate::color::Rgba;
use crate::history::History;
use crate::paint::{CompositeMode, LineCap, LineJoin, PaintSurface, RasterImage};
use crate::rng::StrokeRng;
use crate::settings::BrushSettings;
use crate::viewport::ViewportController;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// The active drawing tool. The eraser is not a brush: it flips the
/// surface into subtractive compositing for the stroke's duration instead
/// of going through the painter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionTool {
    Brush(BrushKind),
    Eraser,
}

impl Default for SessionTool {
    fn default() -> Self {
        SessionTool::Brush(BrushKind::Basic)
    }
}

pub struct StrokeSession {
    tool: SessionTool,
    color: Rgba,
    width: f64,
    settings: BrushSettings,
    drawing: bool,
    previous: Option<Point>,
    rng: StrokeRng,
    started: Instant,
    clock_override: Option<f64>,
    history: History<Arc<RasterImage>>,
}

impl StrokeSession {
    /// Session for a surface of the given size, with the bitmap history
    /// seeded on a blank snapshot.
    pub fn new(surface_width: u32, surface_height: u32) -> Self {
        Self::build(surface_width, surface_height, None)
    }

    /// Same, but capping how many snapshots the history retains.
    pub fn with_history_limit(surface_width: u32, surface_height: u32, limit: usize) -> Self {
        Self::build(surface_width, surface_height, Some(limit))
    }

    fn build(width: u32, height: u32, limit: Option<usize>) -> Self {
        let blank = Arc::new(RasterImage::blank(width, height));
        let history = match limit {
            Some(limit) => History::with_limit(blank, limit),
            None => History::new(blank),
        };
        Self {
            tool: SessionTool::default(),
            color: Rgba::black(),
            width: 4.0,
            settings: BrushSettings::default(),
            drawing: false,
            previous: None,
            rng: StrokeRng::new(0x9e3779b9),
            started: Instant::now(),
            clock_override: None,
            history,
        }
    }

    pub fn tool(&self) -> SessionTool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: SessionTool) {
        self.tool = tool;
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width.max(0.1);
    }

    pub fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: BrushSettings) {
        self.settings = settings;
    }

    /// Shallow-merge overrides into the active settings document.
    pub fn merge_settings(&mut self, overrides: &BrushSettings) {
        self.settings = self.settings.merged(overrides);
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Reset the randomness source, for reproducible replays.
    pub fn reseed(&mut self, seed: u32) {
        self.rng = StrokeRng::new(seed);
    }

    /// Pin the brush clock instead of reading elapsed wall time.
    pub fn override_clock_ms(&mut self, clock_ms: f64) {
        self.clock_override = Some(clock_ms);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The snapshot the history currently points at.
    pub fn current_snapshot(&self) -> Arc<RasterImage> {
        Arc::clone(self.history.current())
    }

    /// Open a stroke at the pointer position. Painting starts with the
    /// first move; a down with no move leaves the surface untouched.
    pub fn pointer_down(
        &mut self,
        surface: &mut dyn PaintSurface,
        viewport: &ViewportController,
        screen: Point,
    ) {
        let point = viewport.surface_point(screen);
        self.drawing = true;
        self.previous = Some(point);
        match self.tool {
            SessionTool::Eraser => surface.set_composite(CompositeMode::DestinationOut),
            SessionTool::Brush(_) => surface.set_composite(CompositeMode::SourceOver),
        }
    }

    /// Paint the segment from the previous point to the current pointer
    /// position. Ignored while no stroke is open.
    pub fn pointer_move(
        &mut self,
        surface: &mut dyn PaintSurface,
        viewport: &ViewportController,
        screen: Point,
    ) {
        if !self.drawing {
            return;
        }
        let current = viewport.surface_point(screen);
        let previous = self.previous.unwrap_or(current);
        match self.tool {
            SessionTool::Eraser => {
                surface.set_stroke_color(self.color);
                surface.set_line_width(self.width);
                surface.set_line_cap(LineCap::Round);
                surface.set_line_join(LineJoin::Round);
                surface.set_alpha(1.0);
                surface.set_glow(None);
                surface.stroke_line(previous, current);
            }
            SessionTool::Brush(kind) => {
                let style = resolve_style(kind, &self.settings, self.color, self.width);
                style.apply(surface);
                let segment = StrokeSegment {
                    from: previous,
                    to: current,
                    brush: kind,
                    settings: &self.settings,
                    color: self.color,
                    width: style.width,
                    clock_ms: self.clock_ms(),
                };
                if !paint_segment(surface, &segment, &mut self.rng) {
                    surface.stroke_line(previous, current);
                }
            }
        }
        self.previous = Some(current);
    }

    /// Close the stroke: restore normal compositing, clear stroke state,
    /// and commit a snapshot if a stroke was open.
    pub fn pointer_up(&mut self, surface: &mut dyn PaintSurface) {
        self.finish_stroke(surface);
    }

    pub fn pointer_leave(&mut self, surface: &mut dyn PaintSurface) {
        self.finish_stroke(surface);
    }

    pub fn pointer_cancel(&mut self, surface: &mut dyn PaintSurface) {
        self.finish_stroke(surface);
    }

    /// Wipe the surface to `color` and commit the result.
    pub fn clear(&mut self, surface: &mut dyn PaintSurface, color: Rgba) {
        surface.clear(color);
        self.commit(surface);
    }

    /// Draw a raster over the whole surface and commit the result.
    pub fn load_image(&mut self, surface: &mut dyn PaintSurface, image: &RasterImage) {
        surface.draw_image(image);
        self.commit(surface);
    }

    /// Step back in bitmap history and restore that snapshot to the
    /// surface. Returns false at the oldest entry.
    pub fn undo(&mut self, surface: &mut dyn PaintSurface) -> bool {
        let Some(image) = self.history.undo().cloned() else {
            return false;
        };
        surface.restore(&image);
        true
    }

    pub fn redo(&mut self, surface: &mut dyn PaintSurface) -> bool {
        let Some(image) = self.history.redo().cloned() else {
            return false;
        };
        surface.restore(&image);
        true
    }

    /// Repaint the current snapshot under the viewport's live transform.
    pub fn redraw(&self, surface: &mut dyn PaintSurface, viewport: &ViewportController) {
        let current = self.current_snapshot();
        viewport.render_canvas(surface, move |surface, _| surface.draw_image(&current));
    }

    fn finish_stroke(&mut self, surface: &mut dyn PaintSurface) {
        surface.set_composite(CompositeMode::SourceOver);
        let had_stroke = self.drawing;
        self.drawing = false;
        self.previous = None;
        if had_stroke {
            self.commit(surface);
        }
    }

    fn commit(&mut self, surface: &mut dyn PaintSurface) {
        self.history.push(Arc::new(surface.snapshot()));
        log::debug!("Canvas snapshot committed, history at {}", self.history.len());
    }

    fn clock_ms(&self) -> f64 {
        match self.clock_override {
            Some(clock) => clock,
            None => self.started.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::PaintContext;
    use crate::trace::{PaintOp, TraceContext};
    use crate::viewport::{ViewportConfig, ViewportMetrics};

    fn rig() -> (StrokeSession, TraceContext, ViewportController) {
        let session = StrokeSession::new(64, 64);
        let trace = TraceContext::new(64, 64);
        let mut viewport = ViewportController::new(ViewportConfig::default());
        viewport.set_metrics(ViewportMetrics::one_to_one(64, 64));
        (session, trace, viewport)
    }

    #[test]
    fn test_stroke_lifecycle_commits_one_snapshot() {
        let (mut session, mut trace, viewport) = rig();
        assert_eq!(session.history_len(), 1);

        session.pointer_down(&mut trace, &viewport, Point::new(5.0, 5.0));
        assert!(session.is_drawing());
        session.pointer_move(&mut trace, &viewport, Point::new(20.0, 10.0));
        session.pointer_move(&mut trace, &viewport, Point::new(30.0, 30.0));
        session.pointer_up(&mut trace);

        assert!(!session.is_drawing());
        assert_eq!(session.history_len(), 2);
        assert_eq!(trace.count(|op| matches!(op, PaintOp::StrokeLine { .. })), 2);
    }

    #[test]
    fn test_move_without_down_paints_nothing() {
        let (mut session, mut trace, viewport) = rig();
        session.pointer_move(&mut trace, &viewport, Point::new(20.0, 10.0));
        assert_eq!(trace.drawn(), 0);
        session.pointer_up(&mut trace);
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_segments_chain_through_previous_point() {
        let (mut session, mut trace, viewport) = rig();
        session.pointer_down(&mut trace, &viewport, Point::new(0.0, 0.0));
        session.pointer_move(&mut trace, &viewport, Point::new(10.0, 0.0));
        session.pointer_move(&mut trace, &viewport, Point::new(10.0, 10.0));

        let lines: Vec<(Point, Point)> = trace
            .ops()
            .iter()
            .filter_map(|op| match op {
                PaintOp::StrokeLine { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            vec![
                (Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
                (Point::new(10.0, 0.0), Point::new(10.0, 10.0)),
            ]
        );
    }

    #[test]
    fn test_screen_points_go_through_viewport_mapping() {
        let (mut session, mut trace, mut viewport) = rig();
        viewport.set_scale(2.0, None);
        session.pointer_down(&mut trace, &viewport, Point::new(32.0, 32.0));
        session.pointer_move(&mut trace, &viewport, Point::new(48.0, 32.0));

        let line = trace.ops().iter().find_map(|op| match op {
            PaintOp::StrokeLine { from, to } => Some((*from, *to)),
            _ => None,
        });
        // center stays fixed at 2x zoom, 16 screen px become 8 surface px
        let (from, to) = line.expect("painted line");
        assert!((from.x - 32.0).abs() < 1e-9 && (from.y - 32.0).abs() < 1e-9);
        assert!((to.x - 40.0).abs() < 1e-9 && (to.y - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_eraser_mode_is_restored_on_stroke_end() {
        let (mut session, mut trace, viewport) = rig();
        session.set_tool(SessionTool::Eraser);
        session.pointer_down(&mut trace, &viewport, Point::new(5.0, 5.0));
        assert_eq!(trace.composite(), CompositeMode::DestinationOut);
        session.pointer_move(&mut trace, &viewport, Point::new(25.0, 5.0));
        assert_eq!(trace.composite(), CompositeMode::DestinationOut);
        session.pointer_up(&mut trace);
        assert_eq!(trace.composite(), CompositeMode::SourceOver);

        session.set_tool(SessionTool::Brush(BrushKind::Basic));
        session.pointer_down(&mut trace, &viewport, Point::new(5.0, 20.0));
        session.pointer_move(&mut trace, &viewport, Point::new(25.0, 20.0));
        assert_eq!(trace.composite(), CompositeMode::SourceOver);
    }

    #[test]
    fn test_cancel_closes_stroke_and_commits() {
        let (mut session, mut trace, viewport) = rig();
        session.pointer_down(&mut trace, &viewport, Point::new(5.0, 5.0));
        session.pointer_move(&mut trace, &viewport, Point::new(9.0, 9.0));
        session.pointer_cancel(&mut trace);
        assert!(!session.is_drawing());
        assert_eq!(session.history_len(), 2);

        // next stroke starts from its own down point
        session.pointer_down(&mut trace, &viewport, Point::new(40.0, 40.0));
        session.pointer_move(&mut trace, &viewport, Point::new(50.0, 40.0));
        let last = trace.ops().iter().rev().find_map(|op| match op {
            PaintOp::StrokeLine { from, .. } => Some(*from),
            _ => None,
        });
        assert_eq!(last, Some(Point::new(40.0, 40.0)));
    }

    #[test]
    fn test_unknown_brush_id_still_strokes_a_line() {
        let (mut session, mut trace, viewport) = rig();
        session.set_tool(SessionTool::Brush(BrushKind::parse_lossy("not-a-brush")));
        session.pointer_down(&mut trace, &viewport, Point::new(2.0, 2.0));
        session.pointer_move(&mut trace, &viewport, Point::new(12.0, 2.0));
        assert_eq!(trace.count(|op| matches!(op, PaintOp::StrokeLine { .. })), 1);
    }

    #[test]
    fn test_undo_redo_restore_snapshots() {
        let (mut session, mut trace, viewport) = rig();
        session.pointer_down(&mut trace, &viewport, Point::new(5.0, 5.0));
        session.pointer_move(&mut trace, &viewport, Point::new(20.0, 20.0));
        session.pointer_up(&mut trace);

        assert!(session.undo(&mut trace));
        assert!(!session.undo(&mut trace));
        assert!(session.redo(&mut trace));
        assert!(!session.redo(&mut trace));
        assert_eq!(trace.count(|op| matches!(op, PaintOp::Restore)), 2);
    }

    #[test]
    fn test_clear_and_load_image_commit_history() {
        let (mut session, mut trace, _viewport) = rig();
        session.clear(&mut trace, Rgba::white());
        assert_eq!(session.history_len(), 2);

        let image = RasterImage::blank(64, 64);
        session.load_image(&mut trace, &image);
        assert_eq!(session.history_len(), 3);
        assert_eq!(trace.count(|op| matches!(op, PaintOp::DrawImage)), 1);
        assert_eq!(trace.count(|op| matches!(op, PaintOp::Clear(_))), 1);
    }

    #[test]
    fn test_redraw_repaints_snapshot_under_transform() {
        let (session, mut trace, mut viewport) = rig();
        viewport.set_scale(1.5, None);
        session.redraw(&mut trace, &viewport);

        let expected = viewport.render_transform();
        assert_eq!(trace.count(|op| matches!(op, PaintOp::Clear(_))), 1);
        assert_eq!(trace.count(|op| matches!(op, PaintOp::DrawImage)), 1);
        assert!(trace
            .ops()
            .iter()
            .any(|op| matches!(op, PaintOp::Transform(t) if *t == expected)));
    }
}
