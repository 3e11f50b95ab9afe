//! Pan/zoom viewport state and gestures.
//!
//! [`ViewportController`] owns the live [`Transform`], its undo/redo history,
//! and the pointer/wheel gesture state that mutates it. Hosts route input
//! events here, ask for screen-to-surface coordinate mapping, and render
//! through [`ViewportController::render_canvas`] so every frame is drawn
//! under the current transform.

use crate::color::Rgba;
use crate::history::History;
use crate::input::{PointerEvent, PointerId, WheelEvent};
use crate::paint::PaintSurface;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Pan/zoom state. `offset` is in surface pixels, applied after scaling
/// about the surface center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub offset: Vec2,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        offset: Vec2::ZERO,
    };
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Host-supplied viewport tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Additive step used by `zoom_in`/`zoom_out` and wheel zooming.
    pub scale_step: f64,
    pub background: Rgba,
    pub enable_pan: bool,
    pub enable_wheel: bool,
    pub enable_pinch: bool,
    pub enable_history: bool,
    /// When set, wheel events zoom only while ctrl/meta is held and plain
    /// scrolling pans instead.
    pub wheel_zoom_requires_modifier: bool,
    /// Cap on stored transform history entries. Unbounded when `None`.
    pub history_limit: Option<usize>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 10.0,
            scale_step: 0.1,
            background: Rgba::white(),
            enable_pan: true,
            enable_wheel: true,
            enable_pinch: true,
            enable_history: true,
            wheel_zoom_requires_modifier: true,
            history_limit: None,
        }
    }
}

/// Geometry linking the backing raster to its on-screen placement.
///
/// Pointer events arrive in screen coordinates; the surface may be displayed
/// at a different size (device pixel ratio, CSS layout), so conversions go
/// through the per-axis backing ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportMetrics {
    pub surface_width: u32,
    pub surface_height: u32,
    pub display_origin: Point,
    pub display_width: f64,
    pub display_height: f64,
}

impl ViewportMetrics {
    pub fn new(
        surface_width: u32,
        surface_height: u32,
        display_origin: Point,
        display_width: f64,
        display_height: f64,
    ) -> Self {
        Self {
            surface_width,
            surface_height,
            display_origin,
            display_width,
            display_height,
        }
    }

    /// Display rect congruent with the backing raster (ratio 1, origin 0).
    pub fn one_to_one(surface_width: u32, surface_height: u32) -> Self {
        Self::new(
            surface_width,
            surface_height,
            Point::ZERO,
            surface_width as f64,
            surface_height as f64,
        )
    }

    fn backing_ratio(&self) -> Vec2 {
        let x = if self.display_width > 0.0 {
            self.surface_width as f64 / self.display_width
        } else {
            1.0
        };
        let y = if self.display_height > 0.0 {
            self.surface_height as f64 / self.display_height
        } else {
            1.0
        };
        Vec2::new(x, y)
    }

    /// Screen point to backing-raster display coordinates (ratio applied,
    /// transform not yet removed).
    pub fn backing_point(&self, screen: Point) -> Point {
        let ratio = self.backing_ratio();
        Point::new(
            (screen.x - self.display_origin.x) * ratio.x,
            (screen.y - self.display_origin.y) * ratio.y,
        )
    }

    /// Screen-space delta to backing-raster delta.
    pub fn backing_delta(&self, delta: Vec2) -> Vec2 {
        let ratio = self.backing_ratio();
        Vec2::new(delta.x * ratio.x, delta.y * ratio.y)
    }

    pub fn surface_center(&self) -> Point {
        Point::new(
            self.surface_width as f64 / 2.0,
            self.surface_height as f64 / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum GestureState {
    Idle,
    Pan {
        last: Point,
    },
    Pinch {
        start_distance: f64,
        start_scale: f64,
        last_centroid: Point,
    },
}

/// Owns the transform, its history, and in-flight gesture state.
pub struct ViewportController {
    config: ViewportConfig,
    transform: Transform,
    history: History<Transform>,
    metrics: Option<ViewportMetrics>,
    pointers: Vec<(PointerId, Point)>,
    gesture: GestureState,
    gesture_dirty: bool,
    on_transform: Option<Box<dyn FnMut(Transform)>>,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        let history = match config.history_limit {
            Some(limit) => History::with_limit(Transform::IDENTITY, limit),
            None => History::new(Transform::IDENTITY),
        };
        Self {
            config,
            transform: Transform::IDENTITY,
            history,
            metrics: None,
            pointers: Vec::new(),
            gesture: GestureState::Idle,
            gesture_dirty: false,
            on_transform: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn metrics(&self) -> Option<ViewportMetrics> {
        self.metrics
    }

    /// Attach or update the surface/display geometry. Until this is called
    /// coordinate queries return the origin.
    pub fn set_metrics(&mut self, metrics: ViewportMetrics) {
        self.metrics = Some(metrics);
    }

    /// Register the redraw hook, invoked after every applied transform
    /// change, including gesture frames and undo/redo.
    pub fn set_on_transform(&mut self, callback: impl FnMut(Transform) + 'static) {
        self.on_transform = Some(Box::new(callback));
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

    /// Set the zoom level, clamped to the configured range. When `center`
    /// is given (backing display coordinates) the offset is recomputed as
    /// `offset' = u - (u - offset) * (scale'/scale)` with `u` relative to
    /// the surface center, so the surface point under `center` stays fixed.
    /// Does nothing when the clamped scale equals the current one.
    pub fn set_scale(&mut self, scale: f64, center: Option<Point>) {
        let clamped = scale.clamp(self.config.min_scale, self.config.max_scale);
        if clamped == self.transform.scale {
            return;
        }
        let ratio = clamped / self.transform.scale;
        let offset = match center {
            Some(anchor) => {
                let u = anchor - self.surface_center();
                u - (u - self.transform.offset) * ratio
            }
            None => self.transform.offset,
        };
        self.apply(Transform {
            scale: clamped,
            offset,
        });
        self.commit();
    }

    /// Step the zoom in, keeping the surface midpoint where it is.
    pub fn zoom_in(&mut self) {
        let anchor = self.surface_center() + self.transform.offset;
        self.set_scale(self.transform.scale + self.config.scale_step, Some(anchor));
    }

    pub fn zoom_out(&mut self) {
        let anchor = self.surface_center() + self.transform.offset;
        self.set_scale(self.transform.scale - self.config.scale_step, Some(anchor));
    }

    /// Set the absolute pan offset in surface pixels.
    pub fn pan_to(&mut self, offset: Vec2) {
        if offset == self.transform.offset {
            return;
        }
        self.apply(Transform {
            scale: self.transform.scale,
            offset,
        });
        self.commit();
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan_to(self.transform.offset + delta);
    }

    pub fn reset_transform(&mut self) {
        if self.transform == Transform::IDENTITY {
            return;
        }
        self.apply(Transform::IDENTITY);
        self.commit();
    }

    /// Step back in transform history. Returns false at the oldest entry.
    pub fn undo_transform(&mut self) -> bool {
        let entry = self.history.undo().copied();
        match entry {
            Some(transform) => {
                self.apply(transform);
                true
            }
            None => false,
        }
    }

    /// Step forward in transform history. Returns false at the newest entry.
    pub fn redo_transform(&mut self) -> bool {
        let entry = self.history.redo().copied();
        match entry {
            Some(transform) => {
                self.apply(transform);
                true
            }
            None => false,
        }
    }

    /// Map a screen-space pointer position to surface coordinates, removing
    /// the backing ratio and then the transform. Returns the origin while no
    /// metrics are attached.
    pub fn surface_point(&self, screen: Point) -> Point {
        let Some(metrics) = self.metrics else {
            return Point::ZERO;
        };
        let q = metrics.backing_point(screen);
        let c = metrics.surface_center();
        let t = self.transform;
        Point::new(
            (q.x - c.x) / t.scale + c.x - t.offset.x / t.scale,
            (q.y - c.y) / t.scale + c.y - t.offset.y / t.scale,
        )
    }

    /// The surface-to-display affine for the current transform:
    /// `translate(center + offset) * scale * translate(-center)`.
    pub fn render_transform(&self) -> Affine {
        let c = self.surface_center().to_vec2();
        Affine::translate(c + self.transform.offset)
            * Affine::scale(self.transform.scale)
            * Affine::translate(-c)
    }

    /// Clear to the background color, run `draw` under the current
    /// transform, then restore the identity transform.
    pub fn render_canvas<F>(&self, surface: &mut dyn PaintSurface, draw: F)
    where
        F: FnOnce(&mut dyn PaintSurface, Transform),
    {
        surface.clear(self.config.background);
        surface.set_transform(self.render_transform());
        draw(surface, self.transform);
        surface.set_transform(Affine::IDENTITY);
    }

    /// Feed a pointer event into gesture tracking. One pointer drags a pan,
    /// two pointers pinch-zoom; the history entry lands once when the last
    /// pointer lifts.
    pub fn pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down { id, position } => {
                if !self.pointers.iter().any(|(pid, _)| *pid == id) {
                    self.pointers.push((id, position));
                }
                self.refresh_gesture();
            }
            PointerEvent::Move { id, position } => {
                if let Some(slot) = self.pointers.iter_mut().find(|(pid, _)| *pid == id) {
                    slot.1 = position;
                }
                self.gesture_move(position);
            }
            PointerEvent::Up { id, .. } | PointerEvent::Cancel { id } => {
                self.pointers.retain(|(pid, _)| *pid != id);
                if self.pointers.is_empty() {
                    self.finish_gesture();
                } else {
                    self.refresh_gesture();
                }
            }
        }
    }

    /// Feed a wheel event. Zooms about the cursor when the zoom modifier is
    /// held (or not required), otherwise scrolls the pan offset. Each wheel
    /// event is a completed operation and commits on its own.
    pub fn wheel_event(&mut self, event: &WheelEvent) {
        if !self.config.enable_wheel || event.delta_y == 0.0 {
            return;
        }
        let zoom = event.modifiers.command_like() || !self.config.wheel_zoom_requires_modifier;
        if zoom {
            let anchor = self.backing_point(event.position);
            let step = if event.delta_y < 0.0 {
                self.config.scale_step
            } else {
                -self.config.scale_step
            };
            self.set_scale(self.transform.scale + step, Some(anchor));
        } else {
            let screen = if event.modifiers.shift {
                Vec2::new(-event.delta_y, 0.0)
            } else {
                Vec2::new(0.0, -event.delta_y)
            };
            self.pan_by(self.backing_delta(screen));
        }
    }

    fn refresh_gesture(&mut self) {
        self.gesture = match self.pointers.len() {
            1 if self.config.enable_pan => GestureState::Pan {
                last: self.pointers[0].1,
            },
            n if n >= 2 && self.config.enable_pinch => {
                let a = self.pointers[0].1;
                let b = self.pointers[1].1;
                GestureState::Pinch {
                    start_distance: (b - a).hypot(),
                    start_scale: self.transform.scale,
                    last_centroid: a.midpoint(b),
                }
            }
            _ => GestureState::Idle,
        };
    }

    fn gesture_move(&mut self, position: Point) {
        match self.gesture {
            GestureState::Idle => {}
            GestureState::Pan { last } => {
                self.gesture = GestureState::Pan { last: position };
                let delta = self.backing_delta(position - last);
                if delta.hypot() > 0.0 {
                    self.apply(Transform {
                        scale: self.transform.scale,
                        offset: self.transform.offset + delta,
                    });
                    self.gesture_dirty = true;
                }
            }
            GestureState::Pinch {
                start_distance,
                start_scale,
                last_centroid,
            } => {
                if self.pointers.len() < 2 {
                    return;
                }
                let a = self.pointers[0].1;
                let b = self.pointers[1].1;
                let centroid = a.midpoint(b);
                self.gesture = GestureState::Pinch {
                    start_distance,
                    start_scale,
                    last_centroid: centroid,
                };
                let mut next = self.transform;
                if start_distance > 0.0 {
                    let factor = (b - a).hypot() / start_distance;
                    next.scale = (start_scale * factor)
                        .clamp(self.config.min_scale, self.config.max_scale);
                }
                next.offset += self.backing_delta(centroid - last_centroid);
                if next != self.transform {
                    self.apply(next);
                    self.gesture_dirty = true;
                }
            }
        }
    }

    fn finish_gesture(&mut self) {
        self.gesture = GestureState::Idle;
        if self.gesture_dirty {
            self.gesture_dirty = false;
            self.commit();
        }
    }

    fn surface_center(&self) -> Point {
        self.metrics
            .map(|m| m.surface_center())
            .unwrap_or(Point::ZERO)
    }

    fn backing_point(&self, screen: Point) -> Point {
        self.metrics
            .map(|m| m.backing_point(screen))
            .unwrap_or(screen)
    }

    fn backing_delta(&self, delta: Vec2) -> Vec2 {
        self.metrics
            .map(|m| m.backing_delta(delta))
            .unwrap_or(delta)
    }

    fn apply(&mut self, transform: Transform) {
        self.transform = transform;
        if let Some(callback) = self.on_transform.as_mut() {
            callback(transform);
        }
    }

    fn commit(&mut self) {
        if self.config.enable_history {
            self.history.push(self.transform);
            log::debug!(
                "Transform committed: scale {:.3}, offset ({:.1}, {:.1})",
                self.transform.scale,
                self.transform.offset.x,
                self.transform.offset.y
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn controller() -> ViewportController {
        let mut vp = ViewportController::new(ViewportConfig::default());
        vp.set_metrics(ViewportMetrics::one_to_one(800, 600));
        vp
    }

    fn assert_near(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_scale_clamps_and_repeat_is_idempotent() {
        let mut vp = controller();
        vp.set_scale(50.0, None);
        assert_eq!(vp.transform().scale, 10.0);
        let len = vp.history_len();
        vp.set_scale(25.0, None);
        assert_eq!(vp.transform().scale, 10.0);
        assert_eq!(vp.history_len(), len);
    }

    #[test]
    fn test_anchored_zoom_fixes_surface_point_under_cursor() {
        let mut vp = ViewportController::new(ViewportConfig::default());
        let metrics = ViewportMetrics::new(800, 600, Point::new(10.0, 20.0), 400.0, 300.0);
        vp.set_metrics(metrics);
        vp.pan_to(Vec2::new(33.0, -12.5));

        let screen = Point::new(137.0, 93.0);
        let before = vp.surface_point(screen);
        vp.set_scale(2.3, Some(metrics.backing_point(screen)));
        assert_near(vp.surface_point(screen), before);
        vp.set_scale(0.7, Some(metrics.backing_point(screen)));
        assert_near(vp.surface_point(screen), before);
    }

    #[test]
    fn test_surface_point_inverts_render_transform() {
        let mut vp = ViewportController::new(ViewportConfig::default());
        let metrics = ViewportMetrics::new(800, 600, Point::new(4.0, 6.0), 200.0, 150.0);
        vp.set_metrics(metrics);
        vp.set_scale(1.8, None);
        vp.pan_to(Vec2::new(-40.0, 25.0));

        let surface = Point::new(123.0, 456.0);
        let backing = vp.render_transform() * surface;
        let screen = Point::new(backing.x / 4.0 + 4.0, backing.y / 4.0 + 6.0);
        assert_near(vp.surface_point(screen), surface);
    }

    #[test]
    fn test_undo_redo_round_trip_restores_transform() {
        let mut vp = controller();
        vp.pan_to(Vec2::new(10.0, 0.0));
        vp.set_scale(2.0, None);
        vp.pan_to(Vec2::new(-5.0, 8.0));

        let latest = vp.transform();
        assert!(vp.undo_transform());
        assert_ne!(vp.transform(), latest);
        assert!(vp.redo_transform());
        assert_eq!(vp.transform(), latest);
    }

    #[test]
    fn test_commit_after_undo_truncates_branch() {
        let mut vp = controller();
        vp.pan_to(Vec2::new(10.0, 0.0));
        vp.pan_to(Vec2::new(20.0, 0.0));
        assert_eq!(vp.history_len(), 3);

        assert!(vp.undo_transform());
        assert!(vp.undo_transform());
        vp.set_scale(1.7, None);
        assert_eq!(vp.history_len(), 2);
        assert!(!vp.redo_transform());
        assert_eq!(vp.transform().scale, 1.7);
    }

    #[test]
    fn test_zoom_in_undo_redo_scenario() {
        let mut vp = controller();
        vp.zoom_in();
        assert_eq!(vp.transform(), Transform { scale: 1.1, offset: Vec2::ZERO });
        assert!(vp.undo_transform());
        assert_eq!(vp.transform().scale, 1.0);
        assert!(vp.redo_transform());
        assert_eq!(vp.transform().scale, 1.1);
    }

    #[test]
    fn test_undo_at_seed_returns_false() {
        let mut vp = controller();
        assert!(!vp.undo_transform());
        assert!(!vp.redo_transform());
        assert_eq!(vp.transform(), Transform::IDENTITY);
    }

    #[test]
    fn test_surface_point_without_metrics_is_origin() {
        let vp = ViewportController::new(ViewportConfig::default());
        assert_eq!(vp.surface_point(Point::new(99.0, 99.0)), Point::ZERO);
    }

    #[test]
    fn test_drag_pan_commits_once_on_release() {
        let mut vp = controller();
        let id = PointerId(1);
        vp.pointer_event(&PointerEvent::Down { id, position: Point::new(100.0, 100.0) });
        vp.pointer_event(&PointerEvent::Move { id, position: Point::new(130.0, 90.0) });
        vp.pointer_event(&PointerEvent::Move { id, position: Point::new(150.0, 120.0) });
        assert_eq!(vp.transform().offset, Vec2::new(50.0, 20.0));
        assert_eq!(vp.history_len(), 1);

        vp.pointer_event(&PointerEvent::Up { id, position: Point::new(150.0, 120.0) });
        assert_eq!(vp.history_len(), 2);
    }

    #[test]
    fn test_pinch_scales_by_distance_ratio() {
        let mut vp = controller();
        let a = PointerId(1);
        let b = PointerId(2);
        vp.pointer_event(&PointerEvent::Down { id: a, position: Point::new(100.0, 100.0) });
        vp.pointer_event(&PointerEvent::Down { id: b, position: Point::new(200.0, 100.0) });
        vp.pointer_event(&PointerEvent::Move { id: a, position: Point::new(50.0, 100.0) });
        vp.pointer_event(&PointerEvent::Move { id: b, position: Point::new(250.0, 100.0) });

        assert!((vp.transform().scale - 2.0).abs() < 1e-9);
        assert_eq!(vp.transform().offset, Vec2::ZERO);
        assert_eq!(vp.history_len(), 1);

        vp.pointer_event(&PointerEvent::Up { id: a, position: Point::new(50.0, 100.0) });
        vp.pointer_event(&PointerEvent::Up { id: b, position: Point::new(250.0, 100.0) });
        assert_eq!(vp.history_len(), 2);
        assert!((vp.transform().scale - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_cancel_ends_gesture_without_rollback() {
        let mut vp = controller();
        let id = PointerId(7);
        vp.pointer_event(&PointerEvent::Down { id, position: Point::new(0.0, 0.0) });
        vp.pointer_event(&PointerEvent::Move { id, position: Point::new(25.0, 0.0) });
        vp.pointer_event(&PointerEvent::Cancel { id });
        assert_eq!(vp.transform().offset, Vec2::new(25.0, 0.0));
        assert_eq!(vp.history_len(), 2);
    }

    #[test]
    fn test_wheel_with_modifier_zooms_toward_cursor() {
        let mut vp = controller();
        let modifiers = Modifiers { ctrl: true, ..Default::default() };
        vp.wheel_event(&WheelEvent {
            position: Point::new(400.0, 300.0),
            delta_y: -120.0,
            modifiers,
        });
        assert!((vp.transform().scale - 1.1).abs() < 1e-9);
        assert_eq!(vp.history_len(), 2);
        vp.wheel_event(&WheelEvent {
            position: Point::new(400.0, 300.0),
            delta_y: 120.0,
            modifiers,
        });
        assert!((vp.transform().scale - 1.0).abs() < 1e-9);
        assert_eq!(vp.history_len(), 3);
    }

    #[test]
    fn test_wheel_without_modifier_scrolls() {
        let mut vp = controller();
        vp.wheel_event(&WheelEvent {
            position: Point::new(400.0, 300.0),
            delta_y: 30.0,
            modifiers: Modifiers::default(),
        });
        assert_eq!(vp.transform().offset, Vec2::new(0.0, -30.0));
        assert_eq!(vp.transform().scale, 1.0);
    }

    #[test]
    fn test_on_transform_fires_for_gesture_frames_and_undo() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut vp = controller();
        vp.set_on_transform(move |t| sink.borrow_mut().push(t));

        let id = PointerId(1);
        vp.pointer_event(&PointerEvent::Down { id, position: Point::ZERO });
        vp.pointer_event(&PointerEvent::Move { id, position: Point::new(10.0, 0.0) });
        vp.pointer_event(&PointerEvent::Move { id, position: Point::new(20.0, 0.0) });
        vp.pointer_event(&PointerEvent::Up { id, position: Point::new(20.0, 0.0) });
        assert_eq!(seen.borrow().len(), 2);

        vp.undo_transform();
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(seen.borrow()[2], Transform::IDENTITY);
    }

    #[test]
    fn test_disabled_pan_ignores_drag() {
        let config = ViewportConfig { enable_pan: false, ..Default::default() };
        let mut vp = ViewportController::new(config);
        vp.set_metrics(ViewportMetrics::one_to_one(800, 600));
        let id = PointerId(1);
        vp.pointer_event(&PointerEvent::Down { id, position: Point::ZERO });
        vp.pointer_event(&PointerEvent::Move { id, position: Point::new(40.0, 0.0) });
        vp.pointer_event(&PointerEvent::Up { id, position: Point::new(40.0, 0.0) });
        assert_eq!(vp.transform(), Transform::IDENTITY);
        assert_eq!(vp.history_len(), 1);
    }
}
