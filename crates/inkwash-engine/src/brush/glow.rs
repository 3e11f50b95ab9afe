//! Glow-compositing painters. The halo itself comes from the style's glow
//! attribute; these passes lay the bright core geometry on top.

use super::{shade, SegmentFrame, StrokeSegment};
use crate::paint::PaintContext;
use crate::rng::StrokeRng;
use kurbo::Vec2;
use std::f64::consts::{PI, TAU};

pub(super) fn neon(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let flicker = 0.5 + rng.next_f64() * 0.1;
    ctx.set_stroke_color(segment.color.scale_alpha(flicker));
    ctx.set_line_width(segment.width.max(0.5));
    ctx.stroke_line(frame.from, frame.to);

    ctx.set_stroke_color(shade(segment.color, 0.75));
    ctx.set_line_width((segment.width * settings.core_ratio()).max(0.3));
    ctx.stroke_line(frame.from, frame.to);
}

pub(super) fn star(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let points = settings.star_points().max(3);
    let phase = rng.next_f64() * TAU;
    let outer = segment.width * (1.4 + rng.next_f64() * 0.6);
    let inner = outer * 0.45;

    let mut path = kurbo::BezPath::new();
    for i in 0..(points * 2) {
        let r = if i % 2 == 0 { outer } else { inner };
        let p = frame.to + Vec2::from_angle(phase + i as f64 * PI / points as f64) * r;
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    ctx.set_fill_color(segment.color);
    ctx.fill_path(&path);

    if rng.chance(settings.twinkle_chance()) {
        let p = frame.lerp(rng.next_f64());
        let arm = segment.width * 0.8;
        ctx.set_stroke_color(shade(segment.color, 0.8));
        ctx.set_line_width(0.6);
        ctx.stroke_line(p - Vec2::new(arm, 0.0), p + Vec2::new(arm, 0.0));
        ctx.stroke_line(p - Vec2::new(0.0, arm), p + Vec2::new(0.0, arm));
    }
}

pub(super) fn meteor(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let decay = settings.trail_decay().clamp(0.05, 0.95);
    let mut alpha = 0.5;
    let mut radius = segment.width * 0.5;
    for i in 1..=settings.trail_length() {
        let p = frame.to - frame.dir * (i as f64 * segment.width * 0.9)
            + frame.normal * rng.jitter(segment.width * 0.15);
        ctx.set_fill_color(segment.color.scale_alpha(alpha));
        ctx.fill_circle(p, radius.max(0.3));
        alpha *= decay;
        radius *= 0.85;
    }
    ctx.set_fill_color(shade(segment.color, 0.6));
    ctx.fill_circle(frame.to, (segment.width * 0.6).max(0.4));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::{paint_segment, resolve_style, BrushKind};
    use crate::color::Rgba;
    use crate::settings::BrushSettings;
    use crate::trace::{PaintOp, TraceContext};
    use kurbo::Point;

    fn run(kind: BrushKind, settings: &BrushSettings) -> TraceContext {
        let mut trace = TraceContext::new(128, 128);
        let mut rng = StrokeRng::new(41);
        let segment = StrokeSegment {
            from: Point::new(15.0, 15.0),
            to: Point::new(90.0, 40.0),
            brush: kind,
            settings,
            color: Rgba::opaque(90, 230, 255),
            width: 7.0,
            clock_ms: 0.0,
        };
        assert!(paint_segment(&mut trace, &segment, &mut rng));
        trace
    }

    #[test]
    fn test_glow_kinds_resolve_with_halo() {
        let settings = BrushSettings::default();
        for kind in [BrushKind::Neon, BrushKind::Star, BrushKind::Meteor] {
            let style = resolve_style(kind, &settings, Rgba::white(), 7.0);
            let glow = style.glow.expect("halo expected");
            assert!(glow.radius > 0.0, "{kind}");
        }
    }

    #[test]
    fn test_neon_strokes_outer_and_core_passes() {
        let trace = run(BrushKind::Neon, &BrushSettings::default());
        let widths: Vec<f64> = trace
            .ops()
            .iter()
            .filter_map(|op| match op {
                PaintOp::LineWidth(w) => Some(*w),
                _ => None,
            })
            .collect();
        assert_eq!(trace.count(|op| matches!(op, PaintOp::StrokeLine { .. })), 2);
        assert_eq!(widths.len(), 2);
        assert!(widths[1] < widths[0]);
    }

    #[test]
    fn test_star_polygon_has_two_vertices_per_point() {
        let settings = BrushSettings {
            star_points: Some(5.0),
            twinkle_chance: Some(0.0),
            ..Default::default()
        };
        let trace = run(BrushKind::Star, &settings);
        let elements: Vec<usize> = trace
            .ops()
            .iter()
            .filter_map(|op| match op {
                PaintOp::FillPath { elements } => Some(*elements),
                _ => None,
            })
            .collect();
        // move + 9 lines + close
        assert_eq!(elements, vec![11]);
    }

    #[test]
    fn test_meteor_trail_length_is_configurable() {
        let settings = BrushSettings {
            trail_length: Some(4.0),
            ..Default::default()
        };
        let trace = run(BrushKind::Meteor, &settings);
        assert_eq!(trace.count(|op| matches!(op, PaintOp::FillCircle { .. })), 5);
    }
}
