//! Fractal bolt painters.
//!
//! The segment is split at its midpoint, the midpoint displaced along the
//! perpendicular by a random amount bounded by an amplitude that halves on
//! every split, and the halves are queued for further splitting. Work runs
//! off an explicit stack, and the amplitude floor guarantees termination
//! regardless of geometry.

use super::{shade, SegmentFrame, StrokeSegment};
use crate::paint::PaintContext;
use crate::rng::StrokeRng;
use kurbo::{Point, Vec2};

#[derive(Clone, Copy)]
struct Piece {
    from: Point,
    to: Point,
    amplitude: f64,
    width_scale: f64,
}

fn bolt(
    ctx: &mut dyn PaintContext,
    from: Point,
    to: Point,
    base_width: f64,
    roughness: f64,
    min_offset: f64,
    branch_chance: f64,
    branch_scale: f64,
    rng: &mut StrokeRng,
) {
    let min_offset = min_offset.max(0.5);
    let mut work = vec![Piece {
        from,
        to,
        amplitude: (to - from).hypot() * roughness.max(0.0),
        width_scale: 1.0,
    }];
    while let Some(piece) = work.pop() {
        let span = piece.to - piece.from;
        let length = span.hypot();
        if piece.amplitude < min_offset || length < 2.0 {
            ctx.set_line_width((base_width * piece.width_scale).max(0.3));
            ctx.stroke_line(piece.from, piece.to);
            continue;
        }
        let normal = Vec2::new(-span.y, span.x) / length;
        let mid = piece.from.midpoint(piece.to) + normal * rng.jitter(piece.amplitude);
        let half = piece.amplitude * 0.5;
        work.push(Piece {
            from: piece.from,
            to: mid,
            amplitude: half,
            width_scale: piece.width_scale,
        });
        work.push(Piece {
            from: mid,
            to: piece.to,
            amplitude: half,
            width_scale: piece.width_scale,
        });
        if piece.width_scale > 0.4 && rng.chance(branch_chance) {
            let start = piece.from.lerp(piece.to, 0.3 + rng.next_f64() * 0.4);
            let reach = span * branch_scale + normal * rng.jitter(piece.amplitude * 1.5);
            work.push(Piece {
                from: start,
                to: start + reach,
                amplitude: half * branch_scale.clamp(0.1, 1.0),
                width_scale: piece.width_scale * 0.5,
            });
        }
    }
}

pub(super) fn electric(
    ctx: &mut dyn PaintContext,
    segment: &StrokeSegment<'_>,
    rng: &mut StrokeRng,
) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    if frame.length == 0.0 {
        ctx.stroke_line(frame.from, frame.to);
        return;
    }
    let base = (segment.width * 0.45).max(0.3);
    ctx.set_stroke_color(segment.color);
    bolt(
        ctx,
        frame.from,
        frame.to,
        base,
        settings.bolt_roughness() * 1.25,
        settings.bolt_min_offset(),
        settings.branch_chance(),
        settings.branch_scale(),
        rng,
    );
    ctx.set_stroke_color(shade(segment.color, 0.6));
    bolt(
        ctx,
        frame.from,
        frame.to,
        base * 0.5,
        settings.bolt_roughness() * 1.25,
        settings.bolt_min_offset(),
        0.0,
        settings.branch_scale(),
        rng,
    );
}

pub(super) fn lightning(
    ctx: &mut dyn PaintContext,
    segment: &StrokeSegment<'_>,
    rng: &mut StrokeRng,
) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    if frame.length == 0.0 {
        ctx.stroke_line(frame.from, frame.to);
        return;
    }
    ctx.set_stroke_color(segment.color);
    bolt(
        ctx,
        frame.from,
        frame.to,
        (segment.width * 0.55).max(0.3),
        settings.bolt_roughness(),
        settings.bolt_min_offset(),
        (settings.branch_chance() * 1.5).min(1.0),
        settings.branch_scale(),
        rng,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::{paint_segment, BrushKind};
    use crate::color::Rgba;
    use crate::settings::BrushSettings;
    use crate::trace::{PaintOp, TraceContext};

    fn run(kind: BrushKind, settings: &BrushSettings, from: Point, to: Point) -> TraceContext {
        let mut trace = TraceContext::new(256, 256);
        let mut rng = StrokeRng::new(77);
        let segment = StrokeSegment {
            from,
            to,
            brush: kind,
            settings,
            color: Rgba::opaque(240, 240, 120),
            width: 6.0,
            clock_ms: 0.0,
        };
        assert!(paint_segment(&mut trace, &segment, &mut rng));
        trace
    }

    fn lines(trace: &TraceContext) -> Vec<(Point, Point)> {
        trace
            .ops()
            .iter()
            .filter_map(|op| match op {
                PaintOp::StrokeLine { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_lightning_subdivides_long_segments() {
        let settings = BrushSettings::default();
        let trace = run(
            BrushKind::Lightning,
            &settings,
            Point::new(10.0, 10.0),
            Point::new(200.0, 150.0),
        );
        let pieces = lines(&trace);
        assert!(pieces.len() > 4);
        for (a, b) in &pieces {
            assert!(a.is_finite() && b.is_finite());
        }
        assert!(pieces.iter().any(|(a, _)| *a == Point::new(10.0, 10.0)));
        assert!(pieces.iter().any(|(_, b)| *b == Point::new(200.0, 150.0)));
    }

    #[test]
    fn test_zero_length_segment_is_one_direct_stroke() {
        let settings = BrushSettings::default();
        let p = Point::new(40.0, 40.0);
        let trace = run(BrushKind::Lightning, &settings, p, p);
        assert_eq!(lines(&trace), vec![(p, p)]);
        let trace = run(BrushKind::Electric, &settings, p, p);
        assert_eq!(lines(&trace), vec![(p, p)]);
    }

    #[test]
    fn test_zero_roughness_degenerates_to_straight_line() {
        let settings = BrushSettings {
            bolt_roughness: Some(0.0),
            ..Default::default()
        };
        let from = Point::new(5.0, 5.0);
        let to = Point::new(120.0, 40.0);
        let trace = run(BrushKind::Lightning, &settings, from, to);
        assert_eq!(lines(&trace), vec![(from, to)]);
    }

    #[test]
    fn test_huge_roughness_still_terminates() {
        let settings = BrushSettings {
            bolt_roughness: Some(50.0),
            branch_chance: Some(0.5),
            ..Default::default()
        };
        let trace = run(
            BrushKind::Electric,
            &settings,
            Point::new(0.0, 0.0),
            Point::new(64.0, 64.0),
        );
        assert!(!lines(&trace).is_empty());
    }
}
