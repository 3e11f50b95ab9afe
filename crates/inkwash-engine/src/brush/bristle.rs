//! Directional bristle and diffusion painters.
//!
//! These lay sub-strokes offset along the segment's perpendicular (or a
//! fixed nib direction) so the mark has body across its width: parallel
//! bristles, layered watercolor blooms, jittered graphite polylines, hairs
//! and blades growing off the spine.

use super::{shade, SegmentFrame, StrokeSegment};
use crate::paint::PaintContext;
use crate::rng::StrokeRng;
use kurbo::{BezPath, Vec2};

pub(super) fn calligraphy(
    ctx: &mut dyn PaintContext,
    segment: &StrokeSegment<'_>,
    rng: &mut StrokeRng,
) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let nib = Vec2::from_angle(settings.nib_angle_deg().to_radians());
    let count = (segment.width.round() as usize).clamp(3, 14);
    ctx.set_line_width((segment.width * settings.nib_ratio() * 0.5).max(0.3));
    for i in 0..count {
        let f = i as f64 / (count - 1) as f64 - 0.5;
        let offset = nib * (f * segment.width);
        let fade = 1.0 - f.abs() * 0.3 + rng.jitter(0.05);
        ctx.set_stroke_color(segment.color.scale_alpha(fade.clamp(0.1, 1.0)));
        ctx.stroke_line(frame.from + offset, frame.to + offset);
    }
}

pub(super) fn brush(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let count = settings.bristle_count();
    let spread = settings.bristle_spread() * segment.width * 0.5;
    let falloff = settings.edge_falloff();
    ctx.set_line_width((segment.width / count as f64 * 1.8).max(0.3));
    for i in 0..count {
        let f = if count == 1 {
            0.0
        } else {
            (i as f64 / (count - 1) as f64) * 2.0 - 1.0
        };
        let offset = frame.normal * (f * spread);
        let wobble_a = frame.normal * rng.jitter(spread * 0.15);
        let wobble_b = frame.normal * rng.jitter(spread * 0.15);
        let alpha = (settings.bristle_alpha() * (1.0 - f.abs() * falloff)).clamp(0.03, 1.0);
        ctx.set_stroke_color(segment.color.scale_alpha(alpha));
        ctx.stroke_line(frame.from + offset + wobble_a, frame.to + offset + wobble_b);
    }
}

pub(super) fn ink(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let flow = (1.0 + rng.jitter(settings.flow_jitter())).max(0.2);
    ctx.set_stroke_color(segment.color);
    ctx.set_line_width((segment.width * flow).max(0.3));
    ctx.stroke_line(frame.from, frame.to);
    if rng.chance(settings.ink_bleed_chance()) {
        let blob = frame.lerp(rng.next_f64());
        let r = settings.ink_bleed_radius() * (0.5 + rng.next_f64() * 0.8);
        ctx.set_fill_color(segment.color.scale_alpha(0.5));
        ctx.fill_circle(blob, r.max(0.3));
    }
}

pub(super) fn watercolor(
    ctx: &mut dyn PaintContext,
    segment: &StrokeSegment<'_>,
    rng: &mut StrokeRng,
) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let passes = settings.bloom_passes();
    let bloom = settings.bloom_offset();
    let decay = settings.bloom_alpha_decay().clamp(0.05, 0.95);
    let mut alpha = 0.35;
    for pass in 0..passes {
        let offset = if pass == 0 {
            Vec2::ZERO
        } else {
            Vec2::new(rng.jitter(bloom), rng.jitter(bloom))
        };
        ctx.set_stroke_color(segment.color.scale_alpha(alpha));
        ctx.set_line_width(segment.width * (1.0 + 0.55 * pass as f64));
        ctx.stroke_line(frame.from + offset, frame.to + offset);
        alpha *= decay;
    }
}

pub(super) fn pencil(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let jitter = settings.graphite_jitter();
    ctx.set_line_width((segment.width * 0.35).max(0.3));
    for side in [-1.0, 1.0] {
        let offset = frame.normal * (side * segment.width * 0.12);
        ctx.set_stroke_color(segment.color.scale_alpha(0.55 + rng.next_f64() * 0.3));
        ctx.stroke_path(&jittered_polyline(&frame, offset, jitter * 0.4, rng));
    }
}

pub(super) fn pen(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    ctx.set_stroke_color(segment.color);
    ctx.set_line_width((segment.width * 0.8).max(0.3));
    ctx.stroke_line(frame.from, frame.to);
    let feather = settings.pen_feather();
    let offset = frame.normal * (segment.width * 0.3 * feather * rng.signed().signum());
    ctx.set_stroke_color(segment.color.scale_alpha(0.35 * feather.clamp(0.0, 1.0)));
    ctx.set_line_width((segment.width * 0.25).max(0.2));
    ctx.stroke_line(frame.from + offset, frame.to + offset);
}

pub(super) fn chalk(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let rough = settings.chalk_roughness();
    let steps = ((frame.length / 2.0).ceil() as usize).max(3);
    ctx.set_line_width((segment.width * 0.9).max(0.5));
    for i in 0..steps {
        let t = i as f64 / steps as f64;
        let p = frame.lerp(t) + frame.normal * rng.jitter(rough);
        let dab = frame.dir * (frame.length / steps as f64 + rough * rng.next_f64());
        ctx.set_stroke_color(segment.color.scale_alpha(0.25 + rng.next_f64() * 0.35));
        ctx.stroke_line(p, p + dab);
    }
    let specks = (steps as f64 * settings.dust_density()).round() as usize;
    for _ in 0..specks {
        let p = frame.lerp(rng.next_f64()) + frame.normal * rng.jitter(segment.width * 1.2);
        ctx.set_fill_color(segment.color.scale_alpha(0.15 * rng.next_f64() + 0.03));
        ctx.fill_circle(p, (0.4 + rng.next_f64() * 0.6).max(0.2));
    }
}

pub(super) fn charcoal(
    ctx: &mut dyn PaintContext,
    segment: &StrokeSegment<'_>,
    rng: &mut StrokeRng,
) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let layers = settings.charcoal_layers();
    for layer in 0..layers {
        let k = layer as f64;
        ctx.set_line_width((segment.width * (0.8 + 0.3 * k)).max(0.4));
        ctx.set_stroke_color(segment.color.scale_alpha((0.5 - 0.1 * k).max(0.08)));
        let offset = frame.normal * rng.jitter(segment.width * 0.15);
        ctx.stroke_path(&jittered_polyline(&frame, offset, 0.9, rng));
    }
    ctx.set_line_width(segment.width * 2.0);
    ctx.set_stroke_color(segment.color.scale_alpha(settings.smudge_alpha().clamp(0.0, 1.0)));
    ctx.stroke_line(frame.from, frame.to);
}

pub(super) fn crayon(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let steps = ((frame.length / 3.0).ceil() as usize).max(1);
    let gap_chance = settings.wax_gap_chance();
    ctx.set_line_width((segment.width * 0.85).max(0.4));
    for i in 0..steps {
        if i > 0 && rng.chance(gap_chance) {
            continue;
        }
        let a = frame.lerp(i as f64 / steps as f64) + frame.normal * rng.jitter(0.5);
        let b = frame.lerp((i + 1) as f64 / steps as f64) + frame.normal * rng.jitter(0.5);
        ctx.set_stroke_color(segment.color.scale_alpha(0.75 + rng.next_f64() * 0.25));
        ctx.stroke_line(a, b);
    }
    let darken = settings.wax_edge_darken().clamp(0.0, 1.0);
    ctx.set_line_width((segment.width * 0.18).max(0.2));
    ctx.set_stroke_color(shade(segment.color, -0.35).scale_alpha(darken));
    for side in [-1.0, 1.0] {
        let offset = frame.normal * (side * segment.width * 0.45);
        ctx.stroke_line(frame.from + offset, frame.to + offset);
    }
}

pub(super) fn fur(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let hairs = settings.hair_count();
    let curl = settings.hair_curl();
    ctx.set_line_width((segment.width * 0.12).max(0.25));
    for _ in 0..hairs {
        let root = frame.lerp(rng.next_f64()) + frame.normal * rng.jitter(segment.width * 0.3);
        let side = if rng.chance(0.5) { 1.0 } else { -1.0 };
        let grow = frame.normal * (side * 0.8) + frame.dir * (0.4 + rng.next_f64() * 0.4);
        let length = settings.hair_length() * (0.6 + rng.next_f64() * 0.7);
        let tip = root + grow * length;
        let bend = Vec2::new(-grow.y, grow.x) * rng.jitter(curl * length * 0.5);
        let mut hair = BezPath::new();
        hair.move_to(root);
        hair.quad_to(root + grow * (length * 0.5) + bend, tip);
        ctx.set_stroke_color(
            shade(segment.color, rng.jitter(0.2)).scale_alpha(0.45 + rng.next_f64() * 0.45),
        );
        ctx.stroke_path(&hair);
    }
}

pub(super) fn grass(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let blades = settings.blade_count();
    let bend = settings.blade_bend();
    let up = Vec2::new(0.0, -1.0);
    ctx.set_line_width((segment.width * 0.15).max(0.25));
    for _ in 0..blades {
        let root = frame.lerp(rng.next_f64());
        let length = settings.blade_length() * (0.7 + rng.next_f64() * 0.6);
        let lean = frame.dir * rng.jitter(bend);
        let tip = root + (up + lean) * length;
        let mut blade = BezPath::new();
        blade.move_to(root);
        blade.quad_to(root + up * (length * 0.45), tip);
        ctx.set_stroke_color(
            shade(segment.color, rng.jitter(0.25)).scale_alpha(0.6 + rng.next_f64() * 0.4),
        );
        ctx.stroke_path(&blade);
    }
}

/// Polyline along the segment with per-vertex perpendicular noise.
fn jittered_polyline(
    frame: &SegmentFrame,
    offset: Vec2,
    jitter: f64,
    rng: &mut StrokeRng,
) -> BezPath {
    let steps = ((frame.length / 4.0).ceil() as usize).clamp(2, 64);
    let mut path = BezPath::new();
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let p = frame.lerp(t) + offset + frame.normal * rng.jitter(jitter);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::{paint_segment, BrushKind};
    use crate::color::Rgba;
    use crate::settings::BrushSettings;
    use crate::trace::{PaintOp, TraceContext};
    use kurbo::Point;

    fn run(kind: BrushKind, settings: &BrushSettings, seed: u32) -> TraceContext {
        let mut trace = TraceContext::new(128, 128);
        let mut rng = StrokeRng::new(seed);
        let segment = StrokeSegment {
            from: Point::new(20.0, 30.0),
            to: Point::new(80.0, 75.0),
            brush: kind,
            settings,
            color: Rgba::opaque(30, 120, 60),
            width: 8.0,
            clock_ms: 0.0,
        };
        assert!(paint_segment(&mut trace, &segment, &mut rng));
        trace
    }

    #[test]
    fn test_calligraphy_substrokes_stay_parallel() {
        let trace = run(BrushKind::Calligraphy, &BrushSettings::default(), 4);
        let mut deltas = Vec::new();
        for op in trace.ops() {
            if let PaintOp::StrokeLine { from, to } = op {
                deltas.push(*to - *from);
            }
        }
        assert!(deltas.len() >= 3);
        for d in &deltas[1..] {
            assert!((d.x - deltas[0].x).abs() < 1e-9);
            assert!((d.y - deltas[0].y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_brush_lays_one_line_per_bristle() {
        let settings = BrushSettings {
            bristle_count: Some(6.0),
            ..Default::default()
        };
        let trace = run(BrushKind::Brush, &settings, 21);
        assert_eq!(trace.drawn(), 6);
    }

    #[test]
    fn test_watercolor_passes_decay_in_alpha() {
        let settings = BrushSettings {
            bloom_passes: Some(3.0),
            ..Default::default()
        };
        let trace = run(BrushKind::Watercolor, &settings, 5);
        assert_eq!(
            trace.count(|op| matches!(op, PaintOp::StrokeLine { .. })),
            3
        );
        let alphas: Vec<u8> = trace
            .ops()
            .iter()
            .filter_map(|op| match op {
                PaintOp::StrokeColor(c) => Some(c.a),
                _ => None,
            })
            .collect();
        assert_eq!(alphas.len(), 3);
        assert!(alphas[0] > alphas[1] && alphas[1] > alphas[2]);
    }

    #[test]
    fn test_ink_bleed_follows_chance_setting() {
        let never = BrushSettings {
            ink_bleed_chance: Some(0.0),
            ..Default::default()
        };
        let always = BrushSettings {
            ink_bleed_chance: Some(1.0),
            ..Default::default()
        };
        let dry = run(BrushKind::Ink, &never, 13);
        assert_eq!(dry.count(|op| matches!(op, PaintOp::FillCircle { .. })), 0);
        assert_eq!(dry.count(|op| matches!(op, PaintOp::StrokeLine { .. })), 1);

        let wet = run(BrushKind::Ink, &always, 13);
        assert_eq!(wet.count(|op| matches!(op, PaintOp::FillCircle { .. })), 1);
    }

    #[test]
    fn test_pencil_draws_two_graphite_passes() {
        let trace = run(BrushKind::Pencil, &BrushSettings::default(), 17);
        assert_eq!(trace.count(|op| matches!(op, PaintOp::StrokePath { .. })), 2);
    }

    #[test]
    fn test_pen_draws_core_and_feather() {
        let trace = run(BrushKind::Pen, &BrushSettings::default(), 3);
        assert_eq!(trace.drawn(), 2);
    }

    #[test]
    fn test_chalk_dust_obeys_density() {
        let bare = BrushSettings {
            dust_density: Some(0.0),
            ..Default::default()
        };
        let trace = run(BrushKind::Chalk, &bare, 8);
        assert_eq!(trace.count(|op| matches!(op, PaintOp::FillCircle { .. })), 0);
        assert!(trace.count(|op| matches!(op, PaintOp::StrokeLine { .. })) >= 3);
    }

    #[test]
    fn test_charcoal_layer_count_is_configurable() {
        let settings = BrushSettings {
            charcoal_layers: Some(4.0),
            ..Default::default()
        };
        let trace = run(BrushKind::Charcoal, &settings, 6);
        assert_eq!(trace.count(|op| matches!(op, PaintOp::StrokePath { .. })), 4);
        assert_eq!(trace.count(|op| matches!(op, PaintOp::StrokeLine { .. })), 1);
    }

    #[test]
    fn test_crayon_without_gaps_covers_every_step() {
        let settings = BrushSettings {
            wax_gap_chance: Some(0.0),
            ..Default::default()
        };
        let trace = run(BrushKind::Crayon, &settings, 10);
        // length 75 -> 25 steps, plus two edge-darkening lines
        assert_eq!(trace.count(|op| matches!(op, PaintOp::StrokeLine { .. })), 27);
    }

    #[test]
    fn test_fur_and_grass_grow_configured_strands() {
        let fur_settings = BrushSettings {
            hair_count: Some(9.0),
            ..Default::default()
        };
        let fur = run(BrushKind::Fur, &fur_settings, 30);
        assert_eq!(fur.count(|op| matches!(op, PaintOp::StrokePath { .. })), 9);

        let grass_settings = BrushSettings {
            blade_count: Some(4.0),
            ..Default::default()
        };
        let grass = run(BrushKind::Grass, &grass_settings, 30);
        assert_eq!(grass.count(|op| matches!(op, PaintOp::StrokePath { .. })), 4);
    }
}
