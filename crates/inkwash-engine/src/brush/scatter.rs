//! Particle-scatter painters.
//!
//! Each painter samples random particles around the segment; counts scale
//! with segment length and the `density` setting, positions with the
//! scatter radius. Density or radius at zero paints nothing.

use super::{shade, SegmentFrame, StrokeSegment};
use crate::color::Rgba;
use crate::paint::PaintContext;
use crate::rng::StrokeRng;
use kurbo::{BezPath, Point, Rect, Vec2};
use std::f64::consts::TAU;

fn around(center: Point, angle: f64, radius: f64) -> Point {
    center + Vec2::from_angle(angle) * radius
}

fn particle_count(density: f64, length: f64, per_unit: f64) -> usize {
    (density * (1.0 + length / per_unit)).round() as usize
}

pub(super) fn spray(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let density = settings.density();
    let radius = settings.scatter_radius() * (segment.width / 4.0).max(0.5);
    if density <= 0.0 || radius <= 0.0 {
        return;
    }
    let frame = SegmentFrame::of(segment);
    let falloff = settings.alpha_falloff();
    for _ in 0..particle_count(density, frame.length, 12.0) {
        let center = frame.lerp(rng.next_f64());
        let r = radius * rng.next_f64().sqrt();
        let p = around(center, rng.next_f64() * TAU, r);
        let fade = (1.0 - (r / radius) * falloff).clamp(0.05, 1.0);
        let size = settings.particle_size() * (1.0 + rng.jitter(settings.size_jitter()));
        ctx.set_fill_color(segment.color.scale_alpha(fade));
        ctx.fill_circle(p, (size * 0.5).max(0.15));
    }
}

pub(super) fn sand(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let density = settings.density();
    if density <= 0.0 {
        return;
    }
    let frame = SegmentFrame::of(segment);
    let spread = settings.grain_spread().max(0.0);
    let stretch = settings.grain_stretch().max(0.3);
    ctx.set_line_width((settings.particle_size() * 0.45).max(0.2));
    for _ in 0..particle_count(density, frame.length, 10.0) {
        let root = frame.lerp(rng.next_f64()) + frame.normal * rng.jitter(spread);
        let grain = frame.dir * stretch + frame.normal * rng.jitter(0.6);
        ctx.set_stroke_color(
            shade(segment.color, rng.jitter(0.2)).scale_alpha(0.4 + rng.next_f64() * 0.6),
        );
        ctx.stroke_line(root, root + grain);
    }
}

pub(super) fn noise(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let density = settings.density();
    let radius = settings.scatter_radius();
    if density <= 0.0 || radius <= 0.0 {
        return;
    }
    let frame = SegmentFrame::of(segment);
    let speck_alpha = settings.speck_alpha();
    for _ in 0..particle_count(density * 2.0, frame.length, 8.0) {
        let center = frame.lerp(rng.next_f64());
        let p = center + Vec2::new(rng.jitter(radius), rng.jitter(radius));
        let size = (settings.particle_size() * (0.3 + rng.next_f64() * 0.7)).max(0.2);
        ctx.set_fill_color(
            segment
                .color
                .scale_alpha(speck_alpha * (0.3 + rng.next_f64() * 0.7)),
        );
        ctx.fill_rect(Rect::new(p.x, p.y, p.x + size, p.y + size));
    }
}

pub(super) fn pointillism(
    ctx: &mut dyn PaintContext,
    segment: &StrokeSegment<'_>,
    rng: &mut StrokeRng,
) {
    let settings = segment.settings;
    if settings.density() <= 0.0 {
        return;
    }
    let frame = SegmentFrame::of(segment);
    let spacing = settings.dot_spacing().max(0.5);
    let count = (frame.length / spacing).ceil() as usize + 1;
    for i in 0..count {
        let t = if count == 1 {
            0.0
        } else {
            i as f64 / (count - 1) as f64
        };
        let p = frame.lerp(t) + frame.normal * rng.jitter(spacing * 0.3);
        let r = (segment.width * 0.25 * (1.0 + rng.jitter(settings.size_jitter()))).max(0.3);
        ctx.set_fill_color(shade(segment.color, rng.jitter(0.25)).scale_alpha(0.85));
        ctx.fill_circle(p, r);
    }
}

pub(super) fn smoke(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let density = settings.density();
    if density <= 0.0 {
        return;
    }
    let frame = SegmentFrame::of(segment);
    let drift = settings.smoke_drift();
    let softness = settings.smoke_softness().clamp(0.0, 1.0);
    let puffs = ((density * 0.5).round() as usize).max(1);
    for _ in 0..puffs {
        let p = frame.lerp(rng.next_f64())
            + frame.normal * rng.jitter(drift * 2.0)
            + frame.dir * rng.jitter(drift);
        let r = (segment.width * (0.6 + rng.next_f64() * 1.4)).max(0.5);
        let alpha = (softness * 0.3 * (0.4 + rng.next_f64() * 0.6)).max(0.02);
        ctx.set_fill_color(shade(segment.color, 0.25).scale_alpha(alpha));
        ctx.fill_circle(p, r);
    }
}

pub(super) fn magic(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let density = settings.density();
    let radius = settings.scatter_radius();
    if density <= 0.0 || radius <= 0.0 {
        return;
    }
    let frame = SegmentFrame::of(segment);
    for _ in 0..particle_count(density * 0.75, frame.length, 12.0) {
        let center = frame.lerp(rng.next_f64());
        let p = around(center, rng.next_f64() * TAU, radius * rng.next_f64().sqrt());
        let sparkle = Rgba::hsl(rng.next_f64() * 360.0, 0.85, 0.65).scale_alpha(0.9);
        let size = (settings.particle_size() * (0.5 + rng.next_f64())).max(0.3);
        ctx.set_fill_color(sparkle);
        ctx.fill_circle(p, size * 0.5);
        if rng.chance(settings.sparkle_chance()) {
            let arm = size * 1.6;
            ctx.set_stroke_color(shade(sparkle, 0.7));
            ctx.set_line_width(0.6);
            ctx.stroke_line(p - Vec2::new(arm, 0.0), p + Vec2::new(arm, 0.0));
            ctx.stroke_line(p - Vec2::new(0.0, arm), p + Vec2::new(0.0, arm));
        }
    }
}

pub(super) fn glitter(
    ctx: &mut dyn PaintContext,
    segment: &StrokeSegment<'_>,
    rng: &mut StrokeRng,
) {
    let settings = segment.settings;
    let density = settings.density();
    let radius = settings.scatter_radius();
    if density <= 0.0 || radius <= 0.0 {
        return;
    }
    let frame = SegmentFrame::of(segment);
    for _ in 0..particle_count(density, frame.length, 10.0) {
        let center = frame.lerp(rng.next_f64());
        let p = around(center, rng.next_f64() * TAU, radius * rng.next_f64().sqrt());
        let size = (settings.particle_size() * (0.4 + rng.next_f64() * 0.8)).max(0.25);
        let fleck = if rng.chance(0.3) {
            shade(segment.color, 0.8)
        } else {
            shade(segment.color, rng.jitter(0.3))
        };
        let u = Vec2::from_angle(rng.next_f64() * TAU) * size;
        let v = Vec2::new(-u.y, u.x);
        let mut diamond = BezPath::new();
        diamond.move_to(p + u);
        diamond.line_to(p + v);
        diamond.line_to(p - u);
        diamond.line_to(p - v);
        diamond.close_path();
        ctx.set_fill_color(fleck.scale_alpha(0.5 + rng.next_f64() * 0.5));
        ctx.fill_path(&diamond);
        if rng.chance(settings.sparkle_chance()) {
            ctx.set_fill_color(Rgba::white().scale_alpha(0.85));
            ctx.fill_circle(p, size * 0.3);
        }
    }
}

pub(super) fn bubble(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let density = settings.density();
    if density <= 0.0 {
        return;
    }
    let frame = SegmentFrame::of(segment);
    let max_radius = settings.bubble_max_radius().max(0.5);
    let outline_alpha = settings.bubble_outline_alpha().clamp(0.0, 1.0);
    let count = ((density / 3.0).round() as usize).max(1);
    for _ in 0..count {
        let center = frame.lerp(rng.next_f64()) + frame.normal * rng.jitter(max_radius * 0.6);
        let r = rng.range(max_radius * 0.2, max_radius);
        ctx.set_fill_color(segment.color.scale_alpha(0.08));
        ctx.fill_circle(center, r);
        ctx.set_line_width((r * 0.15).clamp(0.4, 1.5));
        ctx.set_stroke_color(segment.color.scale_alpha(outline_alpha));
        ctx.stroke_circle(center, r);
        ctx.set_fill_color(Rgba::white().scale_alpha(0.7));
        ctx.fill_circle(center + Vec2::new(-r * 0.35, -r * 0.35), (r * 0.18).max(0.2));
    }
}

pub(super) fn confetti(
    ctx: &mut dyn PaintContext,
    segment: &StrokeSegment<'_>,
    rng: &mut StrokeRng,
) {
    let settings = segment.settings;
    let density = settings.density();
    let radius = settings.scatter_radius();
    if density <= 0.0 || radius <= 0.0 {
        return;
    }
    let frame = SegmentFrame::of(segment);
    let palette = settings.palette_colors();
    let size = settings.confetti_size();
    for _ in 0..particle_count(density * 0.6, frame.length, 10.0).max(1) {
        let center = frame.lerp(rng.next_f64());
        let p = around(center, rng.next_f64() * TAU, radius * rng.next_f64().sqrt());
        let color = rng.pick(&palette).copied().unwrap_or(segment.color);
        let u = Vec2::from_angle(rng.next_f64() * TAU) * (size * (0.6 + rng.next_f64() * 0.8));
        let v = Vec2::new(-u.y, u.x) * 0.55;
        let mut piece = BezPath::new();
        piece.move_to(p + u + v);
        piece.line_to(p + u - v);
        piece.line_to(p - u - v);
        piece.line_to(p - u + v);
        piece.close_path();
        ctx.set_fill_color(color.scale_alpha(0.9));
        ctx.fill_path(&piece);
    }
}
