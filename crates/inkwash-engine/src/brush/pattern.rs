//! Quantized-geometry painters: grid-snapped cells, evenly spaced dots,
//! and a sine displacement of the segment spine.

use super::{shade, SegmentFrame, StrokeSegment};
use crate::paint::PaintContext;
use crate::rng::StrokeRng;
use kurbo::{BezPath, Rect};
use std::f64::consts::TAU;

fn cell_of(x: f64, y: f64, size: f64) -> (i64, i64) {
    ((x / size).floor() as i64, (y / size).floor() as i64)
}

pub(super) fn pixel(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>) {
    let size = segment.settings.pixel_size().max(1.0);
    let frame = SegmentFrame::of(segment);
    let steps = (frame.length / (size * 0.5)).ceil() as usize + 1;
    let mut last = None;
    ctx.set_fill_color(segment.color);
    for i in 0..steps {
        let t = if steps == 1 {
            0.0
        } else {
            i as f64 / (steps - 1) as f64
        };
        let p = frame.lerp(t);
        let cell = cell_of(p.x, p.y, size);
        if last == Some(cell) {
            continue;
        }
        last = Some(cell);
        let x = cell.0 as f64 * size;
        let y = cell.1 as f64 * size;
        ctx.fill_rect(Rect::new(x, y, x + size, y + size));
    }
}

pub(super) fn mosaic(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>, rng: &mut StrokeRng) {
    let settings = segment.settings;
    let size = settings.cell_size().max(1.0);
    let inset = settings.grout().clamp(0.0, size * 0.45) * 0.5;
    let jitter = settings.color_jitter();
    let frame = SegmentFrame::of(segment);
    let steps = (frame.length / (size * 0.5)).ceil() as usize + 1;
    let mut last = None;
    for i in 0..steps {
        let t = if steps == 1 {
            0.0
        } else {
            i as f64 / (steps - 1) as f64
        };
        let p = frame.lerp(t);
        let cell = cell_of(p.x, p.y, size);
        if last == Some(cell) {
            continue;
        }
        last = Some(cell);
        let x = cell.0 as f64 * size;
        let y = cell.1 as f64 * size;
        ctx.set_fill_color(shade(segment.color, rng.jitter(jitter)));
        ctx.fill_rect(Rect::new(
            x + inset,
            y + inset,
            x + size - inset,
            y + size - inset,
        ));
    }
}

pub(super) fn dotted(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>) {
    let settings = segment.settings;
    let gap = settings.dot_gap().max(0.5);
    let radius = settings.dot_radius().max(0.2);
    let frame = SegmentFrame::of(segment);
    let count = (frame.length / gap).floor() as usize + 1;
    ctx.set_fill_color(segment.color);
    for i in 0..count {
        ctx.fill_circle(frame.from + frame.dir * (i as f64 * gap), radius);
    }
}

pub(super) fn wave(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>) {
    let settings = segment.settings;
    let amplitude = settings.wave_amplitude();
    let frequency = settings.wave_frequency();
    let frame = SegmentFrame::of(segment);
    let steps = ((frame.length / 2.0).ceil() as usize).max(2);
    // phase keyed to absolute position so adjoining segments line up
    let base = frame.from.x + frame.from.y;
    let mut path = BezPath::new();
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let phase = (base + t * frame.length) * frequency * TAU;
        let p = frame.lerp(t) + frame.normal * (phase.sin() * amplitude);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    ctx.stroke_path(&path);
}
