//! Hue-cycling painter. The hue advances with the session clock and drifts
//! with position, so a slow stroke cycles in place and a fast one stripes
//! along its path. No state is carried between segments.

use super::{SegmentFrame, StrokeSegment};
use crate::color::Rgba;
use crate::paint::PaintContext;

pub(super) fn paint(ctx: &mut dyn PaintContext, segment: &StrokeSegment<'_>) {
    let settings = segment.settings;
    let frame = SegmentFrame::of(segment);
    let period = settings.hue_period_ms().max(1.0);
    let drift = (segment.to.x + segment.to.y) * settings.hue_distance_scale();
    let hue = segment.clock_ms / period * 360.0 + drift;
    let color = Rgba::hsl(
        hue,
        settings.rainbow_saturation(),
        settings.rainbow_lightness(),
    );
    ctx.set_stroke_color(color);
    ctx.set_line_width(segment.width.max(0.3));
    ctx.stroke_line(frame.from, frame.to);
}
