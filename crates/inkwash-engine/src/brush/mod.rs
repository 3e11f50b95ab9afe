//! Procedural brush catalog.
//!
//! Every brush is a pure per-segment painter: [`resolve_style`] configures
//! the paint context from a per-kind table, then [`paint_segment`] runs the
//! kind's algorithm against the current/previous pointer pair. Painters hold
//! no state of their own; variation comes from the caller's [`StrokeRng`]
//! and the caller-tracked previous point.
//!
//! Most kinds paint custom geometry and return `true`. The plain kinds
//! (`basic`, `round`, `flat`, `marker`, `highlighter`, `soft`) return
//! `false`, telling the caller to stroke an ordinary line with the style
//! already applied.

use crate::color::Rgba;
use crate::paint::{Glow, LineCap, LineJoin, PaintContext};
use crate::rng::StrokeRng;
use crate::settings::BrushSettings;
use kurbo::{Point, Vec2};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod bristle;
mod fractal;
mod glow;
mod pattern;
mod rainbow;
mod scatter;

/// A named painting algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BrushKind {
    #[default]
    Basic,
    Round,
    Flat,
    Marker,
    Highlighter,
    Soft,
    Spray,
    Sand,
    Noise,
    Pointillism,
    Smoke,
    Magic,
    Glitter,
    Bubble,
    Confetti,
    Calligraphy,
    Brush,
    Ink,
    Watercolor,
    Pencil,
    Pen,
    Chalk,
    Charcoal,
    Crayon,
    Fur,
    Grass,
    Electric,
    Lightning,
    Rainbow,
    Neon,
    Star,
    Meteor,
    Pixel,
    Mosaic,
    Dotted,
    Wave,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown brush id: {0}")]
pub struct UnknownBrush(pub String);

impl BrushKind {
    pub const ALL: [BrushKind; 36] = [
        BrushKind::Basic,
        BrushKind::Round,
        BrushKind::Flat,
        BrushKind::Marker,
        BrushKind::Highlighter,
        BrushKind::Soft,
        BrushKind::Spray,
        BrushKind::Sand,
        BrushKind::Noise,
        BrushKind::Pointillism,
        BrushKind::Smoke,
        BrushKind::Magic,
        BrushKind::Glitter,
        BrushKind::Bubble,
        BrushKind::Confetti,
        BrushKind::Calligraphy,
        BrushKind::Brush,
        BrushKind::Ink,
        BrushKind::Watercolor,
        BrushKind::Pencil,
        BrushKind::Pen,
        BrushKind::Chalk,
        BrushKind::Charcoal,
        BrushKind::Crayon,
        BrushKind::Fur,
        BrushKind::Grass,
        BrushKind::Electric,
        BrushKind::Lightning,
        BrushKind::Rainbow,
        BrushKind::Neon,
        BrushKind::Star,
        BrushKind::Meteor,
        BrushKind::Pixel,
        BrushKind::Mosaic,
        BrushKind::Dotted,
        BrushKind::Wave,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BrushKind::Basic => "basic",
            BrushKind::Round => "round",
            BrushKind::Flat => "flat",
            BrushKind::Marker => "marker",
            BrushKind::Highlighter => "highlighter",
            BrushKind::Soft => "soft",
            BrushKind::Spray => "spray",
            BrushKind::Sand => "sand",
            BrushKind::Noise => "noise",
            BrushKind::Pointillism => "pointillism",
            BrushKind::Smoke => "smoke",
            BrushKind::Magic => "magic",
            BrushKind::Glitter => "glitter",
            BrushKind::Bubble => "bubble",
            BrushKind::Confetti => "confetti",
            BrushKind::Calligraphy => "calligraphy",
            BrushKind::Brush => "brush",
            BrushKind::Ink => "ink",
            BrushKind::Watercolor => "watercolor",
            BrushKind::Pencil => "pencil",
            BrushKind::Pen => "pen",
            BrushKind::Chalk => "chalk",
            BrushKind::Charcoal => "charcoal",
            BrushKind::Crayon => "crayon",
            BrushKind::Fur => "fur",
            BrushKind::Grass => "grass",
            BrushKind::Electric => "electric",
            BrushKind::Lightning => "lightning",
            BrushKind::Rainbow => "rainbow",
            BrushKind::Neon => "neon",
            BrushKind::Star => "star",
            BrushKind::Meteor => "meteor",
            BrushKind::Pixel => "pixel",
            BrushKind::Mosaic => "mosaic",
            BrushKind::Dotted => "dotted",
            BrushKind::Wave => "wave",
        }
    }

    /// Parse a brush id, falling back to [`BrushKind::Basic`] with a logged
    /// warning when the id is not in the catalog.
    pub fn parse_lossy(id: &str) -> BrushKind {
        match id.parse() {
            Ok(kind) => kind,
            Err(_) => {
                log::warn!("unknown brush id {id:?}, using basic");
                BrushKind::Basic
            }
        }
    }
}

impl fmt::Display for BrushKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrushKind {
    type Err = UnknownBrush;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BrushKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownBrush(s.to_owned()))
    }
}

impl Serialize for BrushKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BrushKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = BrushKind;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a brush id string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<BrushKind, E> {
                Ok(BrushKind::parse_lossy(value))
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

/// One pointer interval handed to the painters.
#[derive(Debug, Clone, Copy)]
pub struct StrokeSegment<'a> {
    pub from: Point,
    pub to: Point,
    pub brush: BrushKind,
    pub settings: &'a BrushSettings,
    pub color: Rgba,
    pub width: f64,
    /// Milliseconds since the session opened, for time-cycling brushes.
    pub clock_ms: f64,
}

/// Resolved paint-context attributes for one brush kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushStyle {
    pub color: Rgba,
    pub alpha: f64,
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub glow: Option<Glow>,
}

impl BrushStyle {
    pub fn apply(&self, ctx: &mut dyn PaintContext) {
        ctx.set_stroke_color(self.color);
        ctx.set_fill_color(self.color);
        ctx.set_line_width(self.width);
        ctx.set_line_cap(self.cap);
        ctx.set_line_join(self.join);
        ctx.set_alpha(self.alpha);
        ctx.set_glow(self.glow);
    }
}

/// Look up the style attributes for `brush`: alpha, stroke width, cap/join,
/// and glow. Pure table lookup, never fails.
pub fn resolve_style(
    brush: BrushKind,
    settings: &BrushSettings,
    color: Rgba,
    width: f64,
) -> BrushStyle {
    let width = width.max(0.1);
    let opacity = settings.opacity().clamp(0.0, 1.0);
    let glow_radius = settings.glow_radius();
    let strength = settings.glow_strength();

    let (alpha, width_factor, cap, join, glow) = match brush {
        BrushKind::Basic | BrushKind::Round => {
            (1.0, 1.0, LineCap::Round, LineJoin::Round, None)
        }
        BrushKind::Flat => (1.0, 1.0, LineCap::Butt, LineJoin::Bevel, None),
        BrushKind::Marker => (0.85, 1.0, LineCap::Square, LineJoin::Miter, None),
        BrushKind::Highlighter => (0.35, 2.0, LineCap::Butt, LineJoin::Round, None),
        BrushKind::Soft => (
            0.3,
            1.4,
            LineCap::Round,
            LineJoin::Round,
            Some(Glow::new(width * 0.8, color.scale_alpha(0.5))),
        ),
        BrushKind::Spray
        | BrushKind::Sand
        | BrushKind::Noise
        | BrushKind::Pointillism
        | BrushKind::Smoke
        | BrushKind::Glitter
        | BrushKind::Bubble
        | BrushKind::Confetti => (1.0, 1.0, LineCap::Round, LineJoin::Round, None),
        BrushKind::Magic => (
            0.9,
            1.0,
            LineCap::Round,
            LineJoin::Round,
            Some(Glow::new(glow_radius * 0.6, color.scale_alpha(0.8))),
        ),
        BrushKind::Calligraphy => (1.0, 1.0, LineCap::Butt, LineJoin::Miter, None),
        BrushKind::Brush => (1.0, 1.0, LineCap::Round, LineJoin::Round, None),
        BrushKind::Ink => (1.0, 1.0, LineCap::Round, LineJoin::Round, None),
        BrushKind::Watercolor => (0.5, 1.0, LineCap::Round, LineJoin::Round, None),
        BrushKind::Pencil => (0.8, 0.7, LineCap::Round, LineJoin::Round, None),
        BrushKind::Pen => (1.0, 0.8, LineCap::Round, LineJoin::Round, None),
        BrushKind::Chalk => (0.7, 1.0, LineCap::Butt, LineJoin::Bevel, None),
        BrushKind::Charcoal => (0.75, 1.2, LineCap::Butt, LineJoin::Round, None),
        BrushKind::Crayon => (0.9, 1.0, LineCap::Round, LineJoin::Round, None),
        BrushKind::Fur => (0.85, 0.35, LineCap::Round, LineJoin::Round, None),
        BrushKind::Grass => (0.9, 0.3, LineCap::Round, LineJoin::Round, None),
        BrushKind::Electric => (
            1.0,
            0.45,
            LineCap::Round,
            LineJoin::Round,
            Some(Glow::new(glow_radius * 0.8, color.scale_alpha(0.9))),
        ),
        BrushKind::Lightning => (
            1.0,
            0.55,
            LineCap::Round,
            LineJoin::Bevel,
            Some(Glow::new(glow_radius * 0.4, color.scale_alpha(0.7))),
        ),
        BrushKind::Rainbow => (1.0, 1.0, LineCap::Round, LineJoin::Round, None),
        BrushKind::Neon => (
            1.0,
            1.0,
            LineCap::Round,
            LineJoin::Round,
            Some(Glow::new(glow_radius * strength, color)),
        ),
        BrushKind::Star => (
            1.0,
            0.5,
            LineCap::Round,
            LineJoin::Round,
            Some(Glow::new(glow_radius * 0.5, color.scale_alpha(0.8))),
        ),
        BrushKind::Meteor => (
            1.0,
            0.8,
            LineCap::Round,
            LineJoin::Round,
            Some(Glow::new(glow_radius * 0.7, color.scale_alpha(0.9))),
        ),
        BrushKind::Pixel => (1.0, 1.0, LineCap::Butt, LineJoin::Miter, None),
        BrushKind::Mosaic => (1.0, 1.0, LineCap::Butt, LineJoin::Miter, None),
        BrushKind::Dotted => (1.0, 1.0, LineCap::Round, LineJoin::Round, None),
        BrushKind::Wave => (1.0, 0.8, LineCap::Round, LineJoin::Round, None),
    };

    BrushStyle {
        color,
        alpha: alpha * opacity,
        width: width * width_factor,
        cap,
        join,
        glow,
    }
}

/// Paint one segment with the segment's brush. Returns `true` when the
/// brush painted its own geometry, `false` when the caller should stroke a
/// plain line instead. The paint context's compositing mode is left alone.
pub fn paint_segment(
    ctx: &mut dyn PaintContext,
    segment: &StrokeSegment<'_>,
    rng: &mut StrokeRng,
) -> bool {
    match segment.brush {
        BrushKind::Basic
        | BrushKind::Round
        | BrushKind::Flat
        | BrushKind::Marker
        | BrushKind::Highlighter
        | BrushKind::Soft => return false,
        BrushKind::Spray => scatter::spray(ctx, segment, rng),
        BrushKind::Sand => scatter::sand(ctx, segment, rng),
        BrushKind::Noise => scatter::noise(ctx, segment, rng),
        BrushKind::Pointillism => scatter::pointillism(ctx, segment, rng),
        BrushKind::Smoke => scatter::smoke(ctx, segment, rng),
        BrushKind::Magic => scatter::magic(ctx, segment, rng),
        BrushKind::Glitter => scatter::glitter(ctx, segment, rng),
        BrushKind::Bubble => scatter::bubble(ctx, segment, rng),
        BrushKind::Confetti => scatter::confetti(ctx, segment, rng),
        BrushKind::Calligraphy => bristle::calligraphy(ctx, segment, rng),
        BrushKind::Brush => bristle::brush(ctx, segment, rng),
        BrushKind::Ink => bristle::ink(ctx, segment, rng),
        BrushKind::Watercolor => bristle::watercolor(ctx, segment, rng),
        BrushKind::Pencil => bristle::pencil(ctx, segment, rng),
        BrushKind::Pen => bristle::pen(ctx, segment, rng),
        BrushKind::Chalk => bristle::chalk(ctx, segment, rng),
        BrushKind::Charcoal => bristle::charcoal(ctx, segment, rng),
        BrushKind::Crayon => bristle::crayon(ctx, segment, rng),
        BrushKind::Fur => bristle::fur(ctx, segment, rng),
        BrushKind::Grass => bristle::grass(ctx, segment, rng),
        BrushKind::Electric => fractal::electric(ctx, segment, rng),
        BrushKind::Lightning => fractal::lightning(ctx, segment, rng),
        BrushKind::Rainbow => rainbow::paint(ctx, segment),
        BrushKind::Neon => glow::neon(ctx, segment, rng),
        BrushKind::Star => glow::star(ctx, segment, rng),
        BrushKind::Meteor => glow::meteor(ctx, segment, rng),
        BrushKind::Pixel => pattern::pixel(ctx, segment),
        BrushKind::Mosaic => pattern::mosaic(ctx, segment, rng),
        BrushKind::Dotted => pattern::dotted(ctx, segment),
        BrushKind::Wave => pattern::wave(ctx, segment),
    }
    true
}

/// Direction frame for one segment. Degenerate segments get a unit x-axis
/// direction so perpendicular math stays finite.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SegmentFrame {
    pub from: Point,
    pub to: Point,
    pub length: f64,
    pub dir: Vec2,
    pub normal: Vec2,
}

impl SegmentFrame {
    pub fn of(segment: &StrokeSegment<'_>) -> Self {
        let v = segment.to - segment.from;
        let length = v.hypot();
        let dir = if length > 0.0 {
            v / length
        } else {
            Vec2::new(1.0, 0.0)
        };
        Self {
            from: segment.from,
            to: segment.to,
            length,
            dir,
            normal: Vec2::new(-dir.y, dir.x),
        }
    }

    pub fn lerp(&self, t: f64) -> Point {
        self.from.lerp(self.to, t)
    }
}

/// Mix a color toward white (`amount` > 0) or black (`amount` < 0).
pub(crate) fn shade(color: Rgba, amount: f64) -> Rgba {
    let t = amount.abs().clamp(0.0, 1.0);
    let target = if amount >= 0.0 { 255.0 } else { 0.0 };
    let mix = |c: u8| (c as f64 + (target - c as f64) * t).round() as u8;
    Rgba::new(mix(color.r), mix(color.g), mix(color.b), color.a)
}
