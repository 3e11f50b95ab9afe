//! Inkwash Engine Library
//!
//! Platform-agnostic drawing core for the Inkwash canvas: viewport
//! transforms and gestures, procedural brushes, stroke sessions, and
//! snapshot history.

pub mod brush;
pub mod color;
pub mod history;
pub mod input;
pub mod paint;
pub mod rng;
pub mod settings;
pub mod stroke;
pub mod trace;
pub mod viewport;

pub use brush::{paint_segment, resolve_style, BrushKind, BrushStyle, StrokeSegment, UnknownBrush};
pub use color::{ColorParseError, Rgba};
pub use history::History;
pub use input::{Modifiers, PointerEvent, PointerId, WheelEvent};
pub use paint::{CompositeMode, Glow, LineCap, LineJoin, PaintContext, PaintSurface, RasterImage};
pub use rng::StrokeRng;
pub use settings::BrushSettings;
pub use stroke::{SessionTool, StrokeSession};
pub use trace::{PaintOp, TraceContext};
pub use viewport::{Transform, ViewportConfig, ViewportController, ViewportMetrics};
