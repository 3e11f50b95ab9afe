//! Headless script replay host.
//!
//! Reads a JSON scene script, replays its acts through a
//! [`ViewportController`] and [`StrokeSession`] over a raster surface, and
//! writes the resulting snapshot as a PNG. Stroke points are given in
//! screen space, so transform acts change where later strokes land exactly
//! as live pointer input would.

use anyhow::{Context, Result};
use clap::Parser;
use inkwash_engine::{
    BrushKind, BrushSettings, PaintSurface, Rgba, SessionTool, StrokeSession, ViewportConfig,
    ViewportController, ViewportMetrics,
};
use inkwash_raster::{encode_png, from_data_url, SkiaSurface};
use kurbo::{Point, Vec2};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Replay a JSON stroke script into a PNG")]
struct Arguments {
    /// Scene script to replay.
    #[arg(long, short = 's')]
    script: PathBuf,
    /// Output PNG path.
    #[arg(long, short = 'o', default_value = "inkwash.png")]
    out: PathBuf,
    /// Seed for the brush randomness stream.
    #[arg(long, default_value_t = 7)]
    seed: u32,
}

#[derive(Debug, Deserialize)]
struct Script {
    width: u32,
    height: u32,
    /// Background fill, hex color. Transparent when absent.
    #[serde(default)]
    background: Option<String>,
    /// Data URL of an image to load beneath the strokes.
    #[serde(default)]
    base_image: Option<String>,
    /// Milliseconds on the brush clock, for the hue-cycling brushes.
    #[serde(default)]
    clock_ms: f64,
    #[serde(default)]
    acts: Vec<Act>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum Act {
    Stroke {
        brush: BrushKind,
        color: String,
        width: f64,
        points: Vec<[f64; 2]>,
        #[serde(default)]
        settings: BrushSettings,
    },
    Erase {
        width: f64,
        points: Vec<[f64; 2]>,
    },
    Zoom {
        scale: f64,
        #[serde(default)]
        center: Option<[f64; 2]>,
    },
    Pan {
        dx: f64,
        dy: f64,
    },
    Reset,
    ViewUndo,
    ViewRedo,
    Undo,
    Redo,
    Clear {
        #[serde(default)]
        color: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let arguments = Arguments::parse();

    let text = fs::read_to_string(&arguments.script)
        .with_context(|| format!("read script {}", arguments.script.display()))?;
    let script: Script = serde_json::from_str(&text).context("parse script")?;

    let image = render_script(&script, arguments.seed)?;
    let png = encode_png(&image)?;
    fs::write(&arguments.out, &png)
        .with_context(|| format!("write {}", arguments.out.display()))?;

    log::info!(
        "Rendered {} acts to {}",
        script.acts.len(),
        arguments.out.display()
    );
    Ok(())
}

fn render_script(script: &Script, seed: u32) -> Result<inkwash_engine::RasterImage> {
    let mut surface = SkiaSurface::new(script.width, script.height)?;
    let mut viewport = ViewportController::new(ViewportConfig::default());
    viewport.set_metrics(ViewportMetrics::one_to_one(script.width, script.height));

    let mut session = StrokeSession::new(script.width, script.height);
    session.reseed(seed);
    session.override_clock_ms(script.clock_ms);

    if let Some(hex) = &script.background {
        session.clear(&mut surface, parse_color(hex));
    }
    if let Some(url) = &script.base_image {
        let image = from_data_url(url)?;
        session.load_image(&mut surface, &image);
    }

    for act in &script.acts {
        apply_act(act, &mut session, &mut surface, &mut viewport);
    }
    Ok(surface.snapshot())
}

fn apply_act(
    act: &Act,
    session: &mut StrokeSession,
    surface: &mut SkiaSurface,
    viewport: &mut ViewportController,
) {
    match act {
        Act::Stroke {
            brush,
            color,
            width,
            points,
            settings,
        } => {
            session.set_tool(SessionTool::Brush(*brush));
            session.set_color(parse_color(color));
            session.set_width(*width);
            session.set_settings(settings.clone());
            replay_polyline(session, surface, viewport, points);
        }
        Act::Erase { width, points } => {
            session.set_tool(SessionTool::Eraser);
            session.set_width(*width);
            replay_polyline(session, surface, viewport, points);
        }
        Act::Zoom { scale, center } => {
            let anchor = (*center).map(|[x, y]| Point::new(x, y));
            viewport.set_scale(*scale, anchor);
        }
        Act::Pan { dx, dy } => viewport.pan_by(Vec2::new(*dx, *dy)),
        Act::Reset => viewport.reset_transform(),
        Act::ViewUndo => {
            if !viewport.undo_transform() {
                log::debug!("View undo ignored at history start");
            }
        }
        Act::ViewRedo => {
            if !viewport.redo_transform() {
                log::debug!("View redo ignored at history end");
            }
        }
        Act::Undo => {
            if !session.undo(surface) {
                log::debug!("Undo ignored at history start");
            }
        }
        Act::Redo => {
            if !session.redo(surface) {
                log::debug!("Redo ignored at history end");
            }
        }
        Act::Clear { color } => {
            let color = color
                .as_deref()
                .map(parse_color)
                .unwrap_or(Rgba::transparent());
            session.clear(surface, color);
        }
    }
}

fn replay_polyline(
    session: &mut StrokeSession,
    surface: &mut SkiaSurface,
    viewport: &ViewportController,
    points: &[[f64; 2]],
) {
    let mut points = points.iter().map(|[x, y]| Point::new(*x, *y));
    let Some(first) = points.next() else {
        return;
    };
    session.pointer_down(surface, viewport, first);
    for point in points {
        session.pointer_move(surface, viewport, point);
    }
    session.pointer_up(surface);
}

fn parse_color(hex: &str) -> Rgba {
    match Rgba::from_hex(hex) {
        Ok(color) => color,
        Err(e) => {
            log::warn!("Bad color {hex:?} in script ({e}), using black");
            Rgba::black()
        }
    }
}
