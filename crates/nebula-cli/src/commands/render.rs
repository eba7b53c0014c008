//! Headless backdrop-to-PNG render command

use super::{build_engine, run_frames, SceneArgs};
use anyhow::{Context, Result};
use nebula_core::Rect;
use nebula_render::{composite_layers, save_image, RasterCanvas, SurfaceKind, SurfaceSet};
use std::cell::RefCell;
use std::rc::Rc;

pub fn run(args: &SceneArgs, output: &str) -> Result<()> {
    let ambient = Rc::new(RefCell::new(RasterCanvas::new()));
    let sink = Rc::new(RefCell::new(RasterCanvas::new()));
    let burst = Rc::new(RefCell::new(RasterCanvas::new()));
    let surfaces = SurfaceSet::new()
        .with(SurfaceKind::Ambient, ambient.clone())
        .with(SurfaceKind::Sink, sink.clone())
        .with(SurfaceKind::Burst, burst.clone());

    let mut engine = build_engine(args, surfaces)?;
    run_frames(&mut engine, args, || {});

    // Composite in device pixels: ambient bottom, sink at its placement, burst on top
    let viewport = engine.viewport();
    let ratio = viewport.device_pixel_ratio;
    let width = (viewport.width * ratio) as u32;
    let height = (viewport.height * ratio) as u32;
    let full = Rect::from_size(width as f32, height as f32);
    let placement = engine.sink_placement();
    let sink_rect = Rect::new(
        placement.x * ratio,
        placement.y * ratio,
        placement.width * ratio,
        placement.height * ratio,
    );

    let (ambient, sink, burst) = (ambient.borrow(), sink.borrow(), burst.borrow());
    let image = composite_layers(
        width,
        height,
        &[
            (ambient.image(), full),
            (sink.image(), sink_rect),
            (burst.image(), full),
        ],
    );
    save_image(&image, output).with_context(|| format!("Failed to save image to '{}'", output))?;

    let stats = engine.stats();
    println!("Rendered {} frames to {} ({}x{})", stats.frame, output, width, height);
    println!(
        "Particles: {} ambient, {} sink, {} burst",
        stats.ambient_particles, stats.sink_particles, stats.burst_particles
    );
    Ok(())
}
