//! CLI command implementations

pub mod render;
pub mod simulate;

use anyhow::{Context, Result};
use clap::Args;
use nebula_core::{Vec2, Viewport};
use nebula_particles::{BackdropEngine, EngineConfig};
use nebula_render::SurfaceSet;

/// Flags shared by every command that drives a scene
#[derive(Args, Debug, Clone)]
pub struct SceneArgs {
    /// Number of frames to run
    #[arg(long, default_value = "240")]
    pub frames: u32,

    /// Viewport width in logical pixels
    #[arg(long, default_value = "1280")]
    pub width: f32,

    /// Viewport height in logical pixels
    #[arg(long, default_value = "720")]
    pub height: f32,

    /// Device pixel ratio
    #[arg(long, default_value = "1")]
    pub dpr: f32,

    /// Start with reduced motion requested
    #[arg(long)]
    pub reduced_motion: bool,

    /// Fire a burst before this frame (repeatable)
    #[arg(long = "burst-at")]
    pub burst_at: Vec<u32>,

    /// Pointer position in viewport coordinates (comma-separated x,y)
    #[arg(long, value_parser = parse_vec2)]
    pub pointer: Option<Vec2>,

    /// Engine configuration file (TOML)
    #[arg(long)]
    pub config: Option<String>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u32>,
}

impl SceneArgs {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height, self.dpr)
    }
}

fn parse_vec2(s: &str) -> Result<Vec2, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("expected 2 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    Ok(Vec2::new(x, y))
}

/// Build an engine over `surfaces` from the scene flags
pub fn build_engine(args: &SceneArgs, surfaces: SurfaceSet) -> Result<BackdropEngine> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load engine config '{}'", path))?,
        None => EngineConfig::default(),
    };
    let viewport = args.viewport();
    let engine = match args.seed {
        Some(seed) => BackdropEngine::initialize_seeded(
            surfaces,
            viewport,
            args.reduced_motion,
            config,
            seed,
        ),
        None => BackdropEngine::initialize(surfaces, viewport, args.reduced_motion, config),
    }
    .context("Failed to initialize backdrop engine")?;
    Ok(engine)
}

/// Run `args.frames` frames, firing bursts and moving the pointer as asked.
/// `after_frame` runs once after every frame.
pub fn run_frames(engine: &mut BackdropEngine, args: &SceneArgs, mut after_frame: impl FnMut()) {
    if let Some(pointer) = args.pointer {
        engine.update_pointer(pointer.x, pointer.y);
    }
    for frame in 0..args.frames {
        if args.burst_at.contains(&frame) {
            engine.trigger();
        }
        engine.tick();
        after_frame();
    }
}
