//! Headless simulation with statistics output

use super::{build_engine, run_frames, SceneArgs};
use anyhow::Result;
use nebula_particles::EngineStats;
use nebula_render::{RecordingCanvas, SurfaceKind, SurfaceSet};
use nebula_runtime::EngineEvent;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// Running draw-call totals for one surface
#[derive(Debug, Default, Serialize)]
struct SurfaceReport {
    surface: &'static str,
    draw_calls: usize,
    clears: usize,
    last_frame_circles: usize,
}

impl SurfaceReport {
    fn new(kind: SurfaceKind) -> Self {
        Self {
            surface: kind.name(),
            ..Self::default()
        }
    }

    /// Fold in whatever the canvas recorded since the last call and empty it,
    /// so a long run holds at most one frame of commands
    fn absorb(&mut self, canvas: &mut RecordingCanvas) {
        if canvas.commands().is_empty() {
            return;
        }
        self.draw_calls += canvas.commands().len();
        self.clears += canvas.clear_count();
        self.last_frame_circles = canvas.last_frame_circles();
        canvas.take_commands();
    }
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    stats: EngineStats,
    surfaces: Vec<SurfaceReport>,
    events: Vec<EngineEvent>,
}

type Tally = (Rc<RefCell<RecordingCanvas>>, SurfaceReport);

fn absorb_all(tallies: &mut [Tally]) {
    for (canvas, report) in tallies.iter_mut() {
        report.absorb(&mut canvas.borrow_mut());
    }
}

pub fn run(args: &SceneArgs, format: &str) -> Result<()> {
    let mut tallies: Vec<Tally> = SurfaceKind::ALL
        .iter()
        .map(|&kind| (Rc::new(RefCell::new(RecordingCanvas::new())), SurfaceReport::new(kind)))
        .collect();
    let surfaces = SurfaceKind::ALL
        .iter()
        .zip(&tallies)
        .fold(SurfaceSet::new(), |set, (&kind, (canvas, _))| set.with(kind, canvas.clone()));

    let mut engine = build_engine(args, surfaces)?;
    // Anything drawn during initialization (a static frame under reduced motion)
    absorb_all(&mut tallies);
    run_frames(&mut engine, args, || absorb_all(&mut tallies));

    let report = SimulationReport {
        stats: engine.stats(),
        surfaces: tallies.into_iter().map(|(_, report)| report).collect(),
        events: engine.drain_events(),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text(&report),
    }
    Ok(())
}

fn print_text(report: &SimulationReport) {
    let stats = &report.stats;
    println!("Frames run: {} ({:.3}s)", stats.frame, stats.elapsed_secs);
    println!("Reduced motion: {}", stats.reduced_motion);
    println!("Still animating: {}", stats.animating);
    println!();
    println!("Particles:");
    println!("  ambient: {}", stats.ambient_particles);
    println!("  sink:    {}", stats.sink_particles);
    println!("  burst:   {}", stats.burst_particles);
    println!();
    println!("Surfaces:");
    for s in &report.surfaces {
        println!(
            "  {:<8} {} draw calls, {} clears, {} circles in last frame",
            s.surface, s.draw_calls, s.clears, s.last_frame_circles
        );
    }
    if !report.events.is_empty() || stats.events_dropped > 0 {
        println!();
        println!("Events ({} dropped):", stats.events_dropped);
        for event in &report.events {
            println!("  {:?}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::{Color, Rect, Vec2};
    use nebula_render::{BlendMode, Canvas};

    fn frame(canvas: &mut RecordingCanvas, circles: usize) {
        canvas.clear(Rect::from_size(10.0, 10.0));
        for _ in 0..circles {
            canvas.fill_circle(Vec2::ZERO, 1.0, Color::WHITE, BlendMode::Lighter);
        }
    }

    #[test]
    fn absorb_totals_frames_and_empties_the_log() {
        let mut canvas = RecordingCanvas::new();
        let mut report = SurfaceReport::new(SurfaceKind::Burst);

        frame(&mut canvas, 3);
        report.absorb(&mut canvas);
        assert!(canvas.commands().is_empty());

        frame(&mut canvas, 2);
        report.absorb(&mut canvas);
        assert_eq!(report.draw_calls, 7);
        assert_eq!(report.clears, 2);
        assert_eq!(report.last_frame_circles, 2);
    }

    #[test]
    fn idle_frame_keeps_last_frame_count() {
        let mut canvas = RecordingCanvas::new();
        let mut report = SurfaceReport::new(SurfaceKind::Ambient);
        frame(&mut canvas, 4);
        report.absorb(&mut canvas);
        // Nothing drawn this frame
        report.absorb(&mut canvas);
        assert_eq!(report.last_frame_circles, 4);
        assert_eq!(report.surface, "ambient");
    }
}
