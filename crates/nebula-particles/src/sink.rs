//! Radial sink: particles spiral from an outer ring into an absorption
//! radius, spun faster near the pointer.
//!
//! The sink lives in a fixed 400x400 logical frame centered on (200, 200).
//! Particles are stored in polar form; the Cartesian position is derived
//! after every angular update. Distance only ever decreases: the pointer
//! adds angular impulse, never radial motion.

use crate::config::SinkConfig;
use crate::particle::ParticlePool;
use crate::rand::ParticleRng;
use nebula_core::{Color, Vec2};
use nebula_render::{BlendMode, Surface, SINK_LOGICAL_SIZE};
use nebula_runtime::{FrameContext, FrameSystem};

/// Center of the sink's logical frame; also the reference radius for spin
const CENTER: f32 = SINK_LOGICAL_SIZE / 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SinkParticle {
    pub angle: f32,
    pub distance: f32,
    /// Derived from (angle, distance)
    pub position: Vec2,
    pub speed: f32,
    pub size: f32,
    /// Warm or cool template; alpha is filled in per frame
    pub tint: Color,
}

impl SinkParticle {
    fn sync_position(&mut self) {
        self.position = RadialSink::center() + Vec2::from_angle(self.angle) * self.distance;
    }
}

pub struct RadialSink {
    config: SinkConfig,
    pool: ParticlePool<SinkParticle>,
    rng: ParticleRng,
    active: bool,
}

impl RadialSink {
    pub fn new(config: SinkConfig, rng: ParticleRng) -> Self {
        let pool = ParticlePool::new(config.max_particles);
        Self {
            config,
            pool,
            rng,
            active: false,
        }
    }

    pub fn center() -> Vec2 {
        Vec2::new(CENTER, CENTER)
    }

    pub fn particles(&self) -> &[SinkParticle] {
        self.pool.alive_slice()
    }

    pub fn resume(&mut self) {
        self.active = true;
    }

    /// Clear the surface once and stop. Particles stay where they are.
    pub fn suspend(&mut self, surface: &mut Surface) {
        self.active = false;
        surface.clear_all();
    }

    fn spawn_particle(&mut self) {
        let c = &self.config;
        let angle = self.rng.angle();
        let distance = self.rng.range(c.spawn_distance_min, c.spawn_distance_max);
        let speed = self.rng.range(c.speed_min, c.speed_max);
        let size = self.rng.range(c.size_min, c.size_max);
        let tint = if self.rng.chance(0.5) {
            Color::from_rgb8(255.0, self.rng.range(150.0, 250.0), 50.0)
        } else {
            Color::from_rgb8(self.rng.range(200.0, 255.0), self.rng.range(200.0, 255.0), 255.0)
        };
        let mut particle = SinkParticle {
            angle,
            distance,
            position: Vec2::ZERO,
            speed,
            size,
            tint,
        };
        particle.sync_position();
        self.pool.spawn(particle);
    }

    /// Base spin plus a term that grows as the particle falls inward
    pub fn spin_rate(&self, distance: f32) -> f32 {
        spin_rate(&self.config, distance)
    }

    /// Extra angular velocity from pointer proximity; zero outside the lens
    pub fn lensing_impulse(&self, position: Vec2, pointer: Vec2) -> f32 {
        lensing_impulse(&self.config, position, pointer)
    }

    /// Advance one frame. `pointer` is already in the sink's logical frame.
    pub fn step(&mut self, pointer: Vec2) {
        if !self.pool.is_full() && self.rng.chance(self.config.spawn_chance) {
            self.spawn_particle();
        }

        let config = &self.config;
        self.pool.update_and_compact(|p| {
            p.distance -= p.speed;
            p.angle += spin_rate(config, p.distance);
            // Lensing is measured against last frame's position
            p.angle += lensing_impulse(config, p.position, pointer);
            p.sync_position();
            p.distance >= config.absorb_radius
        });
    }

    pub fn draw(&self, surface: &mut Surface) {
        let c = &self.config;
        let canvas = surface.canvas_mut();
        for p in self.pool.alive_slice() {
            let fade = ((p.distance - c.absorb_radius) / c.fade_distance).min(1.0);
            let radius = p.size * c.glow_scale * (p.distance / CENTER);
            canvas.fill_circle(p.position, radius, p.tint.with_alpha(fade), BlendMode::Screen);
        }
    }
}

fn spin_rate(config: &SinkConfig, distance: f32) -> f32 {
    config.base_spin + (CENTER - distance) * config.spin_curvature
}

fn lensing_impulse(config: &SinkConfig, position: Vec2, pointer: Vec2) -> f32 {
    let r = config.lens_radius;
    let dist_sq = position.distance_squared(pointer);
    // Skip the sqrt outside the lens
    if dist_sq < r * r {
        (r - dist_sq.sqrt()) / config.lens_falloff
    } else {
        0.0
    }
}

impl FrameSystem for RadialSink {
    fn update(&mut self, ctx: &FrameContext, surface: &mut Surface) {
        if ctx.reduced_motion {
            self.suspend(surface);
            return;
        }
        surface.clear_all();
        let pointer = ctx.pointer_in(ctx.sink_placement, SINK_LOGICAL_SIZE, SINK_LOGICAL_SIZE);
        self.step(pointer);
        self.draw(surface);
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn particle_count(&self) -> usize {
        self.pool.alive_count()
    }

    fn name(&self) -> &str {
        "sink"
    }
}
