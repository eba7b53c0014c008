//! Burst emitter: a finite explosion fired by an external event

use crate::config::BurstConfig;
use crate::particle::ParticlePool;
use crate::rand::ParticleRng;
use nebula_core::{Color, Vec2};
use nebula_render::{BlendMode, Surface};
use nebula_runtime::{FrameContext, FrameSystem};

#[derive(Debug, Clone, PartialEq)]
pub struct BurstParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub color: Color,
    /// 1.0 at spawn; the particle dies at or below zero
    pub life: f32,
    pub decay: f32,
    pub friction: f32,
}

pub struct BurstEmitter {
    config: BurstConfig,
    palette: Vec<Color>,
    pool: ParticlePool<BurstParticle>,
    rng: ParticleRng,
    active: bool,
}

impl BurstEmitter {
    pub fn new(config: BurstConfig, rng: ParticleRng) -> Self {
        let palette = config.palette_colors();
        let pool = ParticlePool::new(config.max_particles);
        Self {
            config,
            palette,
            pool,
            rng,
            active: false,
        }
    }

    pub fn particles(&self) -> &[BurstParticle] {
        self.pool.alive_slice()
    }

    /// Spawn one burst at `origin`, adding to any burst still in flight.
    /// Returns how many particles were actually spawned.
    pub fn trigger(&mut self, origin: Vec2) -> usize {
        let mut spawned = 0;
        for _ in 0..self.config.particle_count {
            let particle = self.spawn_particle(origin);
            if !self.pool.spawn(particle) {
                break;
            }
            spawned += 1;
        }
        if spawned > 0 {
            self.active = true;
        }
        spawned
    }

    fn spawn_particle(&mut self, origin: Vec2) -> BurstParticle {
        let c = &self.config;
        let direction = Vec2::from_angle(self.rng.angle());
        // Cubic shaping: mostly slow debris with a long fast tail
        let speed = self.rng.next_f32().powf(c.speed_exponent) * c.speed_spread + c.speed_min;
        BurstParticle {
            position: origin,
            velocity: direction * speed,
            size: self.rng.range(c.size_min, c.size_max),
            color: self.rng.pick(&self.palette).copied().unwrap_or(Color::WHITE),
            life: 1.0,
            decay: self.rng.range(c.decay_min, c.decay_max),
            friction: c.friction,
        }
    }

    /// Stop drawing and clear the surface. In-flight particles are kept
    /// frozen until `resume`.
    pub fn halt(&mut self, surface: &mut Surface) {
        self.active = false;
        surface.clear_all();
    }

    /// Pick a halted burst back up, if anything is left of it
    pub fn resume(&mut self) {
        self.active = !self.pool.is_empty();
    }

    pub fn step(&mut self) {
        self.pool.update_and_compact(|p| {
            p.position = p.position + p.velocity;
            p.velocity = p.velocity * p.friction;
            p.life -= p.decay;
            p.life > 0.0
        });
    }

    pub fn draw(&self, surface: &mut Surface) {
        let canvas = surface.canvas_mut();
        for p in self.pool.alive_slice() {
            canvas.fill_circle(p.position, p.size, p.color.with_alpha(p.life), BlendMode::Lighter);
        }
    }
}

impl FrameSystem for BurstEmitter {
    fn update(&mut self, ctx: &FrameContext, surface: &mut Surface) {
        if ctx.reduced_motion {
            self.halt(surface);
            return;
        }
        surface.clear_all();
        self.step();
        if self.pool.is_empty() {
            // Self-terminate; the clear above was the final one
            self.active = false;
            return;
        }
        self.draw(surface);
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn particle_count(&self) -> usize {
        self.pool.alive_count()
    }

    fn name(&self) -> &str {
        "burst"
    }
}
