//! Ambient field: the slowly twinkling, center-drifting starfield

use crate::config::AmbientConfig;
use crate::rand::ParticleRng;
use nebula_core::{Color, Vec2, Viewport};
use nebula_render::{BlendMode, Surface};
use nebula_runtime::{FrameContext, FrameSystem};

/// One background star
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientParticle {
    pub position: Vec2,
    pub radius: f32,
    pub opacity: f32,
    /// Signed; flips when opacity leaves the twinkle band
    pub twinkle: f32,
    pub speed: f32,
}

pub struct AmbientField {
    config: AmbientConfig,
    particles: Vec<AmbientParticle>,
    rng: ParticleRng,
    animating: bool,
}

impl AmbientField {
    pub fn new(config: AmbientConfig, rng: ParticleRng) -> Self {
        Self {
            config,
            particles: Vec::new(),
            rng,
            animating: false,
        }
    }

    /// Discard every particle and respawn at the density for `viewport`
    pub fn regenerate(&mut self, viewport: &Viewport) {
        let count = (viewport.area() / self.config.area_per_particle).max(0.0) as usize;
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let particle = AmbientParticle {
                position: random_position(&mut self.rng, viewport),
                radius: self.rng.range(0.0, self.config.radius_max),
                opacity: self.rng.range(self.config.opacity_min, self.config.opacity_max),
                twinkle: self.rng.range(self.config.twinkle_min, self.config.twinkle_max),
                speed: self.rng.range(self.config.speed_min, self.config.speed_max),
            };
            self.particles.push(particle);
        }
    }

    pub fn start(&mut self) {
        self.animating = true;
    }

    pub fn stop(&mut self) {
        self.animating = false;
    }

    pub fn particles(&self) -> &[AmbientParticle] {
        &self.particles
    }

    /// Advance twinkle and drift by one frame
    pub fn step(&mut self, viewport: &Viewport) {
        let center = viewport.center();
        let respawn_sq = self.config.respawn_radius * self.config.respawn_radius;
        let (lo, hi) = (self.config.opacity_min, self.config.opacity_max);

        for p in &mut self.particles {
            p.opacity += p.twinkle;
            // Reflect, don't clamp: the triangle wave may overshoot by a step.
            // Only an outward step flips, so a respawned star fades back in.
            if (p.opacity > hi && p.twinkle > 0.0) || (p.opacity < lo && p.twinkle < 0.0) {
                p.twinkle = -p.twinkle;
            }

            let offset = p.position - center;
            p.position = p.position - offset * (self.config.drift_rate * p.speed);

            if offset.length_squared() < respawn_sq {
                p.position = random_position(&mut self.rng, viewport);
                p.opacity = 0.0;
            }
        }
    }

    /// Paint the background and every particle as it currently stands
    pub fn draw(&self, surface: &mut Surface) {
        let bounds = surface.bounds();
        let canvas = surface.canvas_mut();
        canvas.fill_rect(bounds, self.config.background_color());
        for p in &self.particles {
            canvas.fill_circle(
                p.position,
                p.radius,
                Color::WHITE.with_alpha(p.opacity),
                BlendMode::SourceOver,
            );
        }
    }

    /// One frame with no twinkle, drift or respawn
    pub fn render_static(&self, surface: &mut Surface) {
        self.draw(surface);
    }
}

impl FrameSystem for AmbientField {
    fn update(&mut self, ctx: &FrameContext, surface: &mut Surface) {
        if ctx.reduced_motion {
            self.animating = false;
            return;
        }
        self.step(&ctx.viewport);
        self.draw(surface);
    }

    fn is_active(&self) -> bool {
        self.animating
    }

    fn particle_count(&self) -> usize {
        self.particles.len()
    }

    fn name(&self) -> &str {
        "ambient"
    }
}

fn random_position(rng: &mut ParticleRng, viewport: &Viewport) -> Vec2 {
    Vec2::new(rng.range(0.0, viewport.width), rng.range(0.0, viewport.height))
}
