//! Engine configuration (parsed from TOML)
//!
//! Every section is `#[serde(default)]`, so a file only needs the keys it
//! overrides:
//!
//! ```toml
//! [sink]
//! max_particles = 300
//!
//! [burst]
//! palette = [0xffd700, 0xffffff]
//! ```

use nebula_core::{Color, NebulaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for any particle capacity
const MAX_CAPACITY: usize = 10_000;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ambient: AmbientConfig,
    pub sink: SinkConfig,
    pub burst: BurstConfig,
}

/// Drifting starfield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    /// Viewport area (logical px²) per particle
    pub area_per_particle: f32,
    /// Background fill, 0xRRGGBB
    pub background: u32,
    pub radius_max: f32,
    /// Twinkle reflects off these bounds
    pub opacity_min: f32,
    pub opacity_max: f32,
    pub twinkle_min: f32,
    pub twinkle_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Fraction of the vector to center covered per frame at speed 1
    pub drift_rate: f32,
    /// Particles closer than this to the center respawn
    pub respawn_radius: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            area_per_particle: 8000.0,
            background: 0x050505,
            radius_max: 1.5,
            opacity_min: 0.2,
            opacity_max: 1.0,
            twinkle_min: 0.005,
            twinkle_max: 0.025,
            speed_min: 0.1,
            speed_max: 0.6,
            drift_rate: 0.002,
            respawn_radius: 50.0,
        }
    }
}

impl AmbientConfig {
    pub fn background_color(&self) -> Color {
        Color::from_hex(self.background)
    }
}

/// Accretion-disk sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub max_particles: usize,
    /// Per-frame probability of admitting one particle while below capacity
    pub spawn_chance: f32,
    pub spawn_distance_min: f32,
    pub spawn_distance_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub size_min: f32,
    pub size_max: f32,
    /// Particles inside this radius are absorbed
    pub absorb_radius: f32,
    /// Angular speed at the reference radius, rad/frame
    pub base_spin: f32,
    /// Extra rad/frame per unit of distance inside the reference radius
    pub spin_curvature: f32,
    /// Distance over which particles fade in from the absorption radius
    pub fade_distance: f32,
    /// Draw radius multiplier
    pub glow_scale: f32,
    /// Pointer influence radius
    pub lens_radius: f32,
    /// Impulse is (lens_radius - d) / lens_falloff
    pub lens_falloff: f32,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            max_particles: 150,
            spawn_chance: 0.2,
            spawn_distance_min: 180.0,
            spawn_distance_max: 230.0,
            speed_min: 0.3,
            speed_max: 0.8,
            size_min: 1.0,
            size_max: 3.0,
            absorb_radius: 30.0,
            base_spin: 0.02,
            spin_curvature: 0.0003,
            fade_distance: 100.0,
            glow_scale: 1.5,
            lens_radius: 100.0,
            lens_falloff: 500.0,
        }
    }
}

/// Burst emitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Particles spawned per trigger
    pub particle_count: usize,
    /// Cap on accumulated particles across overlapping bursts
    pub max_particles: usize,
    pub speed_min: f32,
    /// speed = u^speed_exponent * speed_spread + speed_min
    pub speed_spread: f32,
    pub speed_exponent: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub decay_min: f32,
    pub decay_max: f32,
    /// Per-frame velocity multiplier
    pub friction: f32,
    /// 0xRRGGBB colors, picked uniformly
    pub palette: Vec<u32>,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            particle_count: 150,
            max_particles: MAX_CAPACITY,
            speed_min: 2.0,
            speed_spread: 20.0,
            speed_exponent: 3.0,
            size_min: 2.0,
            size_max: 6.0,
            decay_min: 0.01,
            decay_max: 0.03,
            friction: 0.96,
            palette: vec![0xffd700, 0xff00c1, 0x00fff9, 0xffffff],
        }
    }
}

impl BurstConfig {
    pub fn palette_colors(&self) -> Vec<Color> {
        self.palette.iter().map(|&hex| Color::from_hex(hex)).collect()
    }
}

impl EngineConfig {
    /// Parse a TOML document and sanitize it
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        Ok(config.sanitized())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            NebulaError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Clamp out-of-range values so every simulation invariant holds:
    /// ordered ranges, bounded capacities, friction below 1 and a positive
    /// decay so bursts always terminate.
    pub fn sanitized(mut self) -> Self {
        let a = &mut self.ambient;
        a.area_per_particle = a.area_per_particle.max(1.0);
        a.radius_max = a.radius_max.max(0.0);
        order(&mut a.opacity_min, &mut a.opacity_max);
        order(&mut a.twinkle_min, &mut a.twinkle_max);
        order(&mut a.speed_min, &mut a.speed_max);

        let s = &mut self.sink;
        s.max_particles = s.max_particles.min(MAX_CAPACITY);
        s.spawn_chance = s.spawn_chance.clamp(0.0, 1.0);
        order(&mut s.spawn_distance_min, &mut s.spawn_distance_max);
        order(&mut s.speed_min, &mut s.speed_max);
        order(&mut s.size_min, &mut s.size_max);
        // Particles must fall inward every frame
        s.speed_min = s.speed_min.max(f32::EPSILON);
        s.speed_max = s.speed_max.max(s.speed_min);
        s.size_min = s.size_min.max(0.0);
        s.fade_distance = s.fade_distance.max(f32::EPSILON);
        s.lens_falloff = s.lens_falloff.max(f32::EPSILON);

        let b = &mut self.burst;
        b.max_particles = b.max_particles.min(MAX_CAPACITY);
        b.particle_count = b.particle_count.min(b.max_particles);
        order(&mut b.size_min, &mut b.size_max);
        order(&mut b.decay_min, &mut b.decay_max);
        b.size_min = b.size_min.max(0.0);
        b.decay_min = b.decay_min.max(1e-4);
        b.decay_max = b.decay_max.max(b.decay_min);
        b.friction = b.friction.clamp(0.0, 0.999);
        if b.palette.is_empty() {
            b.palette = BurstConfig::default().palette;
        }

        self
    }
}

fn order(min: &mut f32, max: &mut f32) {
    if *min > *max {
        std::mem::swap(min, max);
    }
}
