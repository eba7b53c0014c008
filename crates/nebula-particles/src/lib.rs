//! Nebula Particles - the animated backdrop
//!
//! Three independent particle systems share one frame clock:
//! - Ambient field: twinkling starfield drifting toward the viewport center
//! - Radial sink: accretion-disk spiral in a fixed 400x400 frame, lensed by the pointer
//! - Burst emitter: finite additive explosion fired on demand
//!
//! [`BackdropEngine`] is the facade a host drives: bind surfaces, feed it
//! pointer, resize and motion-preference changes, and call `tick` once per
//! display refresh while it wants frames.

pub mod ambient;
pub mod burst;
pub mod config;
pub mod engine;
pub mod particle;
pub mod rand;
pub mod sink;

pub use ambient::{AmbientField, AmbientParticle};
pub use burst::{BurstEmitter, BurstParticle};
pub use config::{AmbientConfig, BurstConfig, EngineConfig, SinkConfig};
pub use engine::{BackdropEngine, EngineStats};
pub use particle::ParticlePool;
pub use rand::ParticleRng;
pub use sink::{RadialSink, SinkParticle};
