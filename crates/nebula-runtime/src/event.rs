//! Engine events

use nebula_core::Vec2;
use serde::Serialize;

/// Fire-and-forget cues the engine emits for the host.
///
/// Nothing in the simulation waits on these; a host wires them to audio or
/// logging and drains them at its own pace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A burst was spawned (the host's cue for a burst sound)
    BurstFired { origin: Vec2, particles: usize },
    /// The last burst particle expired and the burst surface was cleared
    BurstSettled,
    MotionPreferenceChanged { reduced: bool },
    /// A system was disabled because its surface could not be bound
    SystemDisabled { system: String, reason: String },
    Resized { width: f32, height: f32 },
}
