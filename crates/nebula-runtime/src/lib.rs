//! Nebula Runtime - Frame loop infrastructure
//!
//! Provides the frame loop building blocks:
//! - `FrameClock`: cooperative, idempotently re-armed frame requests
//! - `FrameContext`: per-frame inputs (viewport, pointer, sink placement)
//! - `EngineEvent` / `EventBus`: bounded queue of cues for host side effects
//! - `FrameSystem`: trait for systems ticked by the frame loop

mod clock;
mod context;
mod event;
mod event_bus;
mod system;

pub use clock::{FrameClock, FrameTick};
pub use context::FrameContext;
pub use event::EngineEvent;
pub use event_bus::{EventBus, DEFAULT_EVENT_LIMIT};
pub use system::FrameSystem;
