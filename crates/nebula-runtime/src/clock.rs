//! Frame clock: one pending frame request at a time

use std::time::Instant;

/// Handed to the frame loop when a pending request is consumed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Zero-based index of this frame since the clock was created
    pub index: u64,
}

/// Tracks whether a frame has been requested, plus wall-time diagnostics.
///
/// Re-arming is cooperative: the loop asks for the next frame only while
/// something is still animating, and asking twice is the same as asking once.
/// There is no cancellation; an unrequested frame simply never runs.
pub struct FrameClock {
    total_time: f64,
    delta_time: f64,
    frame_count: u64,
    armed: bool,
    last_instant: Option<Instant>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            armed: false,
            last_instant: None,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for one frame before the next paint. Returns `false` if a frame
    /// was already pending.
    pub fn request_frame(&mut self) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        true
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Consume the pending request. `None` when no frame was requested.
    pub fn begin_frame(&mut self) -> Option<FrameTick> {
        if !self.armed {
            return None;
        }
        self.armed = false;

        let now = Instant::now();
        // Clamp so a backgrounded tab doesn't report one huge frame
        self.delta_time = self
            .last_instant
            .map(|last| now.duration_since(last).as_secs_f64().min(0.25))
            .unwrap_or(0.0);
        self.last_instant = Some(now);
        self.total_time += self.delta_time;

        let tick = FrameTick {
            index: self.frame_count,
        };
        self.frame_count += 1;
        Some(tick)
    }

    /// Frames consumed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Wall time covered by consumed frames, in seconds
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Wall time between the last two frames in seconds (0 on the first)
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert!(!clock.is_armed());
        assert_eq!(clock.frame_count(), 0);
        assert_eq!(clock.total_time(), 0.0);
    }

    #[test]
    fn test_unrequested_frame_never_runs() {
        let mut clock = FrameClock::new();
        assert!(clock.begin_frame().is_none());
        assert_eq!(clock.frame_count(), 0);
    }

    #[test]
    fn test_request_is_idempotent() {
        let mut clock = FrameClock::new();
        assert!(clock.request_frame());
        assert!(!clock.request_frame());

        assert!(clock.begin_frame().is_some());
        // Two requests still produce a single frame
        assert!(clock.begin_frame().is_none());
    }

    #[test]
    fn test_first_frame_zero_delta() {
        let mut clock = FrameClock::new();
        clock.request_frame();
        let tick = clock.begin_frame().unwrap();
        assert_eq!(tick.index, 0);
        assert_eq!(clock.delta_time(), 0.0);

        clock.request_frame();
        let tick = clock.begin_frame().unwrap();
        assert_eq!(tick.index, 1);
        assert!(clock.delta_time() >= 0.0 && clock.delta_time() <= 0.25);
        assert_eq!(clock.total_time(), clock.delta_time());
    }
}
