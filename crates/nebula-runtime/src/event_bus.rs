//! Bounded queue of engine cues

use crate::event::EngineEvent;
use std::collections::VecDeque;

/// Pending events kept before the oldest start falling off
pub const DEFAULT_EVENT_LIMIT: usize = 256;

/// Engine-to-host event queue.
///
/// Hosts are free never to drain it, so it keeps only the newest `limit`
/// events and counts what it had to discard.
pub struct EventBus {
    events: VecDeque<EngineEvent>,
    limit: usize,
    dropped: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_EVENT_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            events: VecDeque::with_capacity(limit.min(DEFAULT_EVENT_LIMIT)),
            limit,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: EngineEvent) {
        if self.events.len() == self.limit {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Events discarded because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::Vec2;

    #[test]
    fn drain_returns_in_push_order() {
        let mut bus = EventBus::new();
        bus.push(EngineEvent::BurstFired {
            origin: Vec2::new(10.0, 20.0),
            particles: 150,
        });
        bus.push(EngineEvent::BurstSettled);

        let events = bus.drain();
        assert!(matches!(events[0], EngineEvent::BurstFired { .. }));
        assert_eq!(events[1], EngineEvent::BurstSettled);
        assert!(bus.is_empty());
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn full_queue_drops_oldest() {
        let mut bus = EventBus::with_limit(2);
        for reduced in [true, false, true] {
            bus.push(EngineEvent::MotionPreferenceChanged { reduced });
        }
        assert_eq!(bus.len(), 2);
        assert_eq!(bus.dropped(), 1);
        assert_eq!(
            bus.drain(),
            vec![
                EngineEvent::MotionPreferenceChanged { reduced: false },
                EngineEvent::MotionPreferenceChanged { reduced: true },
            ]
        );
    }

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_string(&EngineEvent::MotionPreferenceChanged { reduced: true })
            .unwrap();
        assert_eq!(json, r#"{"event":"motion_preference_changed","reduced":true}"#);
    }
}
