//! Seedable xorshift32 PRNG for particle spawning

use std::time::{SystemTime, UNIX_EPOCH};

pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Seeded from the wall clock; every session gets a different sky
    pub fn from_entropy() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32).rotate_left(16))
            .unwrap_or(0x9E37_79B9);
        Self::new(seed)
    }

    /// Derive an independent generator (one per particle system)
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_u32() ^ 0x85EB_CA6B)
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        // Top 24 bits fit the f32 mantissa exactly, so 1.0 is never produced
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform angle in [0, 2pi)
    pub fn angle(&mut self) -> f32 {
        self.next_f32() * std::f32::consts::TAU
    }

    /// Uniformly chosen element, `None` for an empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = ((self.next_f32() * items.len() as f32) as usize).min(items.len() - 1);
        items.get(idx)
    }
}
