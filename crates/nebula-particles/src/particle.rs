//! Capacity-bounded particle pool

/// Swap-remove pool for O(1) particle kill and contiguous alive iteration.
///
/// Iteration order is not stable across compaction.
pub struct ParticlePool<P> {
    particles: Vec<P>,
    capacity: usize,
}

impl<P> ParticlePool<P> {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn alive_count(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.capacity
    }

    /// Add a particle. Returns `false` (dropping it) if the pool is full.
    pub fn spawn(&mut self, particle: P) -> bool {
        if self.is_full() {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Run `step` on every particle; those for which it returns `false` are
    /// killed via swap-remove.
    pub fn update_and_compact(&mut self, mut step: impl FnMut(&mut P) -> bool) {
        let mut i = 0;
        while i < self.particles.len() {
            if step(&mut self.particles[i]) {
                i += 1;
            } else {
                // The swapped-in particle hasn't been stepped yet
                self.particles.swap_remove(i);
            }
        }
    }

    pub fn alive_slice(&self) -> &[P] {
        &self.particles
    }
}
