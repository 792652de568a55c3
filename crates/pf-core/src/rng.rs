//! Seeded randomness for reproducible runs.
//!
//! Every randomized decision the engine makes (shuffling the task pool,
//! picking among pending destinations) draws from one `SimRng` owned by the
//! scheduler, so a given seed replays the exact same dispatch sequence.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// A seeded `SmallRng` behind a small purpose-built surface.
///
/// Single-threaded by construction; the tick driver serializes all access.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Uniform draw from `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// In-place Fisher-Yates shuffle.
    #[inline]
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.0);
    }

    /// Uniform pick from `items`, `None` when empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.0)
    }
}
