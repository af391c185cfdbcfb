//! The per-process ghost RNG, seeded once from wall-clock time when the
//! game state is constructed. Only ever touched from `ghost::plan`,
//! itself only ever called while the ghost-fleet lock is held.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wraps the RNG so `GameState` can hold it as a plain field rather than
/// exposing the `rand` traits at every call site.
pub struct GhostRng {
    inner: ChaCha8Rng,
}

impl GhostRng {
    /// Seeds from the current wall-clock time.
    #[must_use]
    pub fn from_system_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Picks a uniformly random element from a non-empty slice.
    ///
    /// # Panics
    /// Panics if `choices` is empty — callers only ever invoke this
    /// with the set of directions already known to be valid.
    pub fn pick<'a, T>(&mut self, choices: &'a [T]) -> &'a T {
        let index = self.inner.gen_range(0..choices.len());
        &choices[index]
    }
}
