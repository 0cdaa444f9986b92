//! Deterministic randomness for library shuffles.
//!
//! The kernel itself makes no random choices on behalf of players; the only
//! consumer is shuffling. The generator lives inside `GameState` as a
//! `GameRngState` (seed + ChaCha word position) so that a state value fully
//! determines every future shuffle.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded ChaCha8 generator.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Capture the generator position.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Rebuild a generator at a captured position.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable generator position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter).
    pub word_pos: u128,
}

impl GameRngState {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed, word_pos: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_shuffle() {
        let mut a = GameRng::new(7);
        let mut b = GameRng::new(7);
        let mut xs: Vec<u32> = (0..30).collect();
        let mut ys = xs.clone();

        a.shuffle(&mut xs);
        b.shuffle(&mut ys);
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = GameRng::new(42);
        let mut data: Vec<u32> = (1..=10).collect();

        rng.shuffle(&mut data);
        assert_ne!(data, (1..=10).collect::<Vec<_>>());

        data.sort_unstable();
        assert_eq!(data, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_state_restores_position() {
        let mut rng = GameRng::new(42);
        let mut warmup: Vec<u32> = (0..50).collect();
        rng.shuffle(&mut warmup);

        let saved = rng.state();
        let mut expected: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut expected);

        let mut restored = GameRng::from_state(&saved);
        let mut actual: Vec<u32> = (0..20).collect();
        restored.shuffle(&mut actual);
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_fresh_state_matches_new() {
        let mut from_state = GameRng::from_state(&GameRngState::new(9));
        let mut fresh = GameRng::new(9);
        let mut xs: Vec<u32> = (0..20).collect();
        let mut ys = xs.clone();
        from_state.shuffle(&mut xs);
        fresh.shuffle(&mut ys);
        assert_eq!(xs, ys);
    }
}
