//! Uniform-random piece generation
//!
//! Every draw picks one of the 7 types with equal probability. There is
//! deliberately no 7-bag here; droughts and floods happen exactly as
//! often as fair dice allow.

use crate::tetromino::TetrominoType;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seedable source of piece types
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: ChaCha8Rng,
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner {
    /// Create a spawner seeded from entropy
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a spawner with a fixed seed for deterministic sequences
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw the next piece type, uniformly at random
    pub fn next(&mut self) -> TetrominoType {
        let all = TetrominoType::all();
        all[self.rng.gen_range(0..all.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Spawner::with_seed(42);
        let mut b = Spawner::with_seed(42);
        for _ in 0..50 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_all_types_appear() {
        let mut spawner = Spawner::with_seed(7);
        let drawn: HashSet<_> = (0..200).map(|_| spawner.next()).collect();
        assert_eq!(drawn.len(), 7);
    }

    #[test]
    fn test_roughly_uniform() {
        let mut spawner = Spawner::with_seed(1);
        let mut counts = [0u32; 7];
        for _ in 0..7000 {
            counts[(spawner.next().id() - 1) as usize] += 1;
        }
        // Each type expects ~1000 draws; a generous band catches a
        // broken distribution without flaking on seed choice.
        for count in counts {
            assert!((700..1300).contains(&count), "counts: {:?}", counts);
        }
    }
}
