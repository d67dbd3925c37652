//! Random sources for stochastic dice evaluation.
//!
//! Formula evaluation only needs "roll one die with N faces", expressed by
//! [`DiceRoller`]. The production roller, [`PcgDice`], derives a fresh seed for
//! every die from a base seed and a running counter, so the same seed always
//! replays the same sequence of rolls.

use std::collections::VecDeque;

/// Stateless oracle mapping a seed to a random value.
///
/// Implementations must be deterministic: the same seed yields the same value.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        (self.next_u32(seed) % sides.max(1)) + 1
    }
}

/// PCG-XSH-RR generator: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mix a base seed with a roll counter, a stream identifier, and a context
/// value (typically the die size) into one seed.
pub fn compute_seed(base_seed: u64, nonce: u64, stream: u32, context: u32) -> u64 {
    let mut hash = base_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(stream).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(context).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

// ============================================================================
// Dice Rollers
// ============================================================================

/// Source of individual die results.
pub trait DiceRoller {
    /// Roll one die, returning a face in `1..=faces`.
    fn roll_die(&mut self, faces: u32) -> u32;
}

/// Seeded roller backed by [`PcgRng`].
#[derive(Clone, Debug)]
pub struct PcgDice {
    oracle: PcgRng,
    seed: u64,
    stream: u32,
    nonce: u64,
}

impl PcgDice {
    pub fn new(seed: u64) -> Self {
        Self {
            oracle: PcgRng,
            seed,
            stream: 0,
            nonce: 0,
        }
    }

    /// Separate stream for independent roll sequences sharing one seed.
    #[must_use]
    pub fn with_stream(mut self, stream: u32) -> Self {
        self.stream = stream;
        self
    }

    /// Number of dice rolled so far.
    pub fn rolls(&self) -> u64 {
        self.nonce
    }
}

impl DiceRoller for PcgDice {
    fn roll_die(&mut self, faces: u32) -> u32 {
        let seed = compute_seed(self.seed, self.nonce, self.stream, faces);
        self.nonce = self.nonce.wrapping_add(1);
        self.oracle.roll_die(seed, faces)
    }
}

/// Roller that replays a fixed list of results, for tests and replays.
///
/// Once the script runs out every die shows `fallback` (default 1). Results
/// are clamped into `1..=faces`.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    results: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedDice {
    pub fn new(results: impl IntoIterator<Item = u32>) -> Self {
        Self {
            results: results.into_iter().collect(),
            fallback: 1,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: u32) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.results.len()
    }
}

impl Default for ScriptedDice {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self, faces: u32) -> u32 {
        let faces = faces.max(1);
        self.results
            .pop_front()
            .unwrap_or(self.fallback)
            .clamp(1, faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcg_dice_replays_from_the_same_seed() {
        let mut a = PcgDice::new(42);
        let mut b = PcgDice::new(42);
        let first: Vec<u32> = (0..16).map(|_| a.roll_die(20)).collect();
        let second: Vec<u32> = (0..16).map(|_| b.roll_die(20)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|&r| (1..=20).contains(&r)));
        assert_eq!(a.rolls(), 16);
    }

    #[test]
    fn streams_diverge() {
        let mut a = PcgDice::new(7);
        let mut b = PcgDice::new(7).with_stream(1);
        let first: Vec<u32> = (0..8).map(|_| a.roll_die(100)).collect();
        let second: Vec<u32> = (0..8).map(|_| b.roll_die(100)).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn scripted_dice_clamp_and_fall_back() {
        let mut dice = ScriptedDice::new([9, 0]).with_fallback(4);
        assert_eq!(dice.roll_die(6), 6);
        assert_eq!(dice.roll_die(6), 1);
        assert_eq!(dice.roll_die(6), 4);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn compute_seed_depends_on_every_input() {
        let base = compute_seed(1, 2, 3, 4);
        assert_ne!(base, compute_seed(0, 2, 3, 4));
        assert_ne!(base, compute_seed(1, 0, 3, 4));
        assert_ne!(base, compute_seed(1, 2, 0, 4));
        assert_ne!(base, compute_seed(1, 2, 3, 0));
    }
}
