//! crates/mendi_core/src/picker.rs
//!
//! Strategies for choosing one variant out of a fixed template pool.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait VariantPicker: Send + Sync {
    /// Returns an index in `0..pool_len`. `turn` is the message count of the
    /// conversation. `pool_len` is never zero.
    fn pick(&self, pool_len: usize, turn: usize) -> usize;
}

/// Deterministic rotation: variation `(turn mod 4) + 1`, wrapped to the pool size.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationPicker;

impl VariantPicker for RotationPicker {
    fn pick(&self, pool_len: usize, turn: usize) -> usize {
        (turn % 4) % pool_len
    }
}

/// Uniform random choice from a seedable generator.
#[derive(Debug)]
pub struct SeededRandomPicker {
    rng: Mutex<StdRng>,
}

impl SeededRandomPicker {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl Default for SeededRandomPicker {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl VariantPicker for SeededRandomPicker {
    fn pick(&self, pool_len: usize, _turn: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..pool_len),
            // A poisoned generator still holds valid state.
            Err(poisoned) => poisoned.into_inner().gen_range(0..pool_len),
        }
    }
}

/// Always the same index; lets tests pin random pools.
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl VariantPicker for FixedPicker {
    fn pick(&self, pool_len: usize, _turn: usize) -> usize {
        self.0 % pool_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_follows_message_count() {
        let picker = RotationPicker;
        assert_eq!(picker.pick(4, 5), 1);
        assert_eq!(picker.pick(4, 4), 0);
        assert_eq!(picker.pick(4, 7), 3);
        assert_eq!(picker.pick(4, 5), picker.pick(4, 5));
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = SeededRandomPicker::from_seed(42);
        let b = SeededRandomPicker::from_seed(42);
        let seq_a: Vec<usize> = (0..16).map(|t| a.pick(6, t)).collect();
        let seq_b: Vec<usize> = (0..16).map(|t| b.pick(6, t)).collect();
        assert_eq!(seq_a, seq_b);
        assert!(seq_a.iter().all(|i| *i < 6));
    }

    #[test]
    fn fixed_picker_wraps() {
        assert_eq!(FixedPicker(5).pick(4, 0), 1);
    }
}
