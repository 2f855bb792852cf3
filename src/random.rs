//! Random source
//!
//! One `Pcg32` stream drives every gameplay roll so a seeded session (daily
//! challenge) replays identically. Gameplay-facing helpers never fail; only
//! the programmer-error cases of `weighted_choice` return an error.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RandomError {
    #[error("items and weights must have the same length (got {items} items, {weights} weights)")]
    LengthMismatch { items: usize, weights: usize },
    #[error("cannot choose from an empty list")]
    Empty,
}

/// Seedable uniform random source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRng {
    seed: u64,
    rng: Pcg32,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed from the thread RNG (non-reproducible runs)
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewind to the start of the seeded stream
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
    }

    pub fn set_seed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Uniform in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform in [min, max); tolerates `min > max` by interpolating the other way
    pub fn float(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform integer in [min, max] inclusive
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.random_range(lo..=hi)
    }

    /// True with the given probability; 0 never, 1 always
    pub fn boolean(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..items.len());
        items.get(idx)
    }

    /// Pick an item with probability proportional to its weight
    pub fn weighted_choice<'a, T>(
        &mut self,
        items: &'a [T],
        weights: &[f32],
    ) -> Result<&'a T, RandomError> {
        if items.len() != weights.len() {
            return Err(RandomError::LengthMismatch {
                items: items.len(),
                weights: weights.len(),
            });
        }
        let last = items.last().ok_or(RandomError::Empty)?;

        let total: f32 = weights.iter().sum();
        let mut remaining = self.next_f32() * total;
        for (item, weight) in items.iter().zip(weights) {
            remaining -= weight;
            if remaining <= 0.0 {
                return Ok(item);
            }
        }
        Ok(last)
    }

    /// Fisher-Yates shuffle into a new Vec
    pub fn shuffled<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let j = self.rng.random_range(0..=i);
            out.swap(i, j);
        }
        out
    }

    pub fn point_in_circle(&mut self, center: Vec2, radius: f32) -> Vec2 {
        let angle = self.next_f32() * std::f32::consts::TAU;
        let r = self.next_f32() * radius;
        center + Vec2::new(angle.cos(), angle.sin()) * r
    }

    pub fn point_in_rect(&mut self, origin: Vec2, size: Vec2) -> Vec2 {
        origin + Vec2::new(self.next_f32() * size.x, self.next_f32() * size.y)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
