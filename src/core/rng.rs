//! Random sources: the injected selection service every draw goes through.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of every random choice a grammar makes: alternations, symbol
/// draws and deck shuffles.
///
/// Given the same starting state and the same sequence of calls an
/// implementation must return the same sequence of indices.
pub trait RandomSource: Send {
    /// Pick an index in `0..n`. Callers never pass `n == 0`.
    fn pick_uniform(&mut self, n: usize) -> usize;

    /// Pick an index into `weights` with probability proportional to its
    /// weight. Falls back to a uniform pick when every weight is zero.
    fn pick_weighted(&mut self, weights: &[u32]) -> usize;

    /// Clone into a box, so grammars owning a source stay `Clone`.
    fn clone_box(&self) -> Box<dyn RandomSource>;
}

impl Clone for Box<dyn RandomSource> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// The default random source: a seedable `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from OS entropy. Output is not reproducible.
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for SeededRng {
    fn pick_uniform(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        self.inner.gen_range(0..n)
    }

    fn pick_weighted(&mut self, weights: &[u32]) -> usize {
        match WeightedIndex::new(weights.iter().map(|&w| u64::from(w))) {
            Ok(dist) => dist.sample(&mut self.inner),
            Err(_) => self.pick_uniform(weights.len()),
        }
    }

    fn clone_box(&self) -> Box<dyn RandomSource> {
        Box::new(self.clone())
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`], so custom sources
/// control deck order too.
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.pick_uniform(i + 1);
        items.swap(i, j);
    }
}
