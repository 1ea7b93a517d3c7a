//! Distribution policies and the per-symbol deck state behind them.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::core::grammar::GrammarError;
use crate::core::rng::{shuffle, RandomSource};

/// How a symbol picks among its candidates on each draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Distribution {
    /// Uniform pick, with replacement.
    #[default]
    Uniform,
    /// Pick proportional to candidate weight, with replacement.
    Weighted,
    /// Uniform pick without replacement. Exhausts until reset.
    Pop,
    /// Walk a random permutation; a fresh one is dealt when it runs out.
    Shuffle,
    /// Each candidate dealt `weight` times from one shuffled pool.
    /// Exhausts until reset.
    PopWeighted,
}

impl Distribution {
    pub fn name(self) -> &'static str {
        match self {
            Distribution::Uniform => "uniform",
            Distribution::Weighted => "weighted",
            Distribution::Pop => "pop",
            Distribution::Shuffle => "shuffle",
            Distribution::PopWeighted => "popWeighted",
        }
    }

    /// Whether candidate weights matter under this policy.
    pub fn uses_weights(self) -> bool {
        matches!(self, Distribution::Weighted | Distribution::PopWeighted)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Distribution {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(Distribution::Uniform),
            "weighted" => Ok(Distribution::Weighted),
            "pop" => Ok(Distribution::Pop),
            "shuffle" => Ok(Distribution::Shuffle),
            "popWeighted" => Ok(Distribution::PopWeighted),
            other => Err(GrammarError::UnknownDistribution(other.to_string())),
        }
    }
}

/// Sampling state for one symbol.
///
/// Holds candidate indices only; candidate data is never touched. The deck
/// is dealt lazily, so a fresh or reset sampler consumes no randomness
/// until its first draw.
#[derive(Debug, Clone)]
pub struct Sampler {
    policy: Distribution,
    deck: Option<VecDeque<usize>>,
    last: Option<usize>,
}

impl Sampler {
    pub fn new(policy: Distribution) -> Self {
        Self {
            policy,
            deck: None,
            last: None,
        }
    }

    pub fn policy(&self) -> Distribution {
        self.policy
    }

    /// Put every candidate back. The next draw deals a fresh deck.
    pub fn reset(&mut self) {
        self.deck = None;
        self.last = None;
    }

    /// Cards still to be dealt, or `None` for policies without a deck and
    /// for decks not dealt yet.
    pub fn remaining(&self) -> Option<usize> {
        self.deck.as_ref().map(VecDeque::len)
    }

    /// Draw one candidate index.
    ///
    /// `weights` has one entry per candidate. `eligible`, when given, has
    /// one entry per candidate and excludes the `false` ones from this draw.
    /// Returns `None` when nothing can be drawn: no eligible candidate, or
    /// an exhausted `pop`/`popWeighted` deck.
    pub fn draw(
        &mut self,
        weights: &[u32],
        eligible: Option<&[bool]>,
        rng: &mut dyn RandomSource,
    ) -> Option<usize> {
        let is_eligible = |index: usize| eligible.map_or(true, |mask| mask.get(index) == Some(&true));

        let picked = match self.policy {
            Distribution::Uniform => {
                let pool: Vec<usize> = (0..weights.len()).filter(|&i| is_eligible(i)).collect();
                if pool.is_empty() {
                    None
                } else {
                    Some(pool[rng.pick_uniform(pool.len())])
                }
            }
            Distribution::Weighted => {
                let pool: Vec<usize> = (0..weights.len()).filter(|&i| is_eligible(i)).collect();
                if pool.is_empty() {
                    None
                } else {
                    let pool_weights: Vec<u32> = pool.iter().map(|&i| weights[i]).collect();
                    Some(pool[rng.pick_weighted(&pool_weights)])
                }
            }
            Distribution::Pop => {
                let deck = self
                    .deck
                    .get_or_insert_with(|| (0..weights.len()).collect());
                let positions: Vec<usize> = deck
                    .iter()
                    .enumerate()
                    .filter(|(_, card)| is_eligible(**card))
                    .map(|(position, _)| position)
                    .collect();
                if positions.is_empty() {
                    None
                } else {
                    let position = positions[rng.pick_uniform(positions.len())];
                    deck.remove(position)
                }
            }
            Distribution::Shuffle => {
                let exhausted = self.deck.as_ref().map_or(true, VecDeque::is_empty);
                if exhausted {
                    self.deck = Some(deal_permutation(weights.len(), self.last, rng));
                }
                match self.take_first_eligible(&is_eligible) {
                    Some(card) => Some(card),
                    None => {
                        // Only ineligible cards left in this cycle.
                        self.deck = Some(deal_permutation(weights.len(), self.last, rng));
                        self.take_first_eligible(&is_eligible)
                    }
                }
            }
            Distribution::PopWeighted => {
                if self.deck.is_none() {
                    let mut pool: Vec<usize> = weights
                        .iter()
                        .enumerate()
                        .flat_map(|(index, &weight)| std::iter::repeat(index).take(weight as usize))
                        .collect();
                    shuffle(&mut pool, rng);
                    self.deck = Some(pool.into());
                }
                self.take_first_eligible(&is_eligible)
            }
        };

        if picked.is_some() {
            self.last = picked;
        }
        picked
    }

    fn take_first_eligible(&mut self, is_eligible: &dyn Fn(usize) -> bool) -> Option<usize> {
        let deck = self.deck.as_mut()?;
        let position = deck.iter().position(|&card| is_eligible(card))?;
        deck.remove(position)
    }
}

/// A random permutation of `0..len` whose first card differs from `last`
/// when there is a choice.
fn deal_permutation(len: usize, last: Option<usize>, rng: &mut dyn RandomSource) -> VecDeque<usize> {
    let mut cards: Vec<usize> = (0..len).collect();
    shuffle(&mut cards, rng);
    if len > 1 && cards.first().copied() == last {
        cards.swap(0, 1);
    }
    cards.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::SeededRng;

    fn draw_n(sampler: &mut Sampler, weights: &[u32], n: usize, rng: &mut SeededRng) -> Vec<Option<usize>> {
        (0..n).map(|_| sampler.draw(weights, None, rng)).collect()
    }

    #[test]
    fn parse_distribution_names() {
        assert_eq!("uniform".parse::<Distribution>().unwrap(), Distribution::Uniform);
        assert_eq!("popWeighted".parse::<Distribution>().unwrap(), Distribution::PopWeighted);
        assert!("random".parse::<Distribution>().is_err());
        assert_eq!(Distribution::PopWeighted.to_string(), "popWeighted");
    }

    #[test]
    fn distribution_from_ron() {
        let d: Distribution = ron::from_str("popWeighted").unwrap();
        assert_eq!(d, Distribution::PopWeighted);
    }

    #[test]
    fn uniform_never_exhausts() {
        let mut rng = SeededRng::new(1);
        let mut sampler = Sampler::new(Distribution::Uniform);
        for pick in draw_n(&mut sampler, &[1, 1, 1], 100, &mut rng) {
            assert!(pick.unwrap() < 3);
        }
    }

    #[test]
    fn weighted_follows_weights() {
        let mut rng = SeededRng::new(2);
        let mut sampler = Sampler::new(Distribution::Weighted);
        let picks = draw_n(&mut sampler, &[1000, 1], 100, &mut rng);
        let heavy = picks.iter().filter(|p| **p == Some(0)).count();
        assert!(heavy > 90, "heavy candidate drawn {} / 100", heavy);
    }

    #[test]
    fn pop_exhausts_then_resets() {
        let mut rng = SeededRng::new(3);
        let mut sampler = Sampler::new(Distribution::Pop);
        let first = sampler.draw(&[1, 1], None, &mut rng).unwrap();
        let second = sampler.draw(&[1, 1], None, &mut rng).unwrap();
        assert_ne!(first, second);
        assert_eq!(sampler.draw(&[1, 1], None, &mut rng), None);
        assert_eq!(sampler.draw(&[1, 1], None, &mut rng), None);

        sampler.reset();
        assert!(sampler.draw(&[1, 1], None, &mut rng).is_some());
    }

    #[test]
    fn shuffle_cycles_through_permutations() {
        for seed in 0..50 {
            let mut rng = SeededRng::new(seed);
            let mut sampler = Sampler::new(Distribution::Shuffle);
            let picks: Vec<usize> = draw_n(&mut sampler, &[1, 1, 1], 9, &mut rng)
                .into_iter()
                .map(|p| p.unwrap())
                .collect();
            for cycle in picks.chunks(3) {
                let mut sorted = cycle.to_vec();
                sorted.sort_unstable();
                assert_eq!(sorted, vec![0, 1, 2]);
            }
            for pair in picks.windows(2) {
                assert_ne!(pair[0], pair[1], "immediate repeat with seed {}", seed);
            }
        }
    }

    #[test]
    fn pop_weighted_deals_each_weight_once() {
        let mut rng = SeededRng::new(4);
        let mut sampler = Sampler::new(Distribution::PopWeighted);
        let picks = draw_n(&mut sampler, &[4, 1], 6, &mut rng);
        assert_eq!(picks.iter().filter(|p| **p == Some(0)).count(), 4);
        assert_eq!(picks.iter().filter(|p| **p == Some(1)).count(), 1);
        assert_eq!(picks.iter().filter(|p| p.is_none()).count(), 1);
        assert_eq!(picks[5], None);

        sampler.reset();
        assert!(sampler.draw(&[4, 1], None, &mut rng).is_some());
    }

    #[test]
    fn pop_weighted_skips_zero_weight() {
        let mut rng = SeededRng::new(5);
        let mut sampler = Sampler::new(Distribution::PopWeighted);
        let picks = draw_n(&mut sampler, &[0, 2], 3, &mut rng);
        assert_eq!(picks, vec![Some(1), Some(1), None]);
    }

    #[test]
    fn eligibility_mask_restricts_every_policy() {
        let mask = [false, true, false];
        for policy in [
            Distribution::Uniform,
            Distribution::Weighted,
            Distribution::Pop,
            Distribution::Shuffle,
            Distribution::PopWeighted,
        ] {
            let mut rng = SeededRng::new(6);
            let mut sampler = Sampler::new(policy);
            assert_eq!(
                sampler.draw(&[1, 1, 1], Some(&mask), &mut rng),
                Some(1),
                "policy {}",
                policy
            );
        }
    }

    #[test]
    fn no_eligible_candidate_draws_nothing() {
        let mut rng = SeededRng::new(7);
        let mut sampler = Sampler::new(Distribution::Uniform);
        assert_eq!(sampler.draw(&[1, 1], Some(&[false, false]), &mut rng), None);
    }

    #[test]
    fn deck_is_dealt_lazily() {
        let mut rng = SeededRng::new(8);
        let mut sampler = Sampler::new(Distribution::Pop);
        assert_eq!(sampler.remaining(), None);
        sampler.draw(&[1, 1, 1], None, &mut rng);
        assert_eq!(sampler.remaining(), Some(2));
        sampler.reset();
        assert_eq!(sampler.remaining(), None);
    }
}
