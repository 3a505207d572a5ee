//! Joint probability distributions over action profiles.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::games::iterator::OutcomeIterator;
use crate::games::strategy::MixedStrategy;
use crate::games::tensor::GenericTensor;

/// Attempts made by [`OutcomeDistribution::sample`] before falling back.
pub const SAMPLE_ATTEMPTS: usize = 5;

/// Probability assigned to every profile of a game shape.
///
/// A distribution is valid when its total mass lies strictly within
/// `(0.99, 1.01)`. Distributions built from mixed strategies are product
/// measures: the players are assumed to randomize independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDistribution {
    num_actions: Vec<usize>,
    probs: GenericTensor<f64>,
}

impl OutcomeDistribution {
    /// Uniform distribution over every profile.
    pub fn centroid(num_actions: &[usize]) -> Self {
        let mut dist = Self::filled(num_actions, 0.0);
        dist.set_centroid();
        dist
    }

    /// Every profile holds `value`.
    pub fn filled(num_actions: &[usize], value: f64) -> Self {
        Self {
            num_actions: num_actions.to_vec(),
            probs: GenericTensor::new(num_actions, value),
        }
    }

    /// Product distribution of independent mixed strategies, one per player.
    pub fn from_strategies(strategies: &[&MixedStrategy]) -> Self {
        let num_actions: Vec<usize> = strategies.iter().map(|s| s.num_actions()).collect();
        let mut dist = Self::filled(&num_actions, 0.0);
        dist.set_mixed_strategies(strategies);
        dist
    }

    /// Equal weight on each of the given profiles, zero elsewhere.
    pub fn from_outcomes(num_actions: &[usize], outcomes: &[Vec<usize>]) -> Self {
        let mut dist = Self::filled(num_actions, 0.0);
        dist.set_outcome_set(outcomes);
        dist
    }

    /// All mass on one profile.
    pub fn pure(num_actions: &[usize], outcome: &[usize]) -> Self {
        let mut dist = Self::filled(num_actions, 0.0);
        dist.set_pure_outcome(outcome);
        dist
    }

    /// Number of players.
    pub fn num_players(&self) -> usize {
        self.num_actions.len()
    }

    /// Action count for every player.
    pub fn num_actions(&self) -> &[usize] {
        &self.num_actions
    }

    /// Fresh iterator over the profiles of this distribution's shape.
    pub fn profiles(&self) -> OutcomeIterator {
        OutcomeIterator::new(&self.num_actions)
    }

    /// Probability of a profile.
    pub fn prob(&self, outcome: &[usize]) -> f64 {
        *self.probs.get(outcome)
    }

    /// Overwrite the probability of a profile.
    pub fn set_prob(&mut self, outcome: &[usize], value: f64) {
        self.probs.set(outcome, value);
    }

    /// Every profile holds `value`.
    pub fn set_all(&mut self, value: f64) {
        self.probs.values_mut().for_each(|p| *p = value);
    }

    /// Reset to the uniform distribution over profiles.
    pub fn set_centroid(&mut self) {
        let p = 1.0 / self.probs.size() as f64;
        self.set_all(p);
    }

    /// Replace the distribution with the product of the given strategies.
    ///
    /// The strategy count must match the player count; otherwise the call is
    /// logged and ignored.
    pub fn set_mixed_strategies(&mut self, strategies: &[&MixedStrategy]) {
        if strategies.len() != self.num_players() {
            log::warn!(
                "{} strategies supplied for a {}-player distribution",
                strategies.len(),
                self.num_players()
            );
            return;
        }
        let mut itr = self.profiles();
        while let Some(outcome) = itr.next_profile() {
            let prob: f64 = strategies
                .iter()
                .zip(outcome)
                .map(|(s, &action)| s.prob(action))
                .product();
            self.probs.set(outcome, prob);
        }
    }

    /// Even distribution over the given profiles.
    pub fn set_outcome_set(&mut self, outcomes: &[Vec<usize>]) {
        self.set_all(0.0);
        let p = 1.0 / outcomes.len() as f64;
        for outcome in outcomes {
            self.probs.set(outcome, p);
        }
    }

    /// All mass on `outcome`.
    pub fn set_pure_outcome(&mut self, outcome: &[usize]) {
        self.set_all(0.0);
        self.probs.set(outcome, 1.0);
    }

    /// All mass on one profile drawn uniformly at random.
    pub fn set_random_pure_profile<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let offset = rng.gen_range(0..self.probs.size());
        self.set_all(0.0);
        self.probs.set_flat(offset, 1.0);
    }

    /// Distribution over the remaining players after summing out `held_out`.
    ///
    /// Returns `None` when no player would remain.
    pub fn conditional(&self, held_out: &[usize]) -> Option<OutcomeDistribution> {
        let mapping: Vec<usize> = (0..self.num_players())
            .filter(|pl| !held_out.contains(pl))
            .collect();
        if mapping.is_empty() {
            return None;
        }
        let remaining: Vec<usize> = mapping.iter().map(|&pl| self.num_actions[pl]).collect();
        let mut conditional = Self::filled(&remaining, 0.0);

        let mut restricted = vec![1; mapping.len()];
        let mut itr = self.profiles();
        while let Some(outcome) = itr.next_profile() {
            for (slot, &pl) in restricted.iter_mut().zip(&mapping) {
                *slot = outcome[pl];
            }
            *conditional.probs.get_mut(&restricted) += *self.probs.get(outcome);
        }
        Some(conditional)
    }

    /// Marginal distribution of one player's actions.
    pub fn marginal(&self, player: usize) -> MixedStrategy {
        let mut marginal = vec![0.0; self.num_actions[player]];
        let mut itr = self.profiles();
        while let Some(outcome) = itr.next_profile() {
            marginal[outcome[player] - 1] += *self.probs.get(outcome);
        }
        MixedStrategy::from_probs(&marginal)
    }

    /// Proportional rescale to unit mass; a non-positive total resets to the centroid.
    ///
    /// Unlike [`MixedStrategy::normalize`], this is a plain divide-by-sum.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum <= 0.0 {
            self.set_centroid();
            return;
        }
        self.probs.values_mut().for_each(|p| *p /= sum);
    }

    /// Total probability mass.
    pub fn sum(&self) -> f64 {
        self.probs.values().sum()
    }

    /// True when the mass lies strictly within `(0.99, 1.01)`.
    pub fn is_valid(&self) -> bool {
        let sum = self.sum();
        sum > 0.99 && sum < 1.01
    }

    /// Base-2 Shannon entropy; zero-probability profiles contribute nothing.
    pub fn entropy(&self) -> f64 {
        let entropy: f64 = self
            .probs
            .values()
            .filter(|&&p| p > 0.0)
            .map(|&p| p * p.log2())
            .sum();
        if entropy == 0.0 {
            0.0
        } else {
            -entropy
        }
    }

    /// With probability `delta` play uniformly over profiles.
    pub fn mix_with_uniform(&mut self, delta: f64) {
        let uniform = delta / self.probs.size() as f64;
        self.probs
            .values_mut()
            .for_each(|p| *p = *p * (1.0 - delta) + uniform);
    }

    /// Draw a profile according to this distribution.
    ///
    /// Walks the profiles subtracting mass from a uniform draw until it goes
    /// non-positive. If [`SAMPLE_ATTEMPTS`] draws all run off the end (mass
    /// below one from numerical drift), logs an error and returns the
    /// all-ones profile.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        for attempt in 0..SAMPLE_ATTEMPTS {
            let mut r: f64 = rng.gen();
            let mut itr = self.profiles();
            while let Some(outcome) = itr.next_profile() {
                r -= *self.probs.get(outcome);
                if r <= 0.0 {
                    return outcome.to_vec();
                }
            }
            log::debug!("sampling ran past the last profile: r = {} (attempt {})", r, attempt);
        }
        log::error!(
            "failed to sample outcome distribution after {} attempts; using the all-ones profile",
            SAMPLE_ATTEMPTS
        );
        vec![1; self.num_players()]
    }
}

impl fmt::Display for OutcomeDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Distribution:")?;
        let mut itr = self.profiles();
        while let Some(outcome) = itr.next_profile() {
            writeln!(f, "{:?}: {}", outcome, self.prob(outcome))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn product() -> OutcomeDistribution {
        let s1 = MixedStrategy::from_probs(&[0.25, 0.75]);
        let s2 = MixedStrategy::from_probs(&[0.5, 0.2, 0.3]);
        OutcomeDistribution::from_strategies(&[&s1, &s2])
    }

    #[test]
    fn test_product_of_strategies() {
        let dist = product();
        assert_eq!(dist.num_actions(), &[2, 3]);
        assert!((dist.prob(&[2, 3]) - 0.225).abs() < 1e-12);
        assert!((dist.sum() - 1.0).abs() < 1e-12);
        assert!(dist.is_valid());
    }

    #[test]
    fn test_centroid_and_entropy() {
        let dist = OutcomeDistribution::centroid(&[2, 2]);
        assert_eq!(dist.prob(&[1, 2]), 0.25);
        assert!((dist.entropy() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_of_pure_is_zero() {
        let dist = OutcomeDistribution::pure(&[3, 3], &[2, 2]);
        assert_eq!(dist.entropy(), 0.0);
        assert!(!dist.entropy().is_nan());
    }

    #[test]
    fn test_outcome_set() {
        let dist = OutcomeDistribution::from_outcomes(&[2, 2], &[vec![1, 1], vec![2, 2]]);
        assert_eq!(dist.prob(&[1, 1]), 0.5);
        assert_eq!(dist.prob(&[1, 2]), 0.0);
    }

    #[test]
    fn test_marginal_recovers_strategy() {
        let dist = product();
        let m = dist.marginal(1);
        assert!((m.prob(1) - 0.5).abs() < 1e-12);
        assert!((m.prob(2) - 0.2).abs() < 1e-12);
        assert!((m.prob(3) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_conditional_sums_out_players() {
        let dist = product();
        let cond = dist.conditional(&[1]).unwrap();
        assert_eq!(cond.num_actions(), &[2]);
        assert!((cond.prob(&[1]) - 0.25).abs() < 1e-12);
        assert!((cond.prob(&[2]) - 0.75).abs() < 1e-12);
        assert!(dist.conditional(&[0, 1]).is_none());
    }

    #[test]
    fn test_normalize_proportional_and_zero() {
        let mut dist = OutcomeDistribution::filled(&[2, 1], 2.0);
        dist.set_prob(&[1, 1], 6.0);
        dist.normalize();
        assert_eq!(dist.prob(&[1, 1]), 0.75);

        let mut zero = OutcomeDistribution::filled(&[2, 2], 0.0);
        zero.normalize();
        assert_eq!(zero.prob(&[2, 1]), 0.25);
    }

    #[test]
    fn test_mix_with_uniform() {
        let mut dist = OutcomeDistribution::pure(&[2], &[1]);
        dist.mix_with_uniform(0.5);
        assert_eq!(dist.prob(&[1]), 0.75);
        assert_eq!(dist.prob(&[2]), 0.25);
    }

    #[test]
    fn test_sample_pure() {
        let dist = OutcomeDistribution::pure(&[3, 2], &[3, 1]);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(dist.sample(&mut rng), vec![3, 1]);
        }
    }

    #[test]
    fn test_sample_falls_back_on_empty_mass() {
        let dist = OutcomeDistribution::filled(&[2, 2], 0.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(dist.sample(&mut rng), vec![1, 1]);
    }

    #[test]
    fn test_random_pure_profile() {
        let mut dist = OutcomeDistribution::centroid(&[3, 3]);
        dist.set_random_pure_profile(&mut StdRng::seed_from_u64(4));
        assert_eq!(dist.sum(), 1.0);
        assert_eq!(dist.entropy(), 0.0);
    }
}
