//! Mixed strategies: probability vectors over one player's actions.
//!
//! Actions are labeled `1..=k`. Slot 0 of the internal vector is reserved and
//! always zero, so `prob(a)` reads directly without offset arithmetic.
//!
//! Validity (`Σp` within `[0.999, 1.001]`) is not enforced on mutation.
//! Callers may build transiently invalid vectors and must call
//! [`MixedStrategy::normalize`] or check [`MixedStrategy::is_valid`] before use.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Probabilities below this are clamped to zero during normalization.
pub const ZERO_CLAMP: f64 = 1e-10;

/// Lower bound of the validity tolerance on the probability mass.
pub const VALID_LOWER: f64 = 0.999;

/// Upper bound of the validity tolerance on the probability mass.
pub const VALID_UPPER: f64 = 1.001;

/// Upper bound on corrective normalization passes.
pub const MAX_NORMALIZE_PASSES: usize = 64;

/// A probability distribution over one player's actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedStrategy {
    probs: Vec<f64>,
}

impl MixedStrategy {
    /// Uniform mixture over `num_actions` actions.
    pub fn uniform(num_actions: usize) -> Self {
        let mut strategy = Self {
            probs: vec![0.0; num_actions + 1],
        };
        strategy.set_uniform();
        strategy
    }

    /// Every action starts with the same (not necessarily normalized) value.
    pub fn filled(num_actions: usize, value: f64) -> Self {
        let mut probs = vec![value; num_actions + 1];
        probs[0] = 0.0;
        Self { probs }
    }

    /// Degenerate strategy playing `action` with probability one.
    pub fn pure(num_actions: usize, action: usize) -> Self {
        let mut strategy = Self::filled(num_actions, 0.0);
        strategy.set_prob(action, 1.0);
        strategy
    }

    /// Strategy with explicit probabilities; `probs[i]` is the probability of action `i + 1`.
    pub fn from_probs(probs: &[f64]) -> Self {
        let mut all = Vec::with_capacity(probs.len() + 1);
        all.push(0.0);
        all.extend_from_slice(probs);
        Self { probs: all }
    }

    /// Elementwise blend `w * a + (1 - w) * b`, sized after `a`.
    pub fn blend(a: &MixedStrategy, b: &MixedStrategy, w: f64) -> Self {
        let num_actions = a.num_actions();
        let mut probs = vec![0.0; num_actions + 1];
        for (action, p) in probs.iter_mut().enumerate().skip(1) {
            *p = a.prob(action) * w + b.prob(action) * (1.0 - w);
        }
        Self { probs }
    }

    /// Number of actions represented.
    pub fn num_actions(&self) -> usize {
        self.probs.len() - 1
    }

    /// Probability of an action. Action 0 and out-of-range actions read as 0.
    pub fn prob(&self, action: usize) -> f64 {
        if action == 0 {
            return 0.0;
        }
        self.probs.get(action).copied().unwrap_or(0.0)
    }

    /// Probabilities of actions `1..=k`.
    pub fn probs(&self) -> &[f64] {
        &self.probs[1..]
    }

    /// Total probability mass.
    pub fn sum(&self) -> f64 {
        self.probs[1..].iter().sum()
    }

    /// Set the probability of one action. Action 0 is ignored.
    pub fn set_prob(&mut self, action: usize, prob: f64) {
        if action == 0 {
            return;
        }
        if let Some(slot) = self.probs.get_mut(action) {
            *slot = prob;
        }
    }

    /// Replace all probabilities; `probs[i]` is for action `i + 1`.
    pub fn set_probs(&mut self, probs: &[f64]) {
        if probs.len() != self.num_actions() {
            log::warn!(
                "ignoring {} probabilities for a strategy over {} actions",
                probs.len(),
                self.num_actions()
            );
            return;
        }
        self.probs[1..].copy_from_slice(probs);
    }

    /// Copy another strategy of the same size into this one.
    pub fn copy_from(&mut self, other: &MixedStrategy) {
        self.set_probs(other.probs());
    }

    /// Reset to the uniform mixture.
    pub fn set_uniform(&mut self) {
        let p = 1.0 / self.num_actions() as f64;
        self.probs.iter_mut().for_each(|x| *x = p);
        self.probs[0] = 0.0;
    }

    /// Draw each probability independently from `[0, 1)` and normalize.
    pub fn set_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for p in self.probs.iter_mut().skip(1) {
            *p = rng.gen::<f64>();
        }
        self.normalize();
    }

    /// Set every probability to zero.
    pub fn set_zeros(&mut self) {
        self.probs.iter_mut().for_each(|x| *x = 0.0);
    }

    /// Corrective normalization.
    ///
    /// Probabilities below [`ZERO_CLAMP`] become 0. Actions at exactly 0 or 1
    /// are locked; the shortfall `1 - Σp` is spread evenly over the unlocked
    /// actions, each clamped into `[0, 1]`. Repeats until valid, for at most
    /// [`MAX_NORMALIZE_PASSES`] passes.
    ///
    /// This is intentionally not a proportional rescale; its fixed points differ.
    pub fn normalize(&mut self) {
        for _ in 0..MAX_NORMALIZE_PASSES {
            self.normalize_pass();
            if self.is_valid() {
                return;
            }
        }
        log::warn!(
            "strategy normalization did not converge after {} passes (sum = {})",
            MAX_NORMALIZE_PASSES,
            self.sum()
        );
    }

    fn normalize_pass(&mut self) {
        self.probs[0] = 0.0;
        let mut locked = 0usize;
        for p in self.probs.iter_mut().skip(1) {
            if *p < ZERO_CLAMP {
                *p = 0.0;
            }
            if *p == 0.0 || *p == 1.0 {
                locked += 1;
            }
        }
        let sum = self.sum();
        let change = (1.0 - sum) / (self.num_actions() - locked) as f64;
        for p in self.probs.iter_mut().skip(1) {
            if *p == 0.0 || *p == 1.0 {
                continue;
            }
            *p = (*p + change).clamp(0.0, 1.0);
        }
    }

    /// Uniform mixture over exactly the actions attaining the maximum payoff.
    ///
    /// `payoffs[i]` is the payoff of action `i + 1`. Ties are split evenly.
    pub fn set_best_response(&mut self, payoffs: &[f64]) {
        if payoffs.len() != self.num_actions() {
            log::warn!(
                "best response over {} payoffs for a strategy over {} actions",
                payoffs.len(),
                self.num_actions()
            );
            return;
        }
        let max = payoffs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let ties = payoffs.iter().filter(|&&v| v == max).count() as f64;
        for (p, &value) in self.probs.iter_mut().skip(1).zip(payoffs) {
            *p = if value == max { 1.0 / ties } else { 0.0 };
        }
    }

    /// Play uniformly with probability `delta`, the current mixture otherwise.
    pub fn mix_with_uniform(&mut self, delta: f64) {
        let uniform = delta / self.num_actions() as f64;
        for p in self.probs.iter_mut().skip(1) {
            *p = *p * (1.0 - delta) + uniform;
        }
    }

    /// True when the mass lies strictly within `(0.999, 1.001)`.
    pub fn is_valid(&self) -> bool {
        let sum = self.sum();
        sum > VALID_LOWER && sum < VALID_UPPER
    }

    /// The single action played with probability one, if the strategy is pure.
    pub fn pure_action(&self) -> Option<usize> {
        let mut support = (1..self.probs.len()).filter(|&a| self.probs[a] != 0.0);
        match (support.next(), support.next()) {
            (Some(a), None) if self.probs[a] == 1.0 => Some(a),
            _ => None,
        }
    }

    /// Euclidean distance between two strategies over the same actions.
    pub fn distance(&self, other: &MixedStrategy) -> f64 {
        (1..=self.num_actions())
            .map(|a| (self.prob(a) - other.prob(a)).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Probabilities separated by single spaces.
    pub fn to_string_spaces(&self) -> String {
        self.probs()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for MixedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self
            .probs()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{}}}", body)
    }
}
