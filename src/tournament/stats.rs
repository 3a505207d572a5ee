//! Summary statistics over a normalized tournament payoff matrix.
//!
//! `matrix[i][j]` is agent `i`'s average payoff against agent `j`. Every
//! function returns one value per agent, in roster order.

use serde::{Deserialize, Serialize};

/// Row means: each agent's average expected utility.
pub fn average_payoffs(matrix: &[Vec<f64>]) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| {
            if row.is_empty() {
                0.0
            } else {
                row.iter().sum::<f64>() / row.len() as f64
            }
        })
        .collect()
}

/// Largest gain any other agent makes over agent `s`'s self-play payoff when
/// facing `s`: `max_{r != s} (m[r][s] - m[s][s])`.
///
/// A single-agent roster has no other agent and yields negative infinity.
pub fn stabilities(matrix: &[Vec<f64>]) -> Vec<f64> {
    (0..matrix.len())
        .map(|strat| {
            let base = matrix[strat][strat];
            (0..matrix.len())
                .filter(|&row| row != strat)
                .map(|row| matrix[row][strat] - base)
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect()
}

/// Lowest payoff each agent got against any opponent.
pub fn minimums(matrix: &[Vec<f64>]) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| row.iter().copied().fold(f64::INFINITY, f64::min))
        .collect()
}

/// Mean shortfall of each row against its own best entry:
/// `Σ_j (max_j m[i][j] - m[i][j]) / n`.
pub fn regrets(matrix: &[Vec<f64>]) -> Vec<f64> {
    let n = matrix.len() as f64;
    matrix
        .iter()
        .map(|row| {
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            row.iter().map(|v| (max - v) / n).sum()
        })
        .collect()
}

/// Column means: the average payoff each agent concedes to its opponents.
pub fn reverse_payoffs(matrix: &[Vec<f64>]) -> Vec<f64> {
    let n = matrix.len();
    (0..n)
        .map(|col| matrix.iter().map(|row| row[col]).sum::<f64>() / n as f64)
        .collect()
}

/// Payoffs an agent's strategies earned against their nemeses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NemesisStats {
    /// Mean over every probed game and role.
    pub mean: f64,
    /// Worst probe.
    pub min: f64,
    /// Best probe.
    pub max: f64,
    /// Number of probes; strategies missing from the archive are skipped.
    pub probes: usize,
}

impl NemesisStats {
    /// Summarize a set of probe payoffs. No probes yields all zeros.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let total: f64 = samples.iter().sum();
        Self {
            mean: total / samples.len() as f64,
            min: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            probes: samples.len(),
        }
    }
}
