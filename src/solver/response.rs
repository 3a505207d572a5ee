//! Best and quantal responses to a fixed opponent strategy.

use crate::games::{Game, MixedStrategy};
use crate::solver::action_payoffs;

/// Pure best response of `player` to the opponent's strategy.
///
/// Actions are scanned in increasing order and the incumbent is replaced only
/// by a strictly greater payoff, so ties go to the lowest action.
///
/// # Returns
/// A degenerate strategy over `player`'s actions.
pub fn compute_best_response<G: Game + ?Sized>(
    game: &G,
    player: usize,
    opponent_strategy: &MixedStrategy,
) -> MixedStrategy {
    let payoffs = action_payoffs(game, player, opponent_strategy);
    MixedStrategy::pure(payoffs.len(), first_argmax(&payoffs))
}

/// 1-based index of the first maximum.
pub(crate) fn first_argmax(values: &[f64]) -> usize {
    let mut best = 1;
    let mut best_value = values.first().copied().unwrap_or(f64::NEG_INFINITY);
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > best_value {
            best = i + 1;
            best_value = value;
        }
    }
    best
}

/// 1-based index of the first minimum.
pub(crate) fn first_argmin(values: &[f64]) -> usize {
    let mut best = 1;
    let mut best_value = values.first().copied().unwrap_or(f64::INFINITY);
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value < best_value {
            best = i + 1;
            best_value = value;
        }
    }
    best
}

/// Softmax of `values` at rationality `lambda`.
///
/// `p[i] = exp(λ·v[i] - m) / Σ exp(λ·v[j] - m)` with `m = max λ·v`, which is
/// the plain softmax without its overflow. Negative `lambda` is clamped to 0
/// with a warning; at 0 the result is uniform.
///
/// # Arguments
/// * `values` - One value per action; entry `i` belongs to action `i + 1`
/// * `lambda` - Rationality; larger concentrates mass on the maximum
pub fn logit(values: &[f64], lambda: f64) -> MixedStrategy {
    let lambda = clamp_lambda(lambda);
    if lambda == 0.0 {
        return MixedStrategy::uniform(values.len());
    }
    let scaled: Vec<f64> = values.iter().map(|v| lambda * v).collect();
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = scaled.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = weights.iter().sum();
    let probs: Vec<f64> = weights.iter().map(|w| w / total).collect();
    MixedStrategy::from_probs(&probs)
}

fn clamp_lambda(lambda: f64) -> f64 {
    if lambda < 0.0 {
        log::warn!("lambda {} is negative; using 0", lambda);
        return 0.0;
    }
    lambda
}

/// Quantal (softmax) response of `player` to the opponent's strategy.
///
/// Uses the stabilized [`logit`] kernel over the pure-action payoffs.
pub fn compute_quantal_best_response<G: Game + ?Sized>(
    game: &G,
    player: usize,
    opponent_strategy: &MixedStrategy,
    lambda: f64,
) -> MixedStrategy {
    let payoffs = action_payoffs(game, player, opponent_strategy);
    logit(&payoffs, lambda)
}

/// Quantal response computed as `exp(λ·v) / Σ exp(λ·v)` without stabilization.
///
/// Kept for comparison with older results. Large `λ·payoff` overflows to
/// infinity and yields NaN probabilities; prefer
/// [`compute_quantal_best_response`].
pub fn compute_quantal_best_response_naive<G: Game + ?Sized>(
    game: &G,
    player: usize,
    opponent_strategy: &MixedStrategy,
    lambda: f64,
) -> MixedStrategy {
    let lambda = clamp_lambda(lambda);
    let payoffs = action_payoffs(game, player, opponent_strategy);
    let weights: Vec<f64> = payoffs.iter().map(|v| (lambda * v).exp()).collect();
    let total: f64 = weights.iter().sum();
    let probs: Vec<f64> = weights.iter().map(|w| w / total).collect();
    MixedStrategy::from_probs(&probs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::generator::{matching_pennies, prisoners_dilemma};
    use crate::games::MatrixGame;

    #[test]
    fn test_best_response_defects_in_prisoners_dilemma() {
        let game = prisoners_dilemma();
        let defect = MixedStrategy::pure(2, 2);
        assert_eq!(compute_best_response(&game, 0, &defect), MixedStrategy::pure(2, 2));
        assert_eq!(compute_best_response(&game, 1, &defect), MixedStrategy::pure(2, 2));
    }

    #[test]
    fn test_best_response_tie_prefers_first() {
        let game = MatrixGame::from_bimatrix(
            &[vec![1.0], vec![1.0], vec![1.0]],
            &[vec![0.0], vec![0.0], vec![0.0]],
        );
        let opp = MixedStrategy::uniform(1);
        assert_eq!(compute_best_response(&game, 0, &opp).pure_action(), Some(1));
    }

    #[test]
    fn test_argmin_argmax() {
        assert_eq!(first_argmax(&[1.0, 3.0, 3.0]), 2);
        assert_eq!(first_argmin(&[2.0, 1.0, 1.0]), 2);
    }

    #[test]
    fn test_logit_lambda_zero_is_uniform() {
        let s = logit(&[1.0, 50.0, -3.0], 0.0);
        assert_eq!(s, MixedStrategy::uniform(3));
    }

    #[test]
    fn test_logit_negative_lambda_clamped() {
        let s = logit(&[1.0, 2.0], -5.0);
        assert_eq!(s.probs(), &[0.5, 0.5]);
    }

    #[test]
    fn test_logit_no_overflow() {
        let s = logit(&[1000.0, 999.0], 10.0);
        assert!(s.is_valid());
        assert!(s.prob(1) > 0.99);
    }

    #[test]
    fn test_logit_shift_invariant() {
        let a = logit(&[1.0, 2.0, 3.0], 0.7);
        let b = logit(&[101.0, 102.0, 103.0], 0.7);
        assert!(a.distance(&b) < 1e-12);
    }

    #[test]
    fn test_quantal_pennies_lambda_zero() {
        let game = matching_pennies();
        let opp = MixedStrategy::from_probs(&[0.9, 0.1]);
        let q = compute_quantal_best_response(&game, 0, &opp, 0.0);
        assert_eq!(q.probs(), &[0.5, 0.5]);
    }

    #[test]
    fn test_naive_matches_stable_for_small_lambda() {
        let game = prisoners_dilemma();
        let opp = MixedStrategy::from_probs(&[0.3, 0.7]);
        let a = compute_quantal_best_response(&game, 1, &opp, 0.5);
        let b = compute_quantal_best_response_naive(&game, 1, &opp, 0.5);
        assert!(a.distance(&b) < 1e-12);
    }

    #[test]
    fn test_naive_overflows() {
        let game = MatrixGame::from_bimatrix(&[vec![1000.0], vec![999.0]], &[vec![0.0], vec![0.0]]);
        let opp = MixedStrategy::uniform(1);
        let q = compute_quantal_best_response_naive(&game, 0, &opp, 10.0);
        assert!(q.prob(1).is_nan());
    }
}
