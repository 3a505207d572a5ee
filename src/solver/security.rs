//! Security strategies and the regret-based robust/adversary heuristics.
//!
//! None of these is an exact minimax-regret solution; they are cheap
//! approximations built from per-action best cases and the [`logit`] kernel.

use crate::games::{Game, MixedStrategy};
use crate::solver::response::{compute_best_response, first_argmax, first_argmin, logit};
use crate::solver::{opponent, profile_of};

/// `player`'s payoff table indexed `[own - 1][other - 1]`.
fn payoff_table<G: Game + ?Sized>(game: &G, player: usize) -> Vec<Vec<f64>> {
    let other_actions = game.actions_of(opponent(player));
    (1..=game.actions_of(player))
        .map(|own| {
            (1..=other_actions)
                .map(|other| game.payoff(&profile_of(player, own, other), player))
                .collect()
        })
        .collect()
}

/// Security strategy maximizing the guaranteed floor.
///
/// For each of `player`'s actions take the worst payoff over every opponent
/// reply; play the first action whose floor is largest.
pub fn compute_max_min<G: Game + ?Sized>(game: &G, player: usize) -> MixedStrategy {
    let floors: Vec<f64> = payoff_table(game, player)
        .iter()
        .map(|row| row.iter().copied().fold(f64::INFINITY, f64::min))
        .collect();
    MixedStrategy::pure(floors.len(), first_argmax(&floors))
}

/// Punishing strategy minimizing what the opponent can achieve.
///
/// For each of `player`'s actions take the opponent's best payoff over their
/// replies; play the first action whose ceiling is smallest.
pub fn compute_min_max<G: Game + ?Sized>(game: &G, player: usize) -> MixedStrategy {
    let opp = opponent(player);
    let own_actions = game.actions_of(player);
    let ceilings: Vec<f64> = (1..=own_actions)
        .map(|own| {
            (1..=game.actions_of(opp))
                .map(|other| game.payoff(&profile_of(player, own, other), opp))
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect();
    MixedStrategy::pure(own_actions, first_argmin(&ceilings))
}

/// Regret-weighted distribution over `player`'s own actions.
///
/// `bestCase(a)` is the most `a` can earn over every opponent reply;
/// `regret(a) = max bestCase - bestCase(a)`; the result is `logit(-regret, λ)`.
pub fn compute_robust<G: Game + ?Sized>(game: &G, player: usize, lambda: f64) -> MixedStrategy {
    let best_cases: Vec<f64> = payoff_table(game, player)
        .iter()
        .map(|row| row.iter().copied().fold(f64::NEG_INFINITY, f64::max))
        .collect();
    let most_regret = best_cases.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let neg_regret: Vec<f64> = best_cases.iter().map(|b| -(most_regret - b)).collect();
    logit(&neg_regret, lambda)
}

/// Best response of `player` to an opponent modeled by [`compute_robust`].
pub fn compute_robust_response<G: Game + ?Sized>(
    game: &G,
    player: usize,
    lambda: f64,
) -> MixedStrategy {
    let expected_opponent = compute_robust(game, opponent(player), lambda);
    compute_best_response(game, player, &expected_opponent)
}

/// Expected adversary: a distribution over the opponent's actions that favors
/// replies holding down `player`'s best case.
///
/// For each opponent action `b`, `worst(b)` is the most `player` can earn
/// against it; the result is `logit(-(worst(b) - min worst), λ)`.
pub fn compute_adversary<G: Game + ?Sized>(game: &G, player: usize, lambda: f64) -> MixedStrategy {
    let table = payoff_table(game, player);
    let other_actions = game.actions_of(opponent(player));
    let worst: Vec<f64> = (0..other_actions)
        .map(|b| {
            table
                .iter()
                .map(|row| row[b])
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect();
    let least = worst.iter().copied().fold(f64::INFINITY, f64::min);
    let scores: Vec<f64> = worst.iter().map(|w| -(w - least)).collect();
    logit(&scores, lambda)
}

/// Best response of `player` to the [`compute_adversary`] distribution.
pub fn compute_adversary_response<G: Game + ?Sized>(
    game: &G,
    player: usize,
    lambda: f64,
) -> MixedStrategy {
    let adversary = compute_adversary(game, player, lambda);
    compute_best_response(game, player, &adversary)
}

/// The opponent's pure reply that minimizes `player`'s expected payoff when
/// `player` uses `strategy`.
///
/// Ties go to the lowest action.
///
/// # Returns
/// A degenerate strategy over the opponent's actions.
pub fn compute_nemesis<G: Game + ?Sized>(
    game: &G,
    player: usize,
    strategy: &MixedStrategy,
) -> MixedStrategy {
    let table = payoff_table(game, player);
    let other_actions = game.actions_of(opponent(player));
    let payoffs: Vec<f64> = (0..other_actions)
        .map(|b| {
            table
                .iter()
                .enumerate()
                .filter_map(|(a, row)| {
                    let prob = strategy.prob(a + 1);
                    (prob > 0.0).then(|| prob * row[b])
                })
                .sum::<f64>()
        })
        .collect();
    MixedStrategy::pure(other_actions, first_argmin(&payoffs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::generator::{battle_of_the_sexes, matching_pennies, prisoners_dilemma};
    use crate::games::MatrixGame;
    use crate::solver::expected_payoffs;

    fn sample() -> MatrixGame {
        // Row: action 1 safe (floor 2), action 2 risky (best case 9), action 3 dominated.
        MatrixGame::from_bimatrix(
            &[
                vec![3.0, 2.0, 4.0],
                vec![9.0, -5.0, 0.0],
                vec![1.0, 1.0, 1.0],
            ],
            &[
                vec![1.0, 6.0, 0.0],
                vec![2.0, 3.0, 8.0],
                vec![5.0, 5.0, 5.0],
            ],
        )
    }

    #[test]
    fn test_max_min_picks_best_floor() {
        let game = sample();
        assert_eq!(compute_max_min(&game, 0).pure_action(), Some(1));
        // Column floors per column action: [1, 3, 0].
        assert_eq!(compute_max_min(&game, 1).pure_action(), Some(2));
    }

    #[test]
    fn test_max_min_pennies_ties_first() {
        let game = matching_pennies();
        assert_eq!(compute_max_min(&game, 0).pure_action(), Some(1));
    }

    #[test]
    fn test_min_max_limits_opponent() {
        let game = sample();
        // Column's best per row action: [6, 8, 5] -> row action 3.
        assert_eq!(compute_min_max(&game, 0).pure_action(), Some(3));
        // Row's best per column action: [9, 2, 4] -> column action 2.
        assert_eq!(compute_min_max(&game, 1).pure_action(), Some(2));
    }

    #[test]
    fn test_robust_lambda_zero_uniform() {
        let r = compute_robust(&sample(), 0, 0.0);
        assert_eq!(r, MixedStrategy::uniform(3));
    }

    #[test]
    fn test_robust_favors_high_best_case() {
        let r = compute_robust(&sample(), 0, 5.0);
        assert!(r.prob(2) > r.prob(1));
        assert!(r.prob(1) > r.prob(3));
        assert!(r.is_valid());
    }

    #[test]
    fn test_robust_response_is_pure() {
        let r = compute_robust_response(&sample(), 0, 0.5);
        assert!(r.pure_action().is_some());
        assert_eq!(r.num_actions(), 3);
    }

    #[test]
    fn test_adversary_targets_low_best_case() {
        // Row best case per column: [9, 2, 4]; column 2 holds the row down most.
        let a = compute_adversary(&sample(), 0, 10.0);
        assert!(a.prob(2) > 0.99);
        let response = compute_adversary_response(&sample(), 0, 10.0);
        assert_eq!(response.pure_action(), Some(1));
    }

    #[test]
    fn test_nemesis_minimizes_payoff() {
        let game = prisoners_dilemma();
        let coop = MixedStrategy::pure(2, 1);
        let nemesis = compute_nemesis(&game, 0, &coop);
        assert_eq!(nemesis.pure_action(), Some(2));
        let payoff = expected_payoffs(&coop, &nemesis, &game).to_legacy()[0];
        assert_eq!(payoff, -4.0);

        let nemesis_of_column = compute_nemesis(&game, 1, &coop);
        assert_eq!(nemesis_of_column.pure_action(), Some(2));
    }

    #[test]
    fn test_battle_security() {
        let game = battle_of_the_sexes();
        assert_eq!(compute_max_min(&game, 0).pure_action(), Some(1));
        assert_eq!(compute_min_max(&game, 0).pure_action(), Some(1));
    }
}
