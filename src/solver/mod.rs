//! Solver algorithms over two-player games.
//!
//! Everything here is a pure function of its inputs: no solver carries state
//! and none draws randomness. Player arguments are 0-based (row = 0,
//! column = 1); returned strategies are over that player's own actions unless
//! stated otherwise.
//!
//! - [`response`]: best response, quantal response and the `logit` kernel
//! - [`security`]: maxmin/minmax security strategies, the robust and
//!   adversary heuristics, and the nemesis probe

pub mod response;
pub mod security;

pub use response::{
    compute_best_response, compute_quantal_best_response, compute_quantal_best_response_naive,
    logit,
};
pub use security::{
    compute_adversary, compute_adversary_response, compute_max_min, compute_min_max,
    compute_nemesis, compute_robust, compute_robust_response,
};

use serde::{Deserialize, Serialize};

use crate::games::{Game, MixedStrategy, OutcomeDistribution};

/// Payoff reported for a side whose strategy failed validation.
pub const INVALID_PAYOFF: f64 = -1337.0;

/// Result of [`expected_payoffs`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpectedPayoffs {
    /// Both strategies were valid; per-player expectations.
    Valid(Vec<f64>),
    /// At least one strategy was invalid. Nothing was computed.
    Invalid {
        /// The row strategy failed validation.
        row: bool,
        /// The column strategy failed validation.
        column: bool,
    },
}

impl ExpectedPayoffs {
    /// True for [`ExpectedPayoffs::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, ExpectedPayoffs::Valid(_))
    }

    /// The expectations, if both strategies were valid.
    pub fn valid(&self) -> Option<&[f64]> {
        match self {
            ExpectedPayoffs::Valid(values) => Some(values),
            ExpectedPayoffs::Invalid { .. } => None,
        }
    }

    /// Flatten to a payoff vector, using [`INVALID_PAYOFF`] for each invalid
    /// side and 0 for the valid side of an invalid pair.
    pub fn to_legacy(&self) -> Vec<f64> {
        match self {
            ExpectedPayoffs::Valid(values) => values.clone(),
            ExpectedPayoffs::Invalid { row, column } => vec![
                if *row { INVALID_PAYOFF } else { 0.0 },
                if *column { INVALID_PAYOFF } else { 0.0 },
            ],
        }
    }
}

/// Expected payoffs when the row and column players use independent mixed strategies.
///
/// Both strategies are validated first; if either fails, no expectation is
/// computed and the invalid sides are flagged.
pub fn expected_payoffs<G: Game + ?Sized>(
    row: &MixedStrategy,
    column: &MixedStrategy,
    game: &G,
) -> ExpectedPayoffs {
    let row_ok = row.is_valid();
    let column_ok = column.is_valid();
    if !row_ok || !column_ok {
        return ExpectedPayoffs::Invalid {
            row: !row_ok,
            column: !column_ok,
        };
    }
    let dist = OutcomeDistribution::from_strategies(&[row, column]);
    ExpectedPayoffs::Valid(outcome_payoffs(game, &dist))
}

/// Expected payoff of every player under a joint distribution.
///
/// Profiles with zero probability are skipped, so unset payoffs there do not
/// poison the sum.
pub fn outcome_payoffs<G: Game + ?Sized>(game: &G, dist: &OutcomeDistribution) -> Vec<f64> {
    let mut payoffs = vec![0.0; game.num_players()];
    let mut itr = game.profiles();
    while let Some(outcome) = itr.next_profile() {
        let prob = dist.prob(outcome);
        if prob > 0.0 {
            for (total, &value) in payoffs.iter_mut().zip(game.payoffs(outcome)) {
                *total += prob * value;
            }
        }
    }
    payoffs
}

/// Index of the other player in a two-player game.
pub fn opponent(player: usize) -> usize {
    1 - player
}

/// Profile in which `player` plays `own` and the opponent plays `other`.
pub(crate) fn profile_of(player: usize, own: usize, other: usize) -> [usize; 2] {
    if player == 0 {
        [own, other]
    } else {
        [other, own]
    }
}

/// Expected payoff of each of `player`'s pure actions against an opponent strategy.
///
/// Entry `i` is the payoff of action `i + 1`.
pub fn action_payoffs<G: Game + ?Sized>(
    game: &G,
    player: usize,
    opponent_strategy: &MixedStrategy,
) -> Vec<f64> {
    let own_actions = game.actions_of(player);
    let other_actions = game.actions_of(opponent(player));
    (1..=own_actions)
        .map(|own| {
            (1..=other_actions)
                .filter_map(|other| {
                    let prob = opponent_strategy.prob(other);
                    (prob > 0.0)
                        .then(|| prob * game.payoff(&profile_of(player, own, other), player))
                })
                .sum::<f64>()
        })
        .collect()
}

/// Elementwise `w * a + (1 - w) * b`.
pub fn interpolate(a: &MixedStrategy, b: &MixedStrategy, w: f64) -> MixedStrategy {
    MixedStrategy::blend(a, b, w)
}

/// Round every value to the nearest tenth, halves rounding up.
pub fn round_tenths(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|v| (v * 10.0 + 0.5).floor() / 10.0)
        .collect()
}
