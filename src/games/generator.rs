//! Game generation and payoff obfuscation.
//!
//! The tournament only depends on the [`GameGenerator`] trait; the
//! [`RandomGameGenerator`] here is the in-process implementation. Every game it
//! produces is seeded from its batch index, so a batch is reproducible and game
//! `i` is the same game in every setting that shares a shape and type.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::games::game::{Game, MatrixGame};
use crate::tournament::config::{GameType, Parameters};

/// Source of game batches for a tournament setting.
pub trait GameGenerator: Send + Sync {
    /// Produce `count` two-player games for a setting.
    ///
    /// # Arguments
    /// * `count` - Number of games
    /// * `params` - Shape, scale and family of the games
    /// * `seed` - Base seed; each game is seeded from it and its index
    fn generate(&self, count: usize, params: &Parameters, seed: u64) -> Vec<MatrixGame>;
}

/// Square two-player games with i.i.d. payoffs drawn per [`GameType`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGameGenerator;

impl RandomGameGenerator {
    /// Create a generator.
    pub fn new() -> Self {
        Self
    }

    fn generate_one(index: usize, params: &Parameters, seed: u64) -> MatrixGame {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
        let n = params.num_actions;
        let max = f64::from(params.max_payoff);
        let mut game = MatrixGame::new(&[n, n])
            .with_id(index as u64)
            .with_description(index.to_string());

        match params.game_type {
            GameType::Risk => {
                for row in 1..=n {
                    let base = 50.0 - ((row - 1) * 2) as f64;
                    let spread = (row * 2) as f64;
                    for col in 1..=n {
                        let z: f64 = rng.sample(StandardNormal);
                        game.set_payoff(&[row, col], 0, base + z * spread);
                        let z: f64 = rng.sample(StandardNormal);
                        game.set_payoff(&[col, row], 1, base + z * spread);
                    }
                }
            }
            GameType::ZeroSum => {
                for row in 1..=n {
                    for col in 1..=n {
                        let value = rng.gen::<f64>() * max * 2.0 - max;
                        game.set_payoffs(&[row, col], &[value, -value]);
                    }
                }
            }
            GameType::GeneralSum => {
                for row in 1..=n {
                    for col in 1..=n {
                        let values = [rng.gen::<f64>() * max, rng.gen::<f64>() * max];
                        game.set_payoffs(&[row, col], &values);
                    }
                }
            }
        }
        game
    }
}

impl GameGenerator for RandomGameGenerator {
    fn generate(&self, count: usize, params: &Parameters, seed: u64) -> Vec<MatrixGame> {
        (0..count)
            .map(|index| Self::generate_one(index, params, seed))
            .collect()
    }
}

/// Perturb a subset of a game's profiles in place.
///
/// Seeds a generator from the game's identifier, picks
/// `params.outcome_uncertainty` distinct profiles (all of them if that is at
/// least the profile count) and subtracts an independent `U(0, m)` draw from
/// every player's payoff at each, where `m = params.payoff_uncertainty`.
/// Profiles are visited in offset order, so the same identifier always
/// produces the same perturbation.
pub fn obfuscate(game: &mut MatrixGame, params: &Parameters) {
    let k = params.outcome_uncertainty;
    if k == 0 {
        return;
    }
    let magnitude = f64::from(params.payoff_uncertainty);
    let num_profiles = game.num_profiles();
    let mut rng = StdRng::seed_from_u64(game.id());

    let chosen: Vec<usize> = if k >= num_profiles {
        (0..num_profiles).collect()
    } else {
        let mut picked = index::sample(&mut rng, num_profiles, k).into_vec();
        picked.sort_unstable();
        picked
    };

    for offset in chosen {
        let profile = game.profile_at(offset);
        let mut values = game.payoffs(&profile).to_vec();
        for value in values.iter_mut() {
            *value -= rng.gen::<f64>() * magnitude;
        }
        game.set_payoffs(&profile, &values);
    }
}

/// [`obfuscate`] every game of a batch.
pub fn obfuscate_all(games: &mut [MatrixGame], params: &Parameters) {
    for game in games.iter_mut() {
        obfuscate(game, params);
    }
}

/// Identifier of the second copy of a game used for the column role.
pub fn mirror_id(id: u64) -> u64 {
    id.wrapping_mul(10).wrapping_add(2)
}

/// Prisoner's dilemma; action 1 cooperates, action 2 defects.
pub fn prisoners_dilemma() -> MatrixGame {
    MatrixGame::from_bimatrix(
        &[vec![-1.0, -4.0], vec![0.0, -3.0]],
        &[vec![-1.0, 0.0], vec![-4.0, -3.0]],
    )
    .with_description("prisoners dilemma")
}

/// Matching pennies; the row player wins on a match.
pub fn matching_pennies() -> MatrixGame {
    MatrixGame::from_bimatrix(
        &[vec![1.0, -1.0], vec![-1.0, 1.0]],
        &[vec![-1.0, 1.0], vec![1.0, -1.0]],
    )
    .with_description("matching pennies")
}

/// Battle of the sexes; coordination with opposed preferences.
pub fn battle_of_the_sexes() -> MatrixGame {
    MatrixGame::from_bimatrix(
        &[vec![2.0, 0.0], vec![0.0, 1.0]],
        &[vec![1.0, 0.0], vec![0.0, 2.0]],
    )
    .with_description("battle of the sexes")
}
