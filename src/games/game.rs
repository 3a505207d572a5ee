//! Finite normal-form game contract and its dense matrix realization.
//!
//! Players are indexed from 0; actions are indexed from 1 (index 0 is never a
//! valid action). A profile is one action per player, in player order.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::games::iterator::OutcomeIterator;
use crate::games::payoffs::Payoffs;
use crate::games::tensor::GenericTensor;

/// Contract for any finite game with a payoff per profile.
///
/// Implementors provide the shape and the payoff lookup; everything else is
/// derived from those.
pub trait Game {
    /// Number of players.
    fn num_players(&self) -> usize;

    /// Action count for every player.
    fn num_actions(&self) -> &[usize];

    /// Payoffs for every player at a profile.
    ///
    /// The profile must be in range: `1 <= profile[p] <= num_actions[p]`.
    fn payoffs(&self, profile: &[usize]) -> &[f64];

    /// Stable identifier, used to seed per-game randomness.
    fn id(&self) -> u64 {
        0
    }

    /// Free-form description.
    fn description(&self) -> &str {
        ""
    }

    /// Action count of one player.
    fn actions_of(&self, player: usize) -> usize {
        self.num_actions()[player]
    }

    /// Product of all action counts.
    fn num_profiles(&self) -> usize {
        self.num_actions().iter().product()
    }

    /// Number of unilateral deviations, `Σ (a[i] - 1)`.
    fn num_deviations(&self) -> usize {
        self.num_actions().iter().map(|&a| a.saturating_sub(1)).sum()
    }

    /// A single player's payoff at a profile.
    fn payoff(&self, profile: &[usize], player: usize) -> f64 {
        self.payoffs(profile)[player]
    }

    /// Fresh iterator over every profile.
    fn profiles(&self) -> OutcomeIterator {
        OutcomeIterator::new(self.num_actions())
    }

    /// `(max, min)` over every payoff of every player.
    fn extreme_payoffs(&self) -> (f64, f64) {
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        let mut itr = self.profiles();
        while let Some(profile) = itr.next_profile() {
            for &value in self.payoffs(profile) {
                max = max.max(value);
                min = min.min(value);
            }
        }
        (max, min)
    }

    /// `(max, min)` over one player's payoffs.
    fn extreme_payoffs_for(&self, player: usize) -> (f64, f64) {
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        let mut itr = self.profiles();
        while let Some(profile) = itr.next_profile() {
            let value = self.payoff(profile, player);
            max = max.max(value);
            min = min.min(value);
        }
        (max, min)
    }

    /// Spread between the largest and smallest payoff in the game.
    fn payoff_range(&self) -> f64 {
        let (max, min) = self.extreme_payoffs();
        max - min
    }

    /// A profile drawn uniformly at random.
    fn random_profile<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize>
    where
        Self: Sized,
    {
        self.num_actions()
            .iter()
            .map(|&n| rng.gen_range(1..=n))
            .collect()
    }
}

/// Dense game storing one [`Payoffs`] record per profile.
///
/// Every profile always has a record; unset payoffs hold negative infinity.
/// `Clone` is a deep copy, which is how agents receive their own view of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixGame {
    id: u64,
    description: String,
    num_actions: Vec<usize>,
    num_profiles: usize,
    num_deviations: usize,
    payoffs: GenericTensor<Payoffs>,
}

impl MatrixGame {
    /// Create a game of the given shape with every payoff unset.
    pub fn new(num_actions: &[usize]) -> Self {
        let num_players = num_actions.len();
        let mut game = Self {
            id: 0,
            description: String::new(),
            num_actions: num_actions.to_vec(),
            num_profiles: 0,
            num_deviations: 0,
            payoffs: GenericTensor::new(num_actions, Payoffs::new(num_players)),
        };
        game.update_game_size();
        game
    }

    /// Copy the payoffs of any game into a new matrix game.
    pub fn from_game<G: Game + ?Sized>(game: &G) -> Self {
        let mut copy = Self::new(game.num_actions());
        copy.id = game.id();
        copy.description = game.description().to_string();
        let mut itr = game.profiles();
        while let Some(profile) = itr.next_profile() {
            copy.set_payoffs(profile, game.payoffs(profile));
        }
        copy
    }

    /// Build a two-player game from row-player and column-player payoff matrices.
    ///
    /// `row[r][c]` and `column[r][c]` are the payoffs at profile `(r + 1, c + 1)`.
    pub fn from_bimatrix(row: &[Vec<f64>], column: &[Vec<f64>]) -> Self {
        let rows = row.len();
        let cols = row.first().map_or(0, Vec::len);
        let mut game = Self::new(&[rows, cols]);
        for r in 0..rows {
            for c in 0..cols {
                game.set_payoffs(&[r + 1, c + 1], &[row[r][c], column[r][c]]);
            }
        }
        game
    }

    /// Builder: set the identifier.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the identifier.
    pub fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Set one player's payoff at a profile.
    pub fn set_payoff(&mut self, profile: &[usize], player: usize, value: f64) {
        self.payoffs.get_mut(profile).set(player, value);
    }

    /// Set every player's payoff at a profile.
    pub fn set_payoffs(&mut self, profile: &[usize], values: &[f64]) {
        self.payoffs.get_mut(profile).set_all(values);
    }

    /// Payoff record at a flat profile offset.
    pub fn payoffs_at(&self, offset: usize) -> &Payoffs {
        self.payoffs.get_flat(offset)
    }

    /// Profile corresponding to a flat offset (first player most significant).
    pub fn profile_at(&self, offset: usize) -> Vec<usize> {
        self.payoffs.indices(offset)
    }

    /// Change the game's shape. All payoffs are reset to unset.
    pub fn resize(&mut self, num_actions: &[usize]) {
        self.num_actions = num_actions.to_vec();
        self.payoffs
            .init(num_actions, Payoffs::new(num_actions.len()));
        self.update_game_size();
    }

    /// True once every profile has every payoff set.
    pub fn is_complete(&self) -> bool {
        self.payoffs.values().all(Payoffs::is_set)
    }

    fn update_game_size(&mut self) {
        self.num_profiles = self.num_actions.iter().product();
        self.num_deviations = self
            .num_actions
            .iter()
            .map(|&a| a.saturating_sub(1))
            .sum();
    }
}

impl Game for MatrixGame {
    fn num_players(&self) -> usize {
        self.num_actions.len()
    }

    fn num_actions(&self) -> &[usize] {
        &self.num_actions
    }

    fn payoffs(&self, profile: &[usize]) -> &[f64] {
        self.payoffs.get(profile).values()
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn num_profiles(&self) -> usize {
        self.num_profiles
    }

    fn num_deviations(&self) -> usize {
        self.num_deviations
    }
}

impl fmt::Display for MatrixGame {
    /// Two-player games print as a grid of `(row, column)` payoff pairs;
    /// larger games print one profile per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.num_actions.len() == 2 {
            for r in 1..=self.num_actions[0] {
                for c in 1..=self.num_actions[1] {
                    let p = self.payoffs(&[r, c]);
                    write!(f, "({:.2}, {:.2})\t", p[0], p[1])?;
                }
                writeln!(f)?;
            }
            return Ok(());
        }
        let mut itr = self.profiles();
        while let Some(profile) = itr.next_profile() {
            writeln!(f, "{:?}: {:?}", profile, self.payoffs(profile))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> MatrixGame {
        MatrixGame::from_bimatrix(
            &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
            &[vec![-1.0, -2.0, -3.0], vec![-4.0, -5.0, -6.0]],
        )
    }

    #[test]
    fn test_sizes() {
        let game = MatrixGame::new(&[2, 3]);
        assert_eq!(game.num_players(), 2);
        assert_eq!(game.num_profiles(), 6);
        assert_eq!(game.num_deviations(), 3);
        assert!(!game.is_complete());
        assert_eq!(game.payoff(&[2, 3], 1), f64::NEG_INFINITY);
    }

    #[test]
    fn test_bimatrix_layout() {
        let game = sample();
        assert_eq!(game.payoffs(&[1, 3]), &[3.0, -3.0]);
        assert_eq!(game.payoffs(&[2, 1]), &[4.0, -4.0]);
        assert!(game.is_complete());
    }

    #[test]
    fn test_extremes() {
        let game = sample();
        assert_eq!(game.extreme_payoffs(), (6.0, -6.0));
        assert_eq!(game.extreme_payoffs_for(0), (6.0, 1.0));
        assert_eq!(game.payoff_range(), 12.0);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = sample();
        let mut copy = original.clone();
        copy.set_payoff(&[1, 1], 0, 100.0);
        assert_eq!(original.payoff(&[1, 1], 0), 1.0);
        assert_eq!(copy.payoff(&[1, 1], 0), 100.0);
    }

    #[test]
    fn test_from_game_copies_identity() {
        let original = sample().with_id(7).with_description("seven");
        let copy = MatrixGame::from_game(&original);
        assert_eq!(copy, original);
    }

    #[test]
    fn test_resize_resets() {
        let mut game = sample();
        game.resize(&[3, 3]);
        assert_eq!(game.num_profiles(), 9);
        assert_eq!(game.num_deviations(), 4);
        assert!(!game.is_complete());
    }

    #[test]
    fn test_profile_at_matches_tensor_order() {
        let game = sample();
        assert_eq!(game.profile_at(0), vec![1, 1]);
        assert_eq!(game.profile_at(2), vec![1, 3]);
        assert_eq!(game.profile_at(3), vec![2, 1]);
        assert_eq!(game.payoffs_at(4).values(), &[5.0, -5.0]);
    }

    #[test]
    fn test_random_profile_in_range() {
        let game = sample();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let p = game.random_profile(&mut rng);
            assert!((1..=2).contains(&p[0]));
            assert!((1..=3).contains(&p[1]));
        }
    }
}
